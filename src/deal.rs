use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{FieldError, LoanError, Result};
use crate::types::{ExperienceLevel, TransactionType};

pub const MIN_PROPERTY_VALUE: i64 = 1_000;
/// upper bound for price, rehab budget and arv; keeps term arithmetic in range
pub const MAX_PROPERTY_VALUE: i64 = 1_000_000_000_000;
pub const MIN_FICO: u16 = 300;
pub const MAX_FICO: u16 = 850;

/// borrower and property inputs for one calculation request
///
/// Only constructed through [`DealInputBuilder`], so every instance satisfies the
/// field bounds. Fields are read through accessors and never change after build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealInput {
    address: String,
    transaction_type: TransactionType,
    purchase_price: Money,
    rehab_budget: Money,
    arv: Money,
    borrower_fico: u16,
    borrower_experience: ExperienceLevel,
}

impl DealInput {
    pub fn builder() -> DealInputBuilder {
        DealInputBuilder::new()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn purchase_price(&self) -> Money {
        self.purchase_price
    }

    pub fn rehab_budget(&self) -> Money {
        self.rehab_budget
    }

    /// after-repair value
    pub fn arv(&self) -> Money {
        self.arv
    }

    pub fn borrower_fico(&self) -> u16 {
        self.borrower_fico
    }

    pub fn borrower_experience(&self) -> ExperienceLevel {
        self.borrower_experience
    }

    /// purchase price plus rehab budget
    pub fn total_project_cost(&self) -> Money {
        self.purchase_price + self.rehab_budget
    }

    /// arv divided by purchase price, none when the price is not positive
    pub fn arv_to_purchase_ratio(&self) -> Option<Decimal> {
        self.arv.ratio_to(self.purchase_price)
    }
}

/// raw submission shape, as received from a form or json body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DealSubmission {
    pub address: Option<String>,
    pub transaction_type: Option<String>,
    pub purchase_price: Option<Decimal>,
    pub rehab_budget: Option<Decimal>,
    pub arv: Option<Decimal>,
    pub borrower_fico: Option<i64>,
    pub borrower_experience: Option<String>,
}

impl DealSubmission {
    /// parse free-form fields and run the builder checks
    pub fn into_deal(self) -> Result<DealInput> {
        let mut errors = Vec::new();
        let mut builder = DealInputBuilder::new();

        if let Some(address) = self.address {
            builder = builder.address(address);
        }
        if let Some(raw) = self.transaction_type {
            match raw.parse::<TransactionType>() {
                Ok(t) => builder = builder.transaction_type(t),
                Err(e) => errors.extend_from_slice(e.field_errors()),
            }
        }
        if let Some(price) = self.purchase_price {
            builder = builder.purchase_price(Money::from_decimal(price));
        }
        if let Some(rehab) = self.rehab_budget {
            builder = builder.rehab_budget(Money::from_decimal(rehab));
        }
        if let Some(arv) = self.arv {
            builder = builder.arv(Money::from_decimal(arv));
        }
        if let Some(fico) = self.borrower_fico {
            match u16::try_from(fico) {
                Ok(fico) => builder = builder.borrower_fico(fico),
                Err(_) => errors.push(fico_out_of_range()),
            }
        }
        if let Some(raw) = self.borrower_experience {
            match raw.parse::<ExperienceLevel>() {
                Ok(level) => builder = builder.borrower_experience(level),
                Err(e) => errors.extend_from_slice(e.field_errors()),
            }
        }

        builder.build_collecting(errors)
    }
}

/// builder for deal inputs
#[derive(Debug, Clone, Default)]
pub struct DealInputBuilder {
    address: Option<String>,
    transaction_type: Option<TransactionType>,
    purchase_price: Option<Money>,
    rehab_budget: Option<Money>,
    arv: Option<Money>,
    borrower_fico: Option<u16>,
    borrower_experience: Option<ExperienceLevel>,
}

impl DealInputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    pub fn purchase_price(mut self, price: Money) -> Self {
        self.purchase_price = Some(price);
        self
    }

    pub fn rehab_budget(mut self, budget: Money) -> Self {
        self.rehab_budget = Some(budget);
        self
    }

    pub fn arv(mut self, arv: Money) -> Self {
        self.arv = Some(arv);
        self
    }

    pub fn borrower_fico(mut self, fico: u16) -> Self {
        self.borrower_fico = Some(fico);
        self
    }

    pub fn borrower_experience(mut self, level: ExperienceLevel) -> Self {
        self.borrower_experience = Some(level);
        self
    }

    /// check every field and build, reporting all problems at once
    pub fn build(self) -> Result<DealInput> {
        self.build_collecting(Vec::new())
    }

    fn build_collecting(self, mut errors: Vec<FieldError>) -> Result<DealInput> {
        let min_value = Money::from_major(MIN_PROPERTY_VALUE);
        let max_value = Money::from_major(MAX_PROPERTY_VALUE);

        let address = self.address.map(|a| a.trim().to_string());
        match &address {
            None => errors.push(FieldError::new("address", "is required")),
            Some(a) if a.is_empty() => errors.push(FieldError::new("address", "must not be empty")),
            Some(_) => {}
        }

        if self.transaction_type.is_none() && !has_field(&errors, "transaction_type") {
            errors.push(FieldError::new("transaction_type", "is required"));
        }

        match self.purchase_price {
            None => errors.push(FieldError::new("purchase_price", "is required")),
            Some(p) if p < min_value => errors.push(FieldError::new(
                "purchase_price",
                format!("must be at least {}", MIN_PROPERTY_VALUE),
            )),
            Some(p) if p > max_value => errors.push(too_large("purchase_price")),
            Some(_) => {}
        }

        // an omitted rehab budget means no rehab
        if let Some(r) = self.rehab_budget {
            if r.is_negative() {
                errors.push(FieldError::new("rehab_budget", "cannot be negative"));
            } else if r > max_value {
                errors.push(too_large("rehab_budget"));
            }
        }

        match self.arv {
            None => errors.push(FieldError::new("arv", "is required")),
            Some(a) if a < min_value => errors.push(FieldError::new(
                "arv",
                format!("must be at least {}", MIN_PROPERTY_VALUE),
            )),
            Some(a) if a > max_value => errors.push(too_large("arv")),
            Some(_) => {}
        }

        match self.borrower_fico {
            None if !has_field(&errors, "borrower_fico") => {
                errors.push(FieldError::new("borrower_fico", "is required"))
            }
            Some(f) if !(MIN_FICO..=MAX_FICO).contains(&f) => errors.push(fico_out_of_range()),
            _ => {}
        }

        if self.borrower_experience.is_none() && !has_field(&errors, "borrower_experience") {
            errors.push(FieldError::new("borrower_experience", "is required"));
        }

        match (
            address,
            self.transaction_type,
            self.purchase_price,
            self.arv,
            self.borrower_fico,
            self.borrower_experience,
        ) {
            (Some(address), Some(transaction_type), Some(purchase_price), Some(arv), Some(fico), Some(experience))
                if errors.is_empty() =>
            {
                Ok(DealInput {
                    address,
                    transaction_type,
                    purchase_price,
                    rehab_budget: self.rehab_budget.unwrap_or(Money::ZERO),
                    arv,
                    borrower_fico: fico,
                    borrower_experience: experience,
                })
            }
            _ => Err(LoanError::InvalidInput { errors }),
        }
    }
}

fn has_field(errors: &[FieldError], field: &str) -> bool {
    errors.iter().any(|e| e.field == field)
}

fn too_large(field: &str) -> FieldError {
    FieldError::new(field, format!("must be at most {}", MAX_PROPERTY_VALUE))
}

fn fico_out_of_range() -> FieldError {
    FieldError::new(
        "borrower_fico",
        format!("must be between {} and {}", MIN_FICO, MAX_FICO),
    )
}
