use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ValidationRules;
use crate::deal::DealInput;

/// a breached approval rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    FicoBelowMinimum {
        fico: u16,
        min_fico: u16,
    },
    RehabBudgetExceeded {
        max_percentage: Decimal,
    },
    ArvRatioTooLow {
        min_ratio: Decimal,
    },
}

impl Violation {
    /// message shown to the borrower
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::FicoBelowMinimum { min_fico, .. } => {
                write!(f, "FICO score must be at least {}", min_fico)
            }
            Violation::RehabBudgetExceeded { max_percentage } => write!(
                f,
                "Rehab budget cannot exceed {}% of purchase price",
                max_percentage.normalize()
            ),
            Violation::ArvRatioTooLow { min_ratio } => write!(
                f,
                "ARV must be at least {}% of purchase price",
                (min_ratio * Decimal::ONE_HUNDRED).normalize()
            ),
        }
    }
}

/// evaluate all approval rules; an empty result means the deal passes
pub fn validate(input: &DealInput, rules: &ValidationRules) -> Vec<Violation> {
    let mut violations = Vec::new();

    if input.borrower_fico() < rules.min_fico {
        violations.push(Violation::FicoBelowMinimum {
            fico: input.borrower_fico(),
            min_fico: rules.min_fico,
        });
    }

    let max_rehab = input.purchase_price().percentage(rules.max_rehab_budget_percentage);
    if input.rehab_budget() > max_rehab {
        violations.push(Violation::RehabBudgetExceeded {
            max_percentage: rules.max_rehab_budget_percentage,
        });
    }

    // a non-positive price cannot come out of the builder; skip rather than divide by zero
    if let Some(ratio) = input.arv_to_purchase_ratio() {
        if ratio < rules.min_arv_to_purchase_ratio {
            violations.push(Violation::ArvRatioTooLow {
                min_ratio: rules.min_arv_to_purchase_ratio,
            });
        }
    }

    violations
}
