use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::{LoanError, Result};
use crate::types::ExperienceLevel;

/// pricing configuration, all figures in percentage points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base_interest_rate: Decimal,
    pub fico_750_discount: Decimal,
    pub fico_700_discount: Decimal,
    pub fico_650_discount: Decimal,
    pub professional_discount: Decimal,
    pub experienced_discount: Decimal,
    pub min_interest_rate: Decimal,
    pub ltv_beginner: Decimal,
    pub ltv_intermediate: Decimal,
    pub ltv_experienced: Decimal,
    pub ltv_professional: Decimal,
    pub closing_costs_percentage: Decimal,
    pub origination_fee_percentage: Decimal,
}

/// one row of the fico discount table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FicoTier {
    pub min_fico: u16,
    pub discount: Decimal,
}

/// one row of the experience pricing table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceTier {
    pub level: ExperienceLevel,
    pub ltv: Decimal,
    pub discount: Decimal,
}

const LTV_BOUNDS: (Decimal, Decimal) = (dec!(50), dec!(90));
const RATE_BOUNDS: (Decimal, Decimal) = (dec!(0), dec!(20));
const FEE_BOUNDS: (Decimal, Decimal) = (dec!(0), dec!(10));

impl Default for RateTable {
    fn default() -> Self {
        Self {
            base_interest_rate: dec!(8.5),
            fico_750_discount: dec!(1.5),
            fico_700_discount: dec!(1.0),
            fico_650_discount: dec!(0.5),
            professional_discount: dec!(0.5),
            experienced_discount: dec!(0.25),
            min_interest_rate: dec!(6.0),
            ltv_beginner: dec!(70),
            ltv_intermediate: dec!(75),
            ltv_experienced: dec!(80),
            ltv_professional: dec!(85),
            closing_costs_percentage: dec!(3),
            origination_fee_percentage: dec!(1),
        }
    }
}

impl RateTable {
    /// fico discount tiers, highest threshold first
    pub fn fico_tiers(&self) -> [FicoTier; 3] {
        [
            FicoTier { min_fico: 750, discount: self.fico_750_discount },
            FicoTier { min_fico: 700, discount: self.fico_700_discount },
            FicoTier { min_fico: 650, discount: self.fico_650_discount },
        ]
    }

    /// the single fico tier a score qualifies for, if any
    pub fn fico_tier_for(&self, fico: u16) -> Option<FicoTier> {
        self.fico_tiers().into_iter().find(|tier| fico >= tier.min_fico)
    }

    pub fn fico_discount(&self, fico: u16) -> Decimal {
        self.fico_tier_for(fico)
            .map(|tier| tier.discount)
            .unwrap_or(Decimal::ZERO)
    }

    /// experience tiers, most experienced first
    pub fn experience_tiers(&self) -> [ExperienceTier; 4] {
        [
            ExperienceTier {
                level: ExperienceLevel::Professional,
                ltv: self.ltv_professional,
                discount: self.professional_discount,
            },
            ExperienceTier {
                level: ExperienceLevel::Experienced,
                ltv: self.ltv_experienced,
                discount: self.experienced_discount,
            },
            ExperienceTier {
                level: ExperienceLevel::Intermediate,
                ltv: self.ltv_intermediate,
                discount: Decimal::ZERO,
            },
            ExperienceTier {
                level: ExperienceLevel::Beginner,
                ltv: self.ltv_beginner,
                discount: Decimal::ZERO,
            },
        ]
    }

    pub fn experience_tier(&self, level: ExperienceLevel) -> ExperienceTier {
        let tiers = self.experience_tiers();
        let fallback = tiers[3];
        tiers
            .into_iter()
            .find(|tier| tier.level == level)
            .unwrap_or(fallback)
    }

    pub fn ltv_for(&self, level: ExperienceLevel) -> Decimal {
        self.experience_tier(level).ltv
    }

    pub fn experience_discount(&self, level: ExperienceLevel) -> Decimal {
        self.experience_tier(level).discount
    }

    /// check every figure against its admin bounds
    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("base_interest_rate", self.base_interest_rate),
            ("fico_750_discount", self.fico_750_discount),
            ("fico_700_discount", self.fico_700_discount),
            ("fico_650_discount", self.fico_650_discount),
            ("professional_discount", self.professional_discount),
            ("experienced_discount", self.experienced_discount),
            ("min_interest_rate", self.min_interest_rate),
        ];
        let ltvs = [
            ("ltv_beginner", self.ltv_beginner),
            ("ltv_intermediate", self.ltv_intermediate),
            ("ltv_experienced", self.ltv_experienced),
            ("ltv_professional", self.ltv_professional),
        ];
        let fees = [
            ("closing_costs_percentage", self.closing_costs_percentage),
            ("origination_fee_percentage", self.origination_fee_percentage),
        ];

        for (name, value) in rates {
            check_bounds(name, value, RATE_BOUNDS)?;
        }
        for (name, value) in ltvs {
            check_bounds(name, value, LTV_BOUNDS)?;
        }
        for (name, value) in fees {
            check_bounds(name, value, FEE_BOUNDS)?;
        }

        if self.min_interest_rate > self.base_interest_rate {
            return Err(LoanError::InvalidConfiguration {
                message: format!(
                    "min_interest_rate {} exceeds base_interest_rate {}",
                    self.min_interest_rate, self.base_interest_rate
                ),
            });
        }

        Ok(())
    }

    /// parse and bound-check a rate table from json
    pub fn from_json(json: &str) -> Result<Self> {
        let table: RateTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// approval rule configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    pub min_fico: u16,
    /// percent of purchase price
    pub max_rehab_budget_percentage: Decimal,
    pub min_arv_to_purchase_ratio: Decimal,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_fico: 650,
            max_rehab_budget_percentage: dec!(50),
            min_arv_to_purchase_ratio: dec!(1.2),
        }
    }
}

impl ValidationRules {
    pub fn validate(&self) -> Result<()> {
        if !(300..=850).contains(&self.min_fico) {
            return Err(LoanError::InvalidConfiguration {
                message: format!("min_fico {} outside 300..=850", self.min_fico),
            });
        }
        check_bounds(
            "max_rehab_budget_percentage",
            self.max_rehab_budget_percentage,
            (dec!(0), dec!(100)),
        )?;
        check_bounds(
            "min_arv_to_purchase_ratio",
            self.min_arv_to_purchase_ratio,
            (dec!(1), dec!(3)),
        )?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let rules: ValidationRules = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// the pair of tables a calculation reads, always swapped as one unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanProgram {
    pub rates: RateTable,
    pub rules: ValidationRules,
}

impl LoanProgram {
    pub fn new(rates: RateTable, rules: ValidationRules) -> Result<Self> {
        rates.validate()?;
        rules.validate()?;
        Ok(Self { rates, rules })
    }
}

fn check_bounds(name: &str, value: Decimal, (min, max): (Decimal, Decimal)) -> Result<()> {
    if value < min || value > max {
        return Err(LoanError::InvalidConfiguration {
            message: format!("{} {} outside {}..={}", name, value, min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RateTable::default().validate().is_ok());
        assert!(ValidationRules::default().validate().is_ok());
        assert!(LoanProgram::new(RateTable::default(), ValidationRules::default()).is_ok());
    }

    #[test]
    fn test_fico_tiers_are_ordered_and_exclusive() {
        let rates = RateTable::default();
        let tiers = rates.fico_tiers();
        assert!(tiers.windows(2).all(|w| w[0].min_fico > w[1].min_fico));

        assert_eq!(rates.fico_discount(850), dec!(1.5));
        assert_eq!(rates.fico_discount(750), dec!(1.5));
        assert_eq!(rates.fico_discount(749), dec!(1.0));
        assert_eq!(rates.fico_discount(700), dec!(1.0));
        assert_eq!(rates.fico_discount(699), dec!(0.5));
        assert_eq!(rates.fico_discount(650), dec!(0.5));
        assert_eq!(rates.fico_discount(649), Decimal::ZERO);
        assert!(rates.fico_tier_for(300).is_none());
    }

    #[test]
    fn test_experience_table() {
        let rates = RateTable::default();
        assert_eq!(rates.ltv_for(ExperienceLevel::Professional), dec!(85));
        assert_eq!(rates.ltv_for(ExperienceLevel::Experienced), dec!(80));
        assert_eq!(rates.ltv_for(ExperienceLevel::Intermediate), dec!(75));
        assert_eq!(rates.ltv_for(ExperienceLevel::Beginner), dec!(70));

        assert_eq!(rates.experience_discount(ExperienceLevel::Professional), dec!(0.5));
        assert_eq!(rates.experience_discount(ExperienceLevel::Experienced), dec!(0.25));
        assert_eq!(rates.experience_discount(ExperienceLevel::Intermediate), Decimal::ZERO);
        assert_eq!(rates.experience_discount(ExperienceLevel::Beginner), Decimal::ZERO);
    }

    #[test]
    fn test_rate_table_bounds() {
        let mut rates = RateTable::default();
        rates.ltv_professional = dec!(95);
        assert!(matches!(rates.validate(), Err(LoanError::InvalidConfiguration { .. })));

        let mut rates = RateTable::default();
        rates.base_interest_rate = dec!(21);
        assert!(rates.validate().is_err());

        let mut rates = RateTable::default();
        rates.min_interest_rate = dec!(9);
        let err = rates.validate().unwrap_err();
        assert!(err.to_string().contains("min_interest_rate"));
    }

    #[test]
    fn test_validation_rule_bounds() {
        let mut rules = ValidationRules::default();
        rules.min_fico = 200;
        assert!(rules.validate().is_err());

        let mut rules = ValidationRules::default();
        rules.min_arv_to_purchase_ratio = dec!(0.9);
        assert!(rules.validate().is_err());

        let mut rules = ValidationRules::default();
        rules.max_rehab_budget_percentage = dec!(100);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip_keeps_decimal_strings() {
        let json = RateTable::default().to_json_pretty().unwrap();
        assert!(json.contains("\"base_interest_rate\": \"8.5\""));
        assert_eq!(RateTable::from_json(&json).unwrap(), RateTable::default());
    }

    #[test]
    fn test_from_json_rejects_out_of_bounds() {
        let json = r#"{"min_fico": 900, "max_rehab_budget_percentage": "50", "min_arv_to_purchase_ratio": "1.2"}"#;
        assert!(matches!(
            ValidationRules::from_json(json),
            Err(LoanError::InvalidConfiguration { .. })
        ));

        assert!(matches!(
            ValidationRules::from_json("{not json"),
            Err(LoanError::Serialization(_))
        ));
    }
}
