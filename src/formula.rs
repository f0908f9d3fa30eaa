use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{RateTable, ValidationRules};
use crate::deal::DealInput;
use crate::decimal::{round_percent, Money, Rate};
use crate::payments::{monthly_payment, STANDARD_TERM_MONTHS};
use crate::types::{ApprovalStatus, ExperienceLevel};

/// computed loan terms; money rounded to whole units, percentages to two places
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub max_loan_amount: Money,
    /// annual rate in percentage points
    pub interest_rate: Decimal,
    /// percent of arv
    pub ltv: Decimal,
    /// negative when the loan exceeds the project cost
    pub down_payment: Money,
    pub closing_costs: Money,
    pub origination_fee: Money,
    pub monthly_payment: Money,
    pub total_project_cost: Money,
    pub approval_status: ApprovalStatus,
}

impl LoanTerms {
    pub fn has_negative_down_payment(&self) -> bool {
        self.down_payment.is_negative()
    }

    pub fn annual_rate(&self) -> Rate {
        Rate::from_percent(self.interest_rate)
    }
}

/// terms before the final rounding step
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UnroundedTerms {
    pub max_loan_amount: Money,
    pub interest_rate: Decimal,
    pub ltv: Decimal,
    pub down_payment: Money,
    pub closing_costs: Money,
    pub origination_fee: Money,
    pub monthly_payment: Money,
    pub total_project_cost: Money,
    pub approval_status: ApprovalStatus,
}

impl UnroundedTerms {
    fn rounded(self) -> LoanTerms {
        LoanTerms {
            max_loan_amount: self.max_loan_amount.round_whole(),
            interest_rate: round_percent(self.interest_rate),
            ltv: round_percent(self.ltv),
            down_payment: self.down_payment.round_whole(),
            closing_costs: self.closing_costs.round_whole(),
            origination_fee: self.origination_fee.round_whole(),
            monthly_payment: self.monthly_payment.round_whole(),
            total_project_cost: self.total_project_cost.round_whole(),
            approval_status: self.approval_status,
        }
    }
}

/// compute the full set of loan terms for a deal
pub fn compute_terms(input: &DealInput, rates: &RateTable, rules: &ValidationRules) -> LoanTerms {
    compute_unrounded(input, rates, rules.min_fico).rounded()
}

/// annual rate for a borrower, unrounded: base less one fico tier and the
/// experience discount, floored at the table minimum
pub fn quoted_rate(fico: u16, experience: ExperienceLevel, rates: &RateTable) -> Decimal {
    let rate = rates.base_interest_rate
        - rates.fico_discount(fico)
        - rates.experience_discount(experience);
    rate.max(rates.min_interest_rate)
}

/// approval mirrors the minimum fico rule
pub fn approval_status(fico: u16, min_fico: u16) -> ApprovalStatus {
    if fico >= min_fico {
        ApprovalStatus::Approved
    } else {
        ApprovalStatus::PendingReview
    }
}

pub(crate) fn compute_unrounded(
    input: &DealInput,
    rates: &RateTable,
    min_fico: u16,
) -> UnroundedTerms {
    let ltv = rates.ltv_for(input.borrower_experience());
    let max_loan_amount = input.arv().percentage(ltv);
    let interest_rate = quoted_rate(input.borrower_fico(), input.borrower_experience(), rates);

    let closing_costs = max_loan_amount.percentage(rates.closing_costs_percentage);
    let origination_fee = max_loan_amount.percentage(rates.origination_fee_percentage);
    let total_project_cost = input.total_project_cost();
    let down_payment = total_project_cost - max_loan_amount;

    let payment = monthly_payment(
        max_loan_amount,
        Rate::from_percent(interest_rate),
        STANDARD_TERM_MONTHS,
    );

    UnroundedTerms {
        max_loan_amount,
        interest_rate,
        ltv,
        down_payment,
        closing_costs,
        origination_fee,
        monthly_payment: payment,
        total_project_cost,
        approval_status: approval_status(input.borrower_fico(), min_fico),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionType;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn deal(fico: u16, experience: ExperienceLevel) -> DealInput {
        DealInput::builder()
            .address("100 Harbor Way")
            .transaction_type(TransactionType::Purchase)
            .purchase_price(Money::from_major(200_000))
            .rehab_budget(Money::from_major(50_000))
            .arv(Money::from_major(300_000))
            .borrower_fico(fico)
            .borrower_experience(experience)
            .build()
            .unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let terms = compute_terms(
            &deal(760, ExperienceLevel::Professional),
            &RateTable::default(),
            &ValidationRules::default(),
        );

        assert_eq!(
            terms,
            LoanTerms {
                max_loan_amount: Money::from_major(255_000),
                interest_rate: dec!(6.5),
                ltv: dec!(85),
                down_payment: Money::from_major(-5_000),
                closing_costs: Money::from_major(7_650),
                origination_fee: Money::from_major(2_550),
                monthly_payment: Money::from_major(1_612),
                total_project_cost: Money::from_major(250_000),
                approval_status: ApprovalStatus::Approved,
            }
        );
        assert!(terms.has_negative_down_payment());
    }

    #[test]
    fn test_fico_750_boundary() {
        let rates = RateTable::default();
        let level = ExperienceLevel::Beginner;

        assert_eq!(quoted_rate(749, level, &rates), dec!(7.5));
        assert_eq!(quoted_rate(750, level, &rates), dec!(7.0));
        assert_eq!(quoted_rate(751, level, &rates), dec!(7.0));
    }

    #[test]
    fn test_fico_discount_is_not_cumulative() {
        let rates = RateTable::default();
        // only the 750 tier applies, not 750 + 700 + 650
        assert_eq!(quoted_rate(800, ExperienceLevel::Intermediate, &rates), dec!(7.0));
        assert_eq!(quoted_rate(700, ExperienceLevel::Intermediate, &rates), dec!(7.5));
        assert_eq!(quoted_rate(660, ExperienceLevel::Intermediate, &rates), dec!(8.0));
        assert_eq!(quoted_rate(640, ExperienceLevel::Intermediate, &rates), dec!(8.5));
    }

    #[test]
    fn test_experience_discounts() {
        let rates = RateTable::default();
        assert_eq!(quoted_rate(640, ExperienceLevel::Professional, &rates), dec!(8.0));
        assert_eq!(quoted_rate(640, ExperienceLevel::Experienced, &rates), dec!(8.25));
        assert_eq!(quoted_rate(640, ExperienceLevel::Beginner, &rates), dec!(8.5));
    }

    #[test]
    fn test_rate_never_below_floor() {
        let mut rates = RateTable::default();
        rates.min_interest_rate = dec!(7.25);

        for fico in (300..=850).step_by(10) {
            for level in ExperienceLevel::ALL {
                let terms = compute_terms(&deal(fico, level), &rates, &ValidationRules::default());
                assert!(terms.interest_rate >= rates.min_interest_rate);
            }
        }
        assert_eq!(quoted_rate(800, ExperienceLevel::Professional, &rates), dec!(7.25));
    }

    #[test]
    fn test_max_loan_is_exact_before_rounding() {
        let rates = RateTable {
            ltv_experienced: dec!(77.77),
            ..RateTable::default()
        };
        let input = DealInput::builder()
            .address("7 Pine Ct")
            .transaction_type(TransactionType::Refinance)
            .purchase_price(Money::from_major(123_457))
            .arv(Money::from_decimal(dec!(187654.33)))
            .borrower_fico(705)
            .borrower_experience(ExperienceLevel::Experienced)
            .build()
            .unwrap();

        let raw = compute_unrounded(&input, &rates, 650);
        assert_eq!(raw.max_loan_amount.as_decimal(), dec!(187654.33) * dec!(77.77) / dec!(100));
        assert_eq!(
            raw.down_payment,
            input.total_project_cost() - raw.max_loan_amount
        );

        let terms = compute_terms(&input, &rates, &ValidationRules::default());
        assert_eq!(terms.max_loan_amount, raw.max_loan_amount.round_whole());
    }

    #[test]
    fn test_compute_is_idempotent() {
        let input = deal(712, ExperienceLevel::Experienced);
        let rates = RateTable::default();
        let rules = ValidationRules::default();
        assert_eq!(compute_terms(&input, &rates, &rules), compute_terms(&input, &rates, &rules));
    }

    #[test]
    fn test_low_fico_is_pending_review() {
        let terms = compute_terms(
            &deal(600, ExperienceLevel::Intermediate),
            &RateTable::default(),
            &ValidationRules::default(),
        );
        assert_eq!(terms.approval_status, ApprovalStatus::PendingReview);
        // terms are still produced
        assert_eq!(terms.max_loan_amount, Money::from_major(225_000));
    }

    #[test]
    fn test_approval_follows_configured_threshold() {
        let rules = ValidationRules {
            min_fico: 700,
            ..ValidationRules::default()
        };
        let terms = compute_terms(&deal(680, ExperienceLevel::Beginner), &RateTable::default(), &rules);
        assert_eq!(terms.approval_status, ApprovalStatus::PendingReview);

        let terms = compute_terms(&deal(700, ExperienceLevel::Beginner), &RateTable::default(), &rules);
        assert_eq!(terms.approval_status, ApprovalStatus::Approved);
    }

    #[test]
    fn test_zero_rate_uses_straight_line_payment() {
        let rates = RateTable {
            base_interest_rate: dec!(1.0),
            min_interest_rate: dec!(0),
            ..RateTable::default()
        };
        let terms = compute_terms(
            &deal(760, ExperienceLevel::Professional),
            &rates,
            &ValidationRules::default(),
        );

        assert_eq!(terms.interest_rate, Decimal::ZERO);
        // 255000 / 360 = 708.33
        assert_eq!(terms.monthly_payment, Money::from_major(708));
    }

    #[test]
    fn test_largest_accepted_deal_computes() {
        let max = Money::from_major(crate::deal::MAX_PROPERTY_VALUE);
        let input = DealInput::builder()
            .address("1 Vast Estate")
            .transaction_type(TransactionType::Purchase)
            .purchase_price(max)
            .rehab_budget(max)
            .arv(max)
            .borrower_fico(850)
            .borrower_experience(ExperienceLevel::Professional)
            .build()
            .unwrap();

        let rates = RateTable {
            ltv_professional: dec!(90),
            base_interest_rate: dec!(20),
            closing_costs_percentage: dec!(10),
            origination_fee_percentage: dec!(10),
            ..RateTable::default()
        };
        let terms = compute_terms(&input, &rates, &ValidationRules::default());

        assert_eq!(terms.max_loan_amount, Money::from_major(900_000_000_000));
        assert_eq!(terms.total_project_cost, Money::from_major(2_000_000_000_000));
        assert_eq!(terms.down_payment, Money::from_major(1_100_000_000_000));
        assert_eq!(terms.closing_costs, Money::from_major(90_000_000_000));
        assert!(terms.monthly_payment > Money::ZERO);

        let schedule = crate::payments::AmortizationSchedule::generate(
            terms.max_loan_amount,
            terms.annual_rate(),
            STANDARD_TERM_MONTHS,
        )
        .unwrap();
        assert_eq!(schedule.balance_after_payment(STANDARD_TERM_MONTHS), Money::ZERO);
    }

    #[test]
    fn test_positive_down_payment() {
        let terms = compute_terms(
            &deal(700, ExperienceLevel::Beginner),
            &RateTable::default(),
            &ValidationRules::default(),
        );
        // 70% of 300000 against a 250000 project
        assert_eq!(terms.max_loan_amount, Money::from_major(210_000));
        assert_eq!(terms.down_payment, Money::from_major(40_000));
        assert!(!terms.has_negative_down_payment());
    }
}
