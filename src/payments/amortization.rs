use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};

/// fully amortizing term used for quoted payments
pub const STANDARD_TERM_MONTHS: u32 = 360;

/// scheduled payment in amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    pub payment_number: u32,
    pub beginning_balance: Money,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// month-by-month schedule for a fixed-rate loan, amounts rounded to cents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub interest_rate: Rate,
    pub term_months: u32,
    pub monthly_payment: Money,
    pub payments: Vec<ScheduledPayment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// generate payment schedule
    pub fn generate(principal: Money, interest_rate: Rate, term_months: u32) -> Result<Self> {
        if term_months == 0 {
            return Err(LoanError::invalid_field("term_months", "must be at least 1"));
        }
        if principal.is_negative() {
            return Err(LoanError::invalid_field("principal", "cannot be negative"));
        }

        let monthly_rate = interest_rate.monthly_rate().as_decimal();
        let scheduled = monthly_payment(principal, interest_rate, term_months).round_dp(2);

        let mut payments = Vec::with_capacity(term_months as usize);
        let mut balance = principal.round_dp(2);
        let mut cumulative_interest = Money::ZERO;
        let mut cumulative_principal = Money::ZERO;

        for i in 1..=term_months {
            let interest_portion = (balance * monthly_rate).round_dp(2);
            let mut principal_portion = scheduled - interest_portion;
            let mut payment_amount = scheduled;

            // last payment absorbs cent rounding
            if i == term_months || principal_portion > balance {
                principal_portion = balance;
                payment_amount = principal_portion + interest_portion;
            }

            cumulative_interest += interest_portion;
            cumulative_principal += principal_portion;
            let ending_balance = balance - principal_portion;

            payments.push(ScheduledPayment {
                payment_number: i,
                beginning_balance: balance,
                payment_amount,
                principal_portion,
                interest_portion,
                ending_balance,
                cumulative_interest,
                cumulative_principal,
            });

            balance = ending_balance;
        }

        let total_payment = payments
            .iter()
            .map(|p| p.payment_amount)
            .fold(Money::ZERO, |acc, x| acc + x);

        Ok(Self {
            principal,
            interest_rate,
            term_months,
            monthly_payment: scheduled,
            payments,
            total_interest: cumulative_interest,
            total_payment,
        })
    }

    /// get payment for specific period (1-based)
    pub fn get_payment(&self, payment_number: u32) -> Option<&ScheduledPayment> {
        let index = payment_number.checked_sub(1)?;
        self.payments.get(index as usize)
    }

    /// get remaining balance after payment
    pub fn balance_after_payment(&self, payment_number: u32) -> Money {
        self.get_payment(payment_number)
            .map(|p| p.ending_balance)
            .unwrap_or(self.principal)
    }

    /// principal repaid during the first twelve payments
    pub fn first_year_principal(&self) -> Money {
        self.payments
            .iter()
            .take(12)
            .map(|p| p.principal_portion)
            .fold(Money::ZERO, |acc, x| acc + x)
    }
}

/// level monthly payment, unrounded
///
/// `P * r / (1 - (1 + r)^-n)` with `r` the monthly rate. A zero rate has no
/// amortization factor and pays back `P / n`.
pub fn monthly_payment(principal: Money, annual_rate: Rate, months: u32) -> Money {
    if months == 0 {
        return principal;
    }

    let r = annual_rate.monthly_rate().as_decimal();

    if r.is_zero() {
        return principal / Decimal::from(months);
    }

    // (1 + r)^n, then P * r * c / (c - 1), which equals the negative-power form
    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..months {
        compound *= base;
    }

    principal * (r * compound / (compound - Decimal::ONE))
}
