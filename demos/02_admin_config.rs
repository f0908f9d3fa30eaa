/// admin config - replace rate tables and rules while quoting continues
use loan_terms_rs::{
    ConfigStore, DealInput, ExperienceLevel, LoanCalculator, Money, RateTable,
    SafeTimeProvider, TimeSource, TransactionType, ValidationRules,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== admin config example ===\n");

    let store = ConfigStore::default();
    let mut calculator = LoanCalculator::new(
        store.clone(),
        SafeTimeProvider::new(TimeSource::System),
    );

    let deal = DealInput::builder()
        .address("8 Mill Rd")
        .transaction_type(TransactionType::CashOutRefinance)
        .purchase_price(Money::from_major(180_000))
        .rehab_budget(Money::from_major(40_000))
        .arv(Money::from_major(280_000))
        .borrower_fico(690)
        .borrower_experience(ExperienceLevel::Experienced)
        .build()?;

    let before = calculator.quote(&deal);
    if let Some(quote) = before.quote() {
        println!("default program: {}% on ${}", quote.terms.interest_rate, quote.terms.max_loan_amount);
    }

    // tables round-trip through json, the shape an admin screen edits
    let mut rates = RateTable::from_json(&store.rate_table().to_json_pretty()?)?;
    rates.base_interest_rate = dec!(9.25);
    rates.ltv_experienced = dec!(75);
    calculator.replace_rate_table(rates)?;

    let after = calculator.quote(&deal);
    if let Some(quote) = after.quote() {
        println!("updated rates:   {}% on ${}", quote.terms.interest_rate, quote.terms.max_loan_amount);
    }

    // out-of-bounds tables are refused and the current one stays live
    let bad = RateTable {
        ltv_professional: dec!(95),
        ..store.rate_table()
    };
    if let Err(e) = calculator.replace_rate_table(bad) {
        println!("\nrejected update: {}", e);
    }

    // tighten the fico rule
    calculator.replace_validation_rules(ValidationRules {
        min_fico: 700,
        ..ValidationRules::default()
    })?;
    let tightened = calculator.quote(&deal);
    for violation in tightened.violations() {
        println!("after rule change: {}", violation);
    }

    println!("\n{}", store.validation_rules().to_json_pretty()?);

    Ok(())
}
