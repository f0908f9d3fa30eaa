/// rule violations - every failed rule is reported at once
use loan_terms_rs::{
    ConfigStore, DealSubmission, Decimal, LoanCalculator, SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== rule violations example ===\n");

    let mut calculator = LoanCalculator::new(
        ConfigStore::default(),
        SafeTimeProvider::new(TimeSource::System),
    );

    // raw form input: low fico, heavy rehab, thin arv
    let submission = DealSubmission {
        address: Some("12 Elm St".to_string()),
        transaction_type: Some("purchase".to_string()),
        purchase_price: Some(Decimal::from(200_000)),
        rehab_budget: Some(Decimal::from(120_000)),
        arv: Some(Decimal::from(220_000)),
        borrower_fico: Some(610),
        borrower_experience: Some("Beginner".to_string()),
    };

    let outcome = calculator.quote_submission(submission)?;
    println!("deal {} quoted: {}", outcome.deal_id(), outcome.is_quoted());
    for violation in outcome.violations() {
        println!("  - {}", violation);
    }

    // malformed fields never reach the rules
    let malformed = DealSubmission {
        address: Some("   ".to_string()),
        transaction_type: Some("lease".to_string()),
        borrower_fico: Some(910),
        ..DealSubmission::default()
    };

    match calculator.quote_submission(malformed) {
        Ok(_) => println!("\nunexpectedly accepted"),
        Err(e) => {
            println!("\ninput errors:");
            for field in e.field_errors() {
                println!("  - {}", field);
            }
        }
    }

    println!("\n{} events recorded", calculator.events.events().len());

    Ok(())
}
