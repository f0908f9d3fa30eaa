/// quick start - quote one deal with the default loan program
use loan_terms_rs::{
    ConfigStore, DealInput, ExperienceLevel, LoanCalculator, Money, QuoteOutcome,
    SafeTimeProvider, TimeSource, TransactionType,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut calculator = LoanCalculator::new(
        ConfigStore::default(),
        SafeTimeProvider::new(TimeSource::System),
    );

    // a $200,000 purchase with $50,000 of rehab
    let deal = DealInput::builder()
        .address("100 Harbor Way")
        .transaction_type(TransactionType::Purchase)
        .purchase_price(Money::from_major(200_000))
        .rehab_budget(Money::from_major(50_000))
        .arv(Money::from_major(300_000))
        .borrower_fico(760)
        .borrower_experience(ExperienceLevel::Professional)
        .build()?;

    match calculator.quote(&deal) {
        QuoteOutcome::Quoted(quote) => {
            println!("{}", serde_json::to_string_pretty(&quote.terms)?);
            for warning in &quote.warnings {
                println!("warning: {}", warning);
            }
        }
        QuoteOutcome::Rejected { violations, .. } => {
            for violation in violations {
                println!("rejected: {}", violation);
            }
        }
    }

    Ok(())
}
