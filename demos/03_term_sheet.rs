/// term sheet - render and send a quoted deal
use chrono::{TimeZone, Utc};
use loan_terms_rs::{
    ConfigStore, DealInput, DocumentRenderer, ExperienceLevel, JsonRenderer, LoanCalculator,
    Money, OutboxDispatcher, SafeTimeProvider, TextRenderer, TimeSource, TransactionType,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // fixed clock so the sheet is reproducible
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    ));
    let mut calculator = LoanCalculator::new(ConfigStore::default(), time);

    let deal = DealInput::builder()
        .address("200 Lakeview Dr")
        .transaction_type(TransactionType::Purchase)
        .purchase_price(Money::from_major(200_000))
        .rehab_budget(Money::from_major(50_000))
        .arv(Money::from_major(300_000))
        .borrower_fico(760)
        .borrower_experience(ExperienceLevel::Professional)
        .build()?;

    let outcome = calculator.quote(&deal);
    let quote = outcome.quote().ok_or("deal was rejected")?;

    let sheet = calculator.produce_document(quote)?;
    let text = TextRenderer.render(&sheet)?;
    println!("{}", text.body);

    let json = JsonRenderer.render(&sheet)?;
    println!("{} ({} bytes)", json.file_name, json.body.len());

    let outbox = OutboxDispatcher::new();
    let sent = calculator.dispatch_notification(quote, "borrower@example.com", &outbox);
    let signed = calculator.request_signature(quote, "borrower@example.com", &outbox);
    println!("\nterm sheet sent: {}, signature requested: {}", sent, signed);

    for message in outbox.sent() {
        println!("  {:?} -> {}: {}", message.kind, message.recipient, message.subject);
    }

    Ok(())
}
