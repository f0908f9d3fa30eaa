use std::sync::Arc;

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::deal::DealInput;
use crate::document::{format_currency, TermSheetRecord};
use crate::errors::{LoanError, Result};
use crate::formula::LoanTerms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// term sheet delivered for review
    TermSheet,
    /// term sheet sent out for e-signature
    SignatureRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub message_id: Uuid,
    pub kind: MessageKind,
    pub recipient: String,
    pub subject: String,
    pub record: TermSheetRecord,
    pub created_at: DateTime<Utc>,
}

/// transport for outbound messages
pub trait NotificationDispatcher: Send + Sync {
    fn dispatch(&self, message: OutboundMessage) -> Result<()>;
}

/// records messages in memory instead of sending them
#[derive(Debug, Clone, Default)]
pub struct OutboxDispatcher {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    offline: bool,
}

impl OutboxDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// an outbox that refuses every message
    pub fn offline() -> Self {
        Self {
            sent: Arc::default(),
            offline: true,
        }
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

impl NotificationDispatcher for OutboxDispatcher {
    fn dispatch(&self, message: OutboundMessage) -> Result<()> {
        if self.offline {
            return Err(LoanError::DispatchFailed {
                message: "outbox is offline".to_string(),
            });
        }
        debug!(recipient = %message.recipient, kind = ?message.kind, "message queued");
        self.sent.lock().push(message);
        Ok(())
    }
}

/// trimmed recipient address if it looks like `local@domain.tld`
pub fn validate_recipient(address: &str) -> Result<String> {
    let trimmed = address.trim();
    let invalid = || LoanError::InvalidRecipient {
        address: trimmed.to_string(),
    };

    if trimmed.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }

    Ok(trimmed.to_string())
}

/// build and dispatch a message, returning its id
pub fn send_message(
    kind: MessageKind,
    terms: &LoanTerms,
    input: &DealInput,
    recipient: &str,
    dispatcher: &dyn NotificationDispatcher,
    time_provider: &SafeTimeProvider,
) -> Result<Uuid> {
    let recipient = validate_recipient(recipient)?;
    let record = TermSheetRecord::new(terms, input)?;

    let subject = match kind {
        MessageKind::TermSheet => format!(
            "Term sheet for {}: {} at {:.2}%",
            record.address,
            format_currency(terms.max_loan_amount),
            terms.interest_rate
        ),
        MessageKind::SignatureRequest => format!("Signature requested: term sheet for {}", record.address),
    };

    let message_id = Uuid::new_v4();
    dispatcher.dispatch(OutboundMessage {
        message_id,
        kind,
        recipient,
        subject,
        record,
        created_at: time_provider.now(),
    })?;

    Ok(message_id)
}

/// deliver the term sheet; true when the dispatcher accepted it
pub fn dispatch_notification(
    terms: &LoanTerms,
    input: &DealInput,
    recipient_email: &str,
    dispatcher: &dyn NotificationDispatcher,
    time_provider: &SafeTimeProvider,
) -> bool {
    report(send_message(
        MessageKind::TermSheet,
        terms,
        input,
        recipient_email,
        dispatcher,
        time_provider,
    ))
}

/// send the term sheet out for e-signature; true when the dispatcher accepted it
pub fn request_signature(
    terms: &LoanTerms,
    input: &DealInput,
    recipient_email: &str,
    dispatcher: &dyn NotificationDispatcher,
    time_provider: &SafeTimeProvider,
) -> bool {
    report(send_message(
        MessageKind::SignatureRequest,
        terms,
        input,
        recipient_email,
        dispatcher,
        time_provider,
    ))
}

fn report(result: Result<Uuid>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "notification not sent");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RateTable, ValidationRules};
    use crate::decimal::Money;
    use crate::formula::compute_terms;
    use crate::types::{ExperienceLevel, TransactionType};
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;

    fn sample() -> (LoanTerms, DealInput) {
        let input = DealInput::builder()
            .address("5 Quarry Ln")
            .transaction_type(TransactionType::Refinance)
            .purchase_price(Money::from_major(150_000))
            .rehab_budget(Money::from_major(30_000))
            .arv(Money::from_major(240_000))
            .borrower_fico(705)
            .borrower_experience(ExperienceLevel::Experienced)
            .build()
            .unwrap();
        let terms = compute_terms(&input, &RateTable::default(), &ValidationRules::default());
        (terms, input)
    }

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_validate_recipient() {
        assert_eq!(validate_recipient("  borrower@example.com ").unwrap(), "borrower@example.com");
        assert!(validate_recipient("a.b+c@mail.example.org").is_ok());

        for bad in ["", "borrower", "@example.com", "borrower@", "borrower@example", "a@@b.com", "a b@c.com", "a@b..com"] {
            assert!(
                matches!(validate_recipient(bad), Err(LoanError::InvalidRecipient { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_dispatch_records_message() {
        let (terms, input) = sample();
        let outbox = OutboxDispatcher::new();

        assert!(dispatch_notification(&terms, &input, "owner@example.com", &outbox, &test_time()));

        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, MessageKind::TermSheet);
        assert_eq!(sent[0].recipient, "owner@example.com");
        assert_eq!(sent[0].record.terms, terms);
        // 80% of 240000 at 8.5 - 1.0 - 0.25
        assert_eq!(sent[0].subject, "Term sheet for 5 Quarry Ln: $192,000 at 7.25%");
    }

    #[test]
    fn test_signature_request() {
        let (terms, input) = sample();
        let outbox = OutboxDispatcher::new();

        assert!(request_signature(&terms, &input, "owner@example.com", &outbox, &test_time()));
        assert_eq!(outbox.sent()[0].kind, MessageKind::SignatureRequest);
        assert_eq!(outbox.sent()[0].subject, "Signature requested: term sheet for 5 Quarry Ln");
    }

    #[test]
    fn test_bad_recipient_returns_false() {
        let (terms, input) = sample();
        let outbox = OutboxDispatcher::new();

        assert!(!dispatch_notification(&terms, &input, "not-an-address", &outbox, &test_time()));
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_offline_dispatcher_returns_false() {
        let (terms, input) = sample();
        let outbox = OutboxDispatcher::offline();

        assert!(!dispatch_notification(&terms, &input, "owner@example.com", &outbox, &test_time()));

        let err = send_message(
            MessageKind::TermSheet,
            &terms,
            &input,
            "owner@example.com",
            &outbox,
            &test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, LoanError::DispatchFailed { .. }));
    }
}
