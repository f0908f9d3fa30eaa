pub mod calculator;
pub mod config;
pub mod deal;
pub mod decimal;
pub mod document;
pub mod errors;
pub mod events;
pub mod formula;
pub mod notify;
pub mod payments;
pub mod store;
pub mod types;
pub mod validation;

// re-export key types
pub use calculator::{LoanCalculator, Quote, QuoteOutcome};
pub use config::{ExperienceTier, FicoTier, LoanProgram, RateTable, ValidationRules};
pub use deal::{DealInput, DealInputBuilder, DealSubmission};
pub use decimal::{Money, Rate};
pub use document::{
    produce_document, DocumentRenderer, JsonRenderer, RenderedDocument, TermSheet,
    TermSheetRecord, TextRenderer,
};
pub use errors::{FieldError, LoanError, Result};
pub use events::{Event, EventStore};
pub use formula::{compute_terms, quoted_rate, LoanTerms};
pub use notify::{
    dispatch_notification, request_signature, MessageKind, NotificationDispatcher,
    OutboundMessage, OutboxDispatcher,
};
pub use payments::{AmortizationSchedule, ScheduledPayment, STANDARD_TERM_MONTHS};
pub use store::ConfigStore;
pub use types::{ApprovalStatus, DealId, DocumentId, ExperienceLevel, TransactionType};
pub use validation::{validate, Violation};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
