use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{RateTable, ValidationRules};
use crate::deal::{DealInput, DealSubmission};
use crate::document::{self, format_currency, TermSheet};
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::formula::{compute_terms, LoanTerms};
use crate::notify::{self, MessageKind, NotificationDispatcher};
use crate::store::ConfigStore;
use crate::types::DealId;
use crate::validation::{validate, Violation};

/// terms quoted for one deal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub deal_id: DealId,
    pub input: DealInput,
    pub terms: LoanTerms,
    /// notes for the loan officer that do not block the quote
    pub warnings: Vec<String>,
    pub quoted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum QuoteOutcome {
    Quoted(Quote),
    Rejected {
        deal_id: DealId,
        violations: Vec<Violation>,
    },
}

impl QuoteOutcome {
    pub fn deal_id(&self) -> DealId {
        match self {
            QuoteOutcome::Quoted(quote) => quote.deal_id,
            QuoteOutcome::Rejected { deal_id, .. } => *deal_id,
        }
    }

    pub fn quote(&self) -> Option<&Quote> {
        match self {
            QuoteOutcome::Quoted(quote) => Some(quote),
            QuoteOutcome::Rejected { .. } => None,
        }
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            QuoteOutcome::Quoted(_) => &[],
            QuoteOutcome::Rejected { violations, .. } => violations,
        }
    }

    pub fn is_quoted(&self) -> bool {
        matches!(self, QuoteOutcome::Quoted(_))
    }
}

/// entry point tying configuration, validation and the formula engine together
pub struct LoanCalculator {
    pub config: ConfigStore,
    pub events: EventStore,
    time_provider: SafeTimeProvider,
}

impl LoanCalculator {
    pub fn new(config: ConfigStore, time_provider: SafeTimeProvider) -> Self {
        Self {
            config,
            events: EventStore::new(),
            time_provider,
        }
    }

    pub fn time_provider(&self) -> &SafeTimeProvider {
        &self.time_provider
    }

    /// validate a deal and, if every rule passes, compute its terms
    ///
    /// Both steps read the same configuration snapshot, so an admin update landing
    /// mid-call cannot mix old rules with new rates.
    pub fn quote(&mut self, input: &DealInput) -> QuoteOutcome {
        let program = self.config.snapshot();
        let deal_id = Uuid::new_v4();
        let now = self.time_provider.now();

        self.events.emit(Event::DealSubmitted {
            deal_id,
            address: input.address().to_string(),
            timestamp: now,
        });

        let violations = validate(input, &program.rules);
        if !violations.is_empty() {
            let messages: Vec<String> = violations.iter().map(Violation::message).collect();
            info!(%deal_id, violations = ?messages, "deal rejected");
            self.events.emit(Event::ViolationsReported {
                deal_id,
                messages,
                timestamp: now,
            });
            return QuoteOutcome::Rejected { deal_id, violations };
        }

        let terms = compute_terms(input, &program.rates, &program.rules);

        let mut warnings = Vec::new();
        if terms.has_negative_down_payment() {
            let note = format!(
                "loan exceeds total project cost by {}",
                format_currency(terms.down_payment.abs())
            );
            warn!(%deal_id, down_payment = %terms.down_payment, "negative down payment");
            warnings.push(note);
        }

        info!(
            %deal_id,
            max_loan = %terms.max_loan_amount,
            rate = %terms.interest_rate,
            status = %terms.approval_status,
            "terms computed"
        );
        self.events.emit(Event::TermsComputed {
            deal_id,
            max_loan_amount: terms.max_loan_amount,
            interest_rate: terms.interest_rate,
            approval_status: terms.approval_status,
            timestamp: now,
        });

        QuoteOutcome::Quoted(Quote {
            deal_id,
            input: input.clone(),
            terms,
            warnings,
            quoted_at: now,
        })
    }

    /// parse a raw submission and quote it; malformed fields fail before any rule runs
    pub fn quote_submission(&mut self, submission: DealSubmission) -> Result<QuoteOutcome> {
        let input = submission.into_deal()?;
        Ok(self.quote(&input))
    }

    pub fn replace_rate_table(&mut self, rates: RateTable) -> Result<()> {
        self.config.replace_rate_table(rates)?;
        self.events.emit(Event::RateTableReplaced {
            timestamp: self.time_provider.now(),
        });
        Ok(())
    }

    pub fn replace_validation_rules(&mut self, rules: ValidationRules) -> Result<()> {
        self.config.replace_validation_rules(rules)?;
        self.events.emit(Event::ValidationRulesReplaced {
            timestamp: self.time_provider.now(),
        });
        Ok(())
    }

    pub fn produce_document(&mut self, quote: &Quote) -> Result<TermSheet> {
        let sheet = document::produce_document(&quote.terms, &quote.input, &self.time_provider)?;
        self.events.emit(Event::DocumentProduced {
            deal_id: quote.deal_id,
            document_id: sheet.document_id,
            timestamp: sheet.prepared_at,
        });
        Ok(sheet)
    }

    /// send the term sheet to a recipient; false if it could not be delivered
    pub fn dispatch_notification(
        &mut self,
        quote: &Quote,
        recipient_email: &str,
        dispatcher: &dyn NotificationDispatcher,
    ) -> bool {
        self.send(MessageKind::TermSheet, quote, recipient_email, dispatcher)
    }

    pub fn request_signature(
        &mut self,
        quote: &Quote,
        recipient_email: &str,
        dispatcher: &dyn NotificationDispatcher,
    ) -> bool {
        self.send(MessageKind::SignatureRequest, quote, recipient_email, dispatcher)
    }

    fn send(
        &mut self,
        kind: MessageKind,
        quote: &Quote,
        recipient: &str,
        dispatcher: &dyn NotificationDispatcher,
    ) -> bool {
        let result = notify::send_message(
            kind,
            &quote.terms,
            &quote.input,
            recipient,
            dispatcher,
            &self.time_provider,
        );
        let timestamp = self.time_provider.now();
        let recipient = recipient.trim().to_string();

        match result {
            Ok(_) => {
                self.events.emit(Event::NotificationDispatched {
                    deal_id: quote.deal_id,
                    recipient,
                    timestamp,
                });
                true
            }
            Err(e) => {
                warn!(deal_id = %quote.deal_id, error = %e, "notification not sent");
                self.events.emit(Event::NotificationFailed {
                    deal_id: quote.deal_id,
                    recipient,
                    reason: e.to_string(),
                    timestamp,
                });
                false
            }
        }
    }
}
