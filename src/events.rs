use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{ApprovalStatus, DealId, DocumentId};

/// all events that can be emitted while quoting deals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // quote events
    DealSubmitted {
        deal_id: DealId,
        address: String,
        timestamp: DateTime<Utc>,
    },
    ViolationsReported {
        deal_id: DealId,
        messages: Vec<String>,
        timestamp: DateTime<Utc>,
    },
    TermsComputed {
        deal_id: DealId,
        max_loan_amount: Money,
        interest_rate: Decimal,
        approval_status: ApprovalStatus,
        timestamp: DateTime<Utc>,
    },

    // admin events
    RateTableReplaced {
        timestamp: DateTime<Utc>,
    },
    ValidationRulesReplaced {
        timestamp: DateTime<Utc>,
    },

    // output events
    DocumentProduced {
        deal_id: DealId,
        document_id: DocumentId,
        timestamp: DateTime<Utc>,
    },
    NotificationDispatched {
        deal_id: DealId,
        recipient: String,
        timestamp: DateTime<Utc>,
    },
    NotificationFailed {
        deal_id: DealId,
        recipient: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
