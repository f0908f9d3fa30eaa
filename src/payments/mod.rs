pub mod amortization;

pub use amortization::{
    monthly_payment, AmortizationSchedule, ScheduledPayment, STANDARD_TERM_MONTHS,
};
