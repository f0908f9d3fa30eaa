use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::deal::DealInput;
use crate::decimal::Money;
use crate::errors::Result;
use crate::formula::LoanTerms;
use crate::payments::{AmortizationSchedule, STANDARD_TERM_MONTHS};
use crate::types::{DocumentId, ExperienceLevel, TransactionType};

/// merged input and terms record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermSheetRecord {
    pub address: String,
    pub transaction_type: TransactionType,
    pub purchase_price: Money,
    pub rehab_budget: Money,
    pub arv: Money,
    pub borrower_fico: u16,
    pub borrower_experience: ExperienceLevel,
    #[serde(flatten)]
    pub terms: LoanTerms,
    pub term_months: u32,
    pub total_interest: Money,
    pub first_year_principal: Money,
}

impl TermSheetRecord {
    pub fn new(terms: &LoanTerms, input: &DealInput) -> Result<Self> {
        let schedule = AmortizationSchedule::generate(
            terms.max_loan_amount,
            terms.annual_rate(),
            STANDARD_TERM_MONTHS,
        )?;

        Ok(Self {
            address: input.address().to_string(),
            transaction_type: input.transaction_type(),
            purchase_price: input.purchase_price(),
            rehab_budget: input.rehab_budget(),
            arv: input.arv(),
            borrower_fico: input.borrower_fico(),
            borrower_experience: input.borrower_experience(),
            terms: terms.clone(),
            term_months: STANDARD_TERM_MONTHS,
            total_interest: schedule.total_interest.round_whole(),
            first_year_principal: schedule.first_year_principal().round_whole(),
        })
    }
}

/// exportable term sheet artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermSheet {
    pub document_id: DocumentId,
    pub prepared_at: DateTime<Utc>,
    pub record: TermSheetRecord,
}

impl TermSheet {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// short alias for json output
    pub fn json(&self) -> String {
        self.to_json_pretty()
            .unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}

/// build the term sheet handed to renderers
pub fn produce_document(
    terms: &LoanTerms,
    input: &DealInput,
    time_provider: &SafeTimeProvider,
) -> Result<TermSheet> {
    Ok(TermSheet {
        document_id: Uuid::new_v4(),
        prepared_at: time_provider.now(),
        record: TermSheetRecord::new(terms, input)?,
    })
}

/// rendered output ready for export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

pub trait DocumentRenderer {
    fn render(&self, sheet: &TermSheet) -> Result<RenderedDocument>;
}

/// json export of the full record
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl DocumentRenderer for JsonRenderer {
    fn render(&self, sheet: &TermSheet) -> Result<RenderedDocument> {
        Ok(RenderedDocument {
            file_name: file_name(sheet, "json"),
            content_type: "application/json",
            body: sheet.to_json_pretty()?,
        })
    }
}

/// plain-text term sheet
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl DocumentRenderer for TextRenderer {
    fn render(&self, sheet: &TermSheet) -> Result<RenderedDocument> {
        let r = &sheet.record;
        let t = &r.terms;
        let mut out = String::new();

        // writing to a String cannot fail
        let _ = writeln!(out, "LOAN TERM SHEET");
        let _ = writeln!(out, "Document: {}", sheet.document_id);
        let _ = writeln!(out, "Prepared: {}", sheet.prepared_at.format("%Y-%m-%d"));
        let _ = writeln!(out);
        let _ = writeln!(out, "Property:     {}", r.address);
        let _ = writeln!(out, "Transaction:  {}", r.transaction_type);
        let _ = writeln!(out, "Borrower:     FICO {}, {}", r.borrower_fico, r.borrower_experience);
        let _ = writeln!(out);
        let _ = writeln!(out, "DEAL");
        line(&mut out, "Purchase price", format_currency(r.purchase_price));
        line(&mut out, "Rehab budget", format_currency(r.rehab_budget));
        line(&mut out, "After-repair value", format_currency(r.arv));
        line(&mut out, "Total project cost", format_currency(t.total_project_cost));
        let _ = writeln!(out);
        let _ = writeln!(out, "TERMS");
        line(&mut out, "Max loan amount", format_currency(t.max_loan_amount));
        line(&mut out, "Loan-to-value", format_percent(t.ltv));
        line(&mut out, "Interest rate", format_percent(t.interest_rate));
        line(
            &mut out,
            &format!("Monthly payment ({} mo)", r.term_months),
            format_currency(t.monthly_payment),
        );
        line(&mut out, "Down payment", format_currency(t.down_payment));
        line(&mut out, "Closing costs", format_currency(t.closing_costs));
        line(&mut out, "Origination fee", format_currency(t.origination_fee));
        line(&mut out, "Total interest", format_currency(r.total_interest));
        let _ = writeln!(out);
        let _ = writeln!(out, "Approval status: {}", t.approval_status);

        if t.has_negative_down_payment() {
            let _ = writeln!(
                out,
                "Note: loan exceeds total project cost by {}",
                format_currency(t.down_payment.abs())
            );
        }

        Ok(RenderedDocument {
            file_name: file_name(sheet, "txt"),
            content_type: "text/plain; charset=utf-8",
            body: out,
        })
    }
}

fn line(out: &mut String, label: &str, value: String) {
    let _ = writeln!(out, "  {:<24}{:>14}", label, value);
}

fn file_name(sheet: &TermSheet, extension: &str) -> String {
    let id = sheet.document_id.simple().to_string();
    format!("term-sheet-{}.{}", &id[..8], extension)
}

/// whole-unit dollar amount with thousands separators
pub fn format_currency(amount: Money) -> String {
    let rounded = amount.round_whole().as_decimal();
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded < Decimal::ZERO {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// two-place percentage
pub fn format_percent(value: Decimal) -> String {
    format!("{:.2}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RateTable, ValidationRules};
    use crate::formula::compute_terms;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;
    use pretty_assertions::assert_eq;

    fn sample() -> (LoanTerms, DealInput) {
        let input = DealInput::builder()
            .address("200 Lakeview Dr")
            .transaction_type(TransactionType::Purchase)
            .purchase_price(Money::from_major(200_000))
            .rehab_budget(Money::from_major(50_000))
            .arv(Money::from_major(300_000))
            .borrower_fico(760)
            .borrower_experience(ExperienceLevel::Professional)
            .build()
            .unwrap();
        let terms = compute_terms(&input, &RateTable::default(), &ValidationRules::default());
        (terms, input)
    }

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Money::from_major(255_000)), "$255,000");
        assert_eq!(format_currency(Money::from_major(-5_000)), "-$5,000");
        assert_eq!(format_currency(Money::from_major(999)), "$999");
        assert_eq!(format_currency(Money::from_major(1_234_567)), "$1,234,567");
        assert_eq!(format_currency(Money::ZERO), "$0");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(rust_decimal_macros::dec!(6.5)), "6.50%");
        assert_eq!(format_percent(rust_decimal_macros::dec!(85)), "85.00%");
    }

    #[test]
    fn test_produce_document_merges_input_and_terms() {
        let (terms, input) = sample();
        let sheet = produce_document(&terms, &input, &test_time()).unwrap();

        assert_eq!(sheet.prepared_at, Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap());
        assert_eq!(sheet.record.address, "200 Lakeview Dr");
        assert_eq!(sheet.record.terms, terms);
        assert_eq!(sheet.record.term_months, 360);
        assert!(sheet.record.total_interest > terms.max_loan_amount);
    }

    #[test]
    fn test_record_field_set_is_stable() {
        let (terms, input) = sample();
        let record = TermSheetRecord::new(&terms, &input).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();

        assert_eq!(
            keys,
            vec![
                "address",
                "approval_status",
                "arv",
                "borrower_experience",
                "borrower_fico",
                "closing_costs",
                "down_payment",
                "first_year_principal",
                "interest_rate",
                "ltv",
                "max_loan_amount",
                "monthly_payment",
                "origination_fee",
                "purchase_price",
                "rehab_budget",
                "term_months",
                "total_interest",
                "total_project_cost",
                "transaction_type",
            ]
        );
    }

    #[test]
    fn test_json_renderer() {
        let (terms, input) = sample();
        let sheet = produce_document(&terms, &input, &test_time()).unwrap();
        let rendered = JsonRenderer.render(&sheet).unwrap();

        assert_eq!(rendered.content_type, "application/json");
        assert!(rendered.file_name.starts_with("term-sheet-"));
        assert!(rendered.file_name.ends_with(".json"));

        let parsed: TermSheet = serde_json::from_str(&rendered.body).unwrap();
        assert_eq!(parsed.record.terms, terms);
    }

    #[test]
    fn test_text_renderer() {
        let (terms, input) = sample();
        let sheet = produce_document(&terms, &input, &test_time()).unwrap();
        let rendered = TextRenderer.render(&sheet).unwrap();
        let body = &rendered.body;

        assert!(body.starts_with("LOAN TERM SHEET\n"));
        assert!(body.contains("Prepared: 2024-03-15"));
        assert!(body.contains("Transaction:  Purchase"));
        assert!(body.contains("$255,000"));
        assert!(body.contains("6.50%"));
        assert!(body.contains("$1,612"));
        assert!(body.contains("Approval status: Approved"));
        assert!(body.contains("Note: loan exceeds total project cost by $5,000"));
    }
}
