use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Money;

/// How a spend record entered the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpenseSource {
    /// Typed in by the user.
    Manual,
    /// Extracted by the external receipt-scanning service.
    Receipt,
}

impl std::fmt::Display for ExpenseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpenseSource::Manual => write!(f, "Manual"),
            ExpenseSource::Receipt => write!(f, "Receipt"),
        }
    }
}

/// One recorded spend against a category. The expense log is append-only —
/// it is the audit trail that forces categories with history to be archived
/// rather than removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Unique identifier
    pub id: Uuid,

    /// Category the spend was resolved to
    pub category_id: Uuid,

    /// Amount spent (always positive)
    pub amount: Money,

    /// Vendor name, when known (receipts carry one, manual entries may not)
    #[serde(default)]
    pub vendor: Option<String>,

    /// Date of the spend (no time component — daily granularity)
    pub date: NaiveDate,

    /// Where this record came from
    pub source: ExpenseSource,
}

impl ExpenseRecord {
    /// A manually entered expense.
    pub fn manual(category_id: Uuid, amount: Money, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            amount,
            vendor: None,
            date,
            source: ExpenseSource::Manual,
        }
    }

    /// An expense built from a scanned receipt, after the category has been
    /// resolved by the user or a suggestion service.
    pub fn from_receipt(category_id: Uuid, capture: &ReceiptCapture) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            amount: capture.amount,
            vendor: Some(capture.vendor_name.clone()),
            date: capture.date,
            source: ExpenseSource::Receipt,
        }
    }
}

/// Structured output of the external receipt/OCR service. The engine never
/// parses receipts — this arrives ready-made, and the engine's only
/// touchpoint is recording the spend once a category is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptCapture {
    pub vendor_name: String,
    pub amount: Money,
    pub date: NaiveDate,
    /// Suggested category, if the extraction service proposed one. The
    /// caller resolves the final category before recording.
    #[serde(default)]
    pub category_id: Option<Uuid>,
}
