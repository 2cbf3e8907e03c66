//! Payment records
//!
//! Payments are append-only ledger entries. Document paid amounts are always
//! recomputed as the sum of completed payments, so a failed or reversed
//! payment simply stops counting.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{InvoiceId, Money, PaymentId, VendorBillId};

use crate::error::DocumentError;
use crate::numbering;

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    BankTransfer,
    Cash,
    Check,
    Online,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::BankTransfer => "bank_transfer",
            PaymentMode::Cash => "cash",
            PaymentMode::Check => "check",
            PaymentMode::Online => "online",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank_transfer" => Ok(PaymentMode::BankTransfer),
            "cash" => Ok(PaymentMode::Cash),
            "check" => Ok(PaymentMode::Check),
            "online" => Ok(PaymentMode::Online),
            other => Err(DocumentError::UnknownMode(other.to_string())),
        }
    }
}

/// Payment record status
///
/// Only `Completed` payments count toward a document's paid amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
    Failed,
    Reversed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Reversed => "reversed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "reversed" => Ok(PaymentStatus::Reversed),
            other => Err(DocumentError::UnknownStatus(other.to_string())),
        }
    }
}

/// An outbound payment against a vendor bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillPayment {
    /// Unique identifier
    pub id: PaymentId,
    /// Human-readable payment number
    pub payment_number: String,
    /// The bill being paid
    pub bill_id: VendorBillId,
    /// Payment date
    pub payment_date: NaiveDate,
    /// Paid amount
    pub amount: Money,
    /// Payment mode
    pub mode: PaymentMode,
    /// Record status
    pub status: PaymentStatus,
    /// External reference (bank ref, source order number)
    pub reference: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl BillPayment {
    /// Creates a completed payment dated today
    pub fn completed(bill_id: VendorBillId, amount: Money, mode: PaymentMode) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new_v7(),
            payment_number: numbering::bill_payment_number(),
            bill_id,
            payment_date: now.date_naive(),
            amount,
            mode,
            status: PaymentStatus::Completed,
            reference: None,
            notes: None,
            created_at: now,
        }
    }

    /// Sets the external reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Sets the notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// An inbound payment against a customer invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicePayment {
    /// Unique identifier
    pub id: PaymentId,
    /// Human-readable payment number
    pub payment_number: String,
    /// The invoice being paid
    pub invoice_id: InvoiceId,
    /// Payment date
    pub payment_date: NaiveDate,
    /// Paid amount
    pub amount: Money,
    /// Payment mode
    pub mode: PaymentMode,
    /// Record status
    pub status: PaymentStatus,
    /// External reference (gateway payment id for online payments)
    pub reference: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl InvoicePayment {
    /// Creates a completed receipt dated today
    pub fn completed(invoice_id: InvoiceId, amount: Money, mode: PaymentMode) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new_v7(),
            payment_number: numbering::receipt_number(),
            invoice_id,
            payment_date: now.date_naive(),
            amount,
            mode,
            status: PaymentStatus::Completed,
            reference: None,
            notes: None,
            created_at: now,
        }
    }

    /// Creates a completed gateway payment
    ///
    /// Carries the gateway payment id as the reference and the gateway order
    /// id in the notes, with an `RZP-` payment number.
    pub fn from_gateway(
        invoice_id: InvoiceId,
        amount: Money,
        gateway_payment_id: impl Into<String>,
        gateway_order_id: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new_v7(),
            payment_number: numbering::gateway_payment_number(),
            invoice_id,
            payment_date: now.date_naive(),
            amount,
            mode: PaymentMode::Online,
            status: PaymentStatus::Completed,
            reference: Some(gateway_payment_id.into()),
            notes: Some(format!("Gateway order: {}", gateway_order_id)),
            created_at: now,
        }
    }
}
