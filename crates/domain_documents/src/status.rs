//! Document lifecycle statuses

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::Money;

use crate::error::DocumentError;

/// Lifecycle status shared by all transaction documents
///
/// Orders move `Draft -> Confirmed`; bills and invoices move
/// `Draft -> Posted` and onward through the payment states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Confirmed,
    Posted,
    PartiallyPaid,
    Paid,
    Cancelled,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Confirmed => "confirmed",
            DocumentStatus::Posted => "posted",
            DocumentStatus::PartiallyPaid => "partially_paid",
            DocumentStatus::Paid => "paid",
            DocumentStatus::Cancelled => "cancelled",
        }
    }

    /// Header and lines may only change in draft
    pub fn is_editable(&self) -> bool {
        matches!(self, DocumentStatus::Draft)
    }

    /// Terminal states for the normal flow
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Paid | DocumentStatus::Cancelled)
    }

    /// Whether documents in this status count toward budget accrual
    pub fn accrues(&self) -> bool {
        matches!(
            self,
            DocumentStatus::Posted | DocumentStatus::PartiallyPaid | DocumentStatus::Paid
        )
    }

    /// Derives the payment status from a cumulative paid amount
    ///
    /// Callers pass the total of all completed payments, not a delta:
    /// `paid >= total` is fully paid, any positive amount is partial, and a
    /// zero ledger leaves the document at `Posted`.
    pub fn from_payment(total_amount: Money, paid_amount: Money) -> DocumentStatus {
        if paid_amount.amount() >= total_amount.amount() && !total_amount.is_zero() {
            DocumentStatus::Paid
        } else if paid_amount.is_positive() {
            DocumentStatus::PartiallyPaid
        } else {
            DocumentStatus::Posted
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(DocumentStatus::Draft),
            "confirmed" => Ok(DocumentStatus::Confirmed),
            "posted" => Ok(DocumentStatus::Posted),
            "partially_paid" => Ok(DocumentStatus::PartiallyPaid),
            "paid" => Ok(DocumentStatus::Paid),
            "cancelled" => Ok(DocumentStatus::Cancelled),
            other => Err(DocumentError::UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal::Decimal;

    fn inr(amount: i64) -> Money {
        Money::new(Decimal::from(amount), Currency::INR)
    }

    #[test]
    fn test_accruing_statuses() {
        assert!(DocumentStatus::Posted.accrues());
        assert!(DocumentStatus::PartiallyPaid.accrues());
        assert!(DocumentStatus::Paid.accrues());
        assert!(!DocumentStatus::Draft.accrues());
        assert!(!DocumentStatus::Confirmed.accrues());
        assert!(!DocumentStatus::Cancelled.accrues());
    }

    #[test]
    fn test_payment_status_derivation() {
        let total = inr(118_000);

        assert_eq!(
            DocumentStatus::from_payment(total, inr(0)),
            DocumentStatus::Posted
        );
        assert_eq!(
            DocumentStatus::from_payment(total, inr(50_000)),
            DocumentStatus::PartiallyPaid
        );
        assert_eq!(
            DocumentStatus::from_payment(total, inr(118_000)),
            DocumentStatus::Paid
        );
        // Overpayment still reads as paid.
        assert_eq!(
            DocumentStatus::from_payment(total, inr(120_000)),
            DocumentStatus::Paid
        );
    }

    #[test]
    fn test_round_trip() {
        for status in [
            DocumentStatus::Draft,
            DocumentStatus::Confirmed,
            DocumentStatus::Posted,
            DocumentStatus::PartiallyPaid,
            DocumentStatus::Paid,
            DocumentStatus::Cancelled,
        ] {
            let parsed: DocumentStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }
}
