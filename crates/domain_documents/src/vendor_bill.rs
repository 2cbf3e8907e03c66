//! Vendor bill aggregate

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AnalyticalAccountId, Currency, Money, PartyId, PurchaseOrderId, VendorBillId};

use crate::error::DocumentError;
use crate::events::DocumentEvent;
use crate::line::DocumentLine;
use crate::numbering;
use crate::purchase_order::PurchaseOrder;
use crate::status::DocumentStatus;

/// Payment terms applied to auto-created bills
const DEFAULT_DUE_DAYS: i64 = 30;

/// A bill received from a vendor
///
/// Bills feed expense budget accrual from the moment they are posted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorBill {
    /// Unique identifier
    pub id: VendorBillId,
    /// Human-readable bill number
    pub bill_number: String,
    /// Vendor who issued the bill
    pub vendor_id: PartyId,
    /// Source purchase order for auto-created bills
    pub purchase_order_id: Option<PurchaseOrderId>,
    /// Bill date; accrual windows filter on this
    pub bill_date: NaiveDate,
    /// Payment due date
    pub due_date: Option<NaiveDate>,
    /// Document currency
    pub currency: Currency,
    /// Sum of line subtotals
    pub total_amount: Money,
    /// Cumulative completed payments
    pub paid_amount: Money,
    /// Lifecycle status
    pub status: DocumentStatus,
    /// Header-level analytical default
    pub analytical_account_id: Option<AnalyticalAccountId>,
    /// Bill lines
    pub lines: Vec<DocumentLine>,
    /// Soft-delete flag
    pub is_archived: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Domain events to be published
    #[serde(skip)]
    events: Vec<DocumentEvent>,
}

impl VendorBill {
    /// Creates a new draft bill with no lines
    pub fn new(vendor_id: PartyId, bill_date: NaiveDate, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: VendorBillId::new_v7(),
            bill_number: numbering::bill_number(),
            vendor_id,
            purchase_order_id: None,
            bill_date,
            due_date: None,
            currency,
            total_amount: Money::zero(currency),
            paid_amount: Money::zero(currency),
            status: DocumentStatus::Draft,
            analytical_account_id: None,
            lines: Vec::new(),
            is_archived: false,
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        }
    }

    /// Builds the settled bill for a confirmed purchase order
    ///
    /// The full auto-pay model: the bill starts life in `Paid` status with
    /// `paid_amount = total_amount`, its lines copied from the order (tags
    /// included) and a 30-day due date for the record.
    pub fn settled_from_order(order: &PurchaseOrder) -> Self {
        let now = Utc::now();
        let bill_date = now.date_naive();

        let lines = order
            .lines
            .iter()
            .map(|line| {
                let mut copy =
                    DocumentLine::new(line.product_id, line.quantity, line.unit_price);
                copy.retag(line.analytical_account_id, line.budget_id);
                copy
            })
            .collect();

        Self {
            id: VendorBillId::new_v7(),
            bill_number: numbering::bill_number(),
            vendor_id: order.vendor_id,
            purchase_order_id: Some(order.id),
            bill_date,
            due_date: Some(bill_date + Duration::days(DEFAULT_DUE_DAYS)),
            currency: order.currency,
            total_amount: order.total_amount,
            paid_amount: order.total_amount,
            status: DocumentStatus::Paid,
            analytical_account_id: order.analytical_account_id,
            lines,
            is_archived: false,
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        }
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.events)
    }

    /// Adds a line, keeping the header total in sync
    pub fn add_line(&mut self, line: DocumentLine) -> Result<(), DocumentError> {
        if !self.status.is_editable() {
            return Err(DocumentError::NotEditable(self.status.as_str()));
        }
        if line.unit_price.currency() != self.currency {
            return Err(DocumentError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: line.unit_price.currency().to_string(),
            });
        }

        self.lines.push(line);
        self.recalculate_total();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Posts the bill, bringing it into expense accrual
    pub fn post(&mut self) -> Result<(), DocumentError> {
        match self.status {
            DocumentStatus::Draft => {
                let now = Utc::now();
                self.status = DocumentStatus::Posted;
                self.updated_at = now;
                self.events.push(DocumentEvent::VendorBillPosted {
                    bill_id: self.id,
                    accounts: self.distinct_analytical_accounts().into_iter().collect(),
                    timestamp: now,
                });
                Ok(())
            }
            from => Err(DocumentError::InvalidStatusTransition {
                from: from.as_str(),
                to: "posted",
            }),
        }
    }

    /// Cancels the bill; accrual drops it on the next refresh
    pub fn cancel(&mut self) -> Result<(), DocumentError> {
        if self.status.is_terminal() {
            return Err(DocumentError::InvalidStatusTransition {
                from: self.status.as_str(),
                to: "cancelled",
            });
        }
        let now = Utc::now();
        self.status = DocumentStatus::Cancelled;
        self.updated_at = now;
        self.events.push(DocumentEvent::VendorBillCancelled {
            bill_id: self.id,
            accounts: self.distinct_analytical_accounts().into_iter().collect(),
            timestamp: now,
        });
        Ok(())
    }

    /// Applies a cumulative paid total and derives the payment status
    ///
    /// The caller passes the sum of all completed payments for the bill,
    /// never a delta.
    pub fn apply_payment_total(&mut self, paid: Money) -> Result<(), DocumentError> {
        if paid.currency() != self.currency {
            return Err(DocumentError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: paid.currency().to_string(),
            });
        }

        let now = Utc::now();
        self.paid_amount = paid;
        self.status = DocumentStatus::from_payment(self.total_amount, paid);
        self.updated_at = now;
        self.events.push(DocumentEvent::VendorBillPaymentApplied {
            bill_id: self.id,
            paid_amount: paid.amount(),
            status: self.status,
            timestamp: now,
        });
        Ok(())
    }

    /// Archives the bill
    pub fn archive(&mut self) {
        self.is_archived = true;
        self.updated_at = Utc::now();
    }

    /// Remaining amount owed to the vendor
    pub fn balance_due(&self) -> Money {
        self.total_amount - self.paid_amount
    }

    /// Distinct analytical accounts across the lines
    pub fn distinct_analytical_accounts(&self) -> HashSet<AnalyticalAccountId> {
        self.lines
            .iter()
            .filter_map(|l| l.analytical_account_id)
            .collect()
    }

    fn recalculate_total(&mut self) {
        self.total_amount = self
            .lines
            .iter()
            .fold(Money::zero(self.currency), |acc, line| acc + line.subtotal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::ProductId;
    use rust_decimal_macros::dec;

    fn inr(amount: i64) -> Money {
        Money::new(rust_decimal::Decimal::from(amount), Currency::INR)
    }

    fn draft_bill() -> VendorBill {
        let mut bill = VendorBill::new(
            PartyId::new(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            Currency::INR,
        );
        bill.add_line(
            DocumentLine::new(ProductId::new(), dec!(2), inr(28_000))
                .with_analytical_tag(AnalyticalAccountId::new(), None),
        )
        .unwrap();
        bill
    }

    #[test]
    fn test_post_emits_accounts() {
        let mut bill = draft_bill();
        bill.post().unwrap();

        assert_eq!(bill.status, DocumentStatus::Posted);
        let events = bill.take_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            DocumentEvent::VendorBillPosted { accounts, .. } => assert_eq!(accounts.len(), 1),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_settled_from_order_mirrors_lines() {
        let mut order = PurchaseOrder::new(
            PartyId::new(),
            NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            Currency::INR,
        );
        let account = AnalyticalAccountId::new();
        order
            .add_line(
                DocumentLine::new(ProductId::new(), dec!(3), inr(11_000))
                    .with_analytical_tag(account, None),
            )
            .unwrap();
        order.confirm().unwrap();

        let bill = VendorBill::settled_from_order(&order);

        assert_eq!(bill.status, DocumentStatus::Paid);
        assert_eq!(bill.total_amount, order.total_amount);
        assert_eq!(bill.paid_amount, order.total_amount);
        assert_eq!(bill.purchase_order_id, Some(order.id));
        assert_eq!(bill.lines.len(), 1);
        assert_eq!(bill.lines[0].analytical_account_id, Some(account));
        assert_eq!(bill.balance_due(), inr(0));
        assert!(bill.due_date.is_some());
    }

    #[test]
    fn test_payment_status_progression() {
        let mut bill = draft_bill();
        bill.post().unwrap();

        bill.apply_payment_total(inr(20_000)).unwrap();
        assert_eq!(bill.status, DocumentStatus::PartiallyPaid);

        bill.apply_payment_total(inr(56_000)).unwrap();
        assert_eq!(bill.status, DocumentStatus::Paid);
        assert_eq!(bill.balance_due(), inr(0));
    }

    #[test]
    fn test_cancel_paid_bill_rejected() {
        let mut bill = draft_bill();
        bill.post().unwrap();
        bill.apply_payment_total(inr(56_000)).unwrap();

        assert!(matches!(
            bill.cancel(),
            Err(DocumentError::InvalidStatusTransition { .. })
        ));

        // Terminal bills can still be archived out of the working set.
        bill.archive();
        assert!(bill.is_archived);
    }
}
