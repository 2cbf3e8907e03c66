//! Customer invoice aggregate

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AnalyticalAccountId, Currency, InvoiceId, Money, PartyId, SalesOrderId};

use crate::error::DocumentError;
use crate::events::DocumentEvent;
use crate::line::DocumentLine;
use crate::numbering;
use crate::sales_order::SalesOrder;
use crate::status::DocumentStatus;

/// Payment terms applied to auto-created invoices
const DEFAULT_DUE_DAYS: i64 = 30;

/// An invoice issued to a customer
///
/// Unlike vendor bills, posting an invoice does not move income budgets:
/// income is recognized when the customer actually pays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInvoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Human-readable invoice number
    pub invoice_number: String,
    /// Invoiced customer
    pub customer_id: PartyId,
    /// Source sales order for auto-created invoices
    pub sales_order_id: Option<SalesOrderId>,
    /// Invoice date; accrual windows filter on this
    pub invoice_date: NaiveDate,
    /// Payment due date
    pub due_date: NaiveDate,
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
    /// Invoice lines
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

impl CustomerInvoice {
    /// Creates a new draft invoice with no lines
    pub fn new(customer_id: PartyId, invoice_date: NaiveDate, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new_v7(),
            invoice_number: numbering::invoice_number(),
            customer_id,
            sales_order_id: None,
            invoice_date,
            due_date: invoice_date + Duration::days(DEFAULT_DUE_DAYS),
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

    /// Builds the draft invoice paired with a new sales order
    ///
    /// Same customer, same lines (tags included), same total.
    pub fn draft_from_order(order: &SalesOrder) -> Self {
        let now = Utc::now();
        let invoice_date = now.date_naive();

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
            id: InvoiceId::new_v7(),
            invoice_number: numbering::invoice_number(),
            customer_id: order.customer_id,
            sales_order_id: Some(order.id),
            invoice_date,
            due_date: invoice_date + Duration::days(DEFAULT_DUE_DAYS),
            currency: order.currency,
            total_amount: order.total_amount,
            paid_amount: Money::zero(order.currency),
            status: DocumentStatus::Draft,
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

    /// Posts the invoice
    ///
    /// Income budgets are not refreshed here; they move when payment lands.
    pub fn post(&mut self) -> Result<(), DocumentError> {
        match self.status {
            DocumentStatus::Draft => {
                let now = Utc::now();
                self.status = DocumentStatus::Posted;
                self.updated_at = now;
                self.events.push(DocumentEvent::InvoicePosted {
                    invoice_id: self.id,
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

    /// Cancels the invoice; accrual drops it on the next refresh
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
        self.events.push(DocumentEvent::InvoiceCancelled {
            invoice_id: self.id,
            accounts: self.distinct_analytical_accounts().into_iter().collect(),
            timestamp: now,
        });
        Ok(())
    }

    /// Applies a cumulative paid total and derives the payment status
    ///
    /// The caller passes the sum of all completed payments for the invoice,
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
        self.events.push(DocumentEvent::InvoicePaymentApplied {
            invoice_id: self.id,
            paid_amount: paid.amount(),
            status: self.status,
            timestamp: now,
        });
        Ok(())
    }

    /// Archives the invoice
    pub fn archive(&mut self) {
        self.is_archived = true;
        self.updated_at = Utc::now();
    }

    /// Whether the portal may take a payment against this invoice
    pub fn is_payable(&self) -> bool {
        matches!(
            self.status,
            DocumentStatus::Posted | DocumentStatus::PartiallyPaid
        )
    }

    /// Remaining amount owed by the customer
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

    fn posted_invoice(total: i64) -> CustomerInvoice {
        let mut invoice = CustomerInvoice::new(
            PartyId::new(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            Currency::INR,
        );
        invoice
            .add_line(DocumentLine::new(ProductId::new(), dec!(1), inr(total)))
            .unwrap();
        invoice.post().unwrap();
        invoice
    }

    #[test]
    fn test_draft_from_order_copies_everything() {
        let mut order = SalesOrder::new(
            PartyId::new(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            Currency::INR,
        );
        let account = AnalyticalAccountId::new();
        order
            .add_line(
                DocumentLine::new(ProductId::new(), dec!(2), inr(35_000))
                    .with_analytical_tag(account, None),
            )
            .unwrap();

        let invoice = CustomerInvoice::draft_from_order(&order);

        assert_eq!(invoice.status, DocumentStatus::Draft);
        assert_eq!(invoice.customer_id, order.customer_id);
        assert_eq!(invoice.sales_order_id, Some(order.id));
        assert_eq!(invoice.total_amount, order.total_amount);
        assert_eq!(invoice.paid_amount, inr(0));
        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.lines[0].analytical_account_id, Some(account));
    }

    #[test]
    fn test_payability() {
        let mut invoice = CustomerInvoice::new(
            PartyId::new(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            Currency::INR,
        );
        assert!(!invoice.is_payable());

        invoice
            .add_line(DocumentLine::new(ProductId::new(), dec!(1), inr(118_000)))
            .unwrap();
        invoice.post().unwrap();
        assert!(invoice.is_payable());

        invoice.apply_payment_total(inr(50_000)).unwrap();
        assert!(invoice.is_payable());

        invoice.apply_payment_total(inr(118_000)).unwrap();
        assert!(!invoice.is_payable());
    }

    #[test]
    fn test_partial_then_full_payment() {
        let mut invoice = posted_invoice(118_000);

        invoice.apply_payment_total(inr(50_000)).unwrap();
        assert_eq!(invoice.status, DocumentStatus::PartiallyPaid);
        assert_eq!(invoice.balance_due(), inr(68_000));

        invoice.apply_payment_total(inr(118_000)).unwrap();
        assert_eq!(invoice.status, DocumentStatus::Paid);
        assert_eq!(invoice.balance_due(), inr(0));
    }

    #[test]
    fn test_cancel_posted_invoice() {
        let mut invoice = posted_invoice(10_000);
        invoice.cancel().unwrap();
        assert_eq!(invoice.status, DocumentStatus::Cancelled);

        invoice.archive();
        assert!(invoice.is_archived);
    }
}
