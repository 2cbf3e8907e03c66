//! Purchase order aggregate

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AnalyticalAccountId, Currency, Money, PartyId, PurchaseOrderId};

use crate::error::DocumentError;
use crate::events::DocumentEvent;
use crate::line::DocumentLine;
use crate::numbering;
use crate::status::DocumentStatus;

/// An order placed with a vendor
///
/// Confirming an order settles it in one step: the lifecycle service reacts
/// to [`DocumentEvent::PurchaseOrderConfirmed`] by creating a fully paid
/// vendor bill and its payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// Unique identifier
    pub id: PurchaseOrderId,
    /// Human-readable order number
    pub order_number: String,
    /// Vendor being ordered from
    pub vendor_id: PartyId,
    /// Order date
    pub order_date: NaiveDate,
    /// Expected delivery date
    pub expected_delivery_date: Option<NaiveDate>,
    /// Document currency
    pub currency: Currency,
    /// Sum of line subtotals
    pub total_amount: Money,
    /// Lifecycle status
    pub status: DocumentStatus,
    /// Header-level analytical default
    pub analytical_account_id: Option<AnalyticalAccountId>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Order lines
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

impl PurchaseOrder {
    /// Creates a new draft order with no lines
    pub fn new(vendor_id: PartyId, order_date: NaiveDate, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: PurchaseOrderId::new_v7(),
            order_number: numbering::purchase_order_number(),
            vendor_id,
            order_date,
            expected_delivery_date: None,
            currency,
            total_amount: Money::zero(currency),
            status: DocumentStatus::Draft,
            analytical_account_id: None,
            notes: None,
            lines: Vec::new(),
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
    ///
    /// # Errors
    ///
    /// Returns an error if the order is no longer a draft or the line
    /// currency differs from the document currency.
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

    /// Replaces every line's analytical assignment (party re-scan)
    ///
    /// # Errors
    ///
    /// Returns an error if the order is no longer a draft.
    pub fn replace_line_tags(
        &mut self,
        tags: Vec<(Option<AnalyticalAccountId>, Option<core_kernel::BudgetId>)>,
    ) -> Result<(), DocumentError> {
        if !self.status.is_editable() {
            return Err(DocumentError::NotEditable(self.status.as_str()));
        }
        for (line, (account, budget)) in self.lines.iter_mut().zip(tags) {
            line.retag(account, budget);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Changes the vendor; only allowed while in draft
    pub fn change_vendor(&mut self, vendor_id: PartyId) -> Result<(), DocumentError> {
        if !self.status.is_editable() {
            return Err(DocumentError::NotEditable(self.status.as_str()));
        }
        self.vendor_id = vendor_id;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Confirms the order
    ///
    /// # Errors
    ///
    /// Returns an error unless the order is in `Draft`.
    pub fn confirm(&mut self) -> Result<(), DocumentError> {
        match self.status {
            DocumentStatus::Draft => {
                let now = Utc::now();
                self.status = DocumentStatus::Confirmed;
                self.updated_at = now;
                self.events.push(DocumentEvent::PurchaseOrderConfirmed {
                    order_id: self.id,
                    vendor_id: self.vendor_id,
                    total_amount: self.total_amount.amount(),
                    timestamp: now,
                });
                Ok(())
            }
            from => Err(DocumentError::InvalidStatusTransition {
                from: from.as_str(),
                to: "confirmed",
            }),
        }
    }

    /// Cancels the order from any non-terminal state
    pub fn cancel(&mut self) -> Result<(), DocumentError> {
        if self.status.is_terminal() {
            return Err(DocumentError::InvalidStatusTransition {
                from: self.status.as_str(),
                to: "cancelled",
            });
        }
        self.status = DocumentStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Archives the order
    pub fn archive(&mut self) {
        self.is_archived = true;
        self.updated_at = Utc::now();
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

    fn order_with_lines() -> PurchaseOrder {
        let mut order = PurchaseOrder::new(
            PartyId::new(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            Currency::INR,
        );
        order
            .add_line(DocumentLine::new(
                ProductId::new(),
                dec!(2),
                Money::new(dec!(28000), Currency::INR),
            ))
            .unwrap();
        order
            .add_line(DocumentLine::new(
                ProductId::new(),
                dec!(1),
                Money::new(dec!(17000), Currency::INR),
            ))
            .unwrap();
        order
    }

    #[test]
    fn test_total_tracks_lines() {
        let order = order_with_lines();
        assert_eq!(order.total_amount.amount(), dec!(73000));
        assert!(order.order_number.starts_with("PO-"));
    }

    #[test]
    fn test_confirm_emits_event() {
        let mut order = order_with_lines();
        order.confirm().unwrap();

        assert_eq!(order.status, DocumentStatus::Confirmed);
        let events = order.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "PurchaseOrderConfirmed");
    }

    #[test]
    fn test_confirm_twice_rejected() {
        let mut order = order_with_lines();
        order.confirm().unwrap();
        assert!(matches!(
            order.confirm(),
            Err(DocumentError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_lines_frozen_after_confirm() {
        let mut order = order_with_lines();
        order.confirm().unwrap();

        let result = order.add_line(DocumentLine::new(
            ProductId::new(),
            dec!(1),
            Money::new(dec!(100), Currency::INR),
        ));
        assert!(matches!(result, Err(DocumentError::NotEditable(_))));
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let mut order = PurchaseOrder::new(
            PartyId::new(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            Currency::INR,
        );
        let result = order.add_line(DocumentLine::new(
            ProductId::new(),
            dec!(1),
            Money::new(dec!(100), Currency::USD),
        ));
        assert!(matches!(
            result,
            Err(DocumentError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_cancel_from_confirmed() {
        let mut order = order_with_lines();
        order.confirm().unwrap();
        order.cancel().unwrap();
        assert_eq!(order.status, DocumentStatus::Cancelled);
        assert!(order.cancel().is_err());
    }

    #[test]
    fn test_archive_is_soft() {
        let mut order = order_with_lines();
        order.archive();
        assert!(order.is_archived);
        // Archival does not touch the lifecycle status.
        assert_eq!(order.status, DocumentStatus::Draft);
    }
}
