//! Sales order aggregate

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AnalyticalAccountId, Currency, Money, PartyId, SalesOrderId};

use crate::error::DocumentError;
use crate::events::DocumentEvent;
use crate::line::DocumentLine;
use crate::numbering;
use crate::status::DocumentStatus;

/// An order received from a customer
///
/// A sales order and its draft invoice are created as one logical unit:
/// the aggregate emits [`DocumentEvent::SalesOrderCreated`] when sealed for
/// persistence, and the lifecycle service creates the matching invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesOrder {
    /// Unique identifier
    pub id: SalesOrderId,
    /// Human-readable order number
    pub order_number: String,
    /// Ordering customer
    pub customer_id: PartyId,
    /// Order date
    pub order_date: NaiveDate,
    /// Document currency
    pub currency: Currency,
    /// Sum of line subtotals
    pub total_amount: Money,
    /// Lifecycle status
    pub status: DocumentStatus,
    /// Header-level analytical default
    pub analytical_account_id: Option<AnalyticalAccountId>,
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

impl SalesOrder {
    /// Creates a new draft order with no lines
    pub fn new(customer_id: PartyId, order_date: NaiveDate, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: SalesOrderId::new_v7(),
            order_number: numbering::sales_order_number(),
            customer_id,
            order_date,
            currency,
            total_amount: Money::zero(currency),
            status: DocumentStatus::Draft,
            analytical_account_id: None,
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

    /// Marks the order ready for persistence, emitting the creation event
    ///
    /// Called once by the lifecycle service after all lines are in place.
    pub fn seal_creation(&mut self) {
        self.events.push(DocumentEvent::SalesOrderCreated {
            order_id: self.id,
            customer_id: self.customer_id,
            total_amount: self.total_amount.amount(),
            timestamp: Utc::now(),
        });
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

    /// Replaces every line's analytical assignment (party re-scan)
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

    /// Changes the customer; only allowed while in draft
    pub fn change_customer(&mut self, customer_id: PartyId) -> Result<(), DocumentError> {
        if !self.status.is_editable() {
            return Err(DocumentError::NotEditable(self.status.as_str()));
        }
        self.customer_id = customer_id;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Confirms the order
    pub fn confirm(&mut self) -> Result<(), DocumentError> {
        match self.status {
            DocumentStatus::Draft => {
                let now = Utc::now();
                self.status = DocumentStatus::Confirmed;
                self.updated_at = now;
                self.events.push(DocumentEvent::SalesOrderConfirmed {
                    order_id: self.id,
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

    #[test]
    fn test_seal_creation_emits_event() {
        let mut order = SalesOrder::new(
            PartyId::new(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            Currency::INR,
        );
        order
            .add_line(DocumentLine::new(
                ProductId::new(),
                dec!(1),
                Money::new(dec!(45000), Currency::INR),
            ))
            .unwrap();
        order.seal_creation();

        let events = order.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "SalesOrderCreated");
        assert!(order.order_number.starts_with("SO-"));
    }

    #[test]
    fn test_confirm_flow() {
        let mut order = SalesOrder::new(
            PartyId::new(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            Currency::INR,
        );
        order.confirm().unwrap();
        assert_eq!(order.status, DocumentStatus::Confirmed);
        assert!(order.confirm().is_err());

        order.archive();
        assert!(order.is_archived);
    }
}
