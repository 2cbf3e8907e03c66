//! Document lines
//!
//! Invariant: `subtotal = quantity * unit_price`. The subtotal is fixed at
//! construction and whenever quantity or price change through [`DocumentLine::reprice`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{AnalyticalAccountId, BudgetId, Money, ProductId};

/// A product line on a transaction document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLine {
    /// Line identifier
    pub id: Uuid,
    /// Product sold or purchased
    pub product_id: ProductId,
    /// Quantity
    pub quantity: Decimal,
    /// Price per unit
    pub unit_price: Money,
    /// quantity * unit_price
    pub subtotal: Money,
    /// Analytical assignment, explicit or rule-derived
    pub analytical_account_id: Option<AnalyticalAccountId>,
    /// Budget tagged by the winning rule, if any
    pub budget_id: Option<BudgetId>,
}

impl DocumentLine {
    /// Creates a new untagged line
    pub fn new(product_id: ProductId, quantity: Decimal, unit_price: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            quantity,
            unit_price,
            subtotal: unit_price.multiply(quantity),
            analytical_account_id: None,
            budget_id: None,
        }
    }

    /// Sets the analytical assignment
    pub fn with_analytical_tag(
        mut self,
        account_id: AnalyticalAccountId,
        budget_id: Option<BudgetId>,
    ) -> Self {
        self.analytical_account_id = Some(account_id);
        self.budget_id = budget_id;
        self
    }

    /// Replaces the analytical assignment (used on party re-scan)
    pub fn retag(
        &mut self,
        account_id: Option<AnalyticalAccountId>,
        budget_id: Option<BudgetId>,
    ) {
        self.analytical_account_id = account_id;
        self.budget_id = budget_id;
    }

    /// Updates quantity and unit price, recomputing the subtotal
    pub fn reprice(&mut self, quantity: Decimal, unit_price: Money) {
        self.quantity = quantity;
        self.unit_price = unit_price;
        self.subtotal = unit_price.multiply(quantity);
    }
}
