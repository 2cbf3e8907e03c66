//! Test data builders
//!
//! Builders construct fully formed domain objects with defaults, letting a
//! test override only what it asserts on.

use rust_decimal::Decimal;

use core_kernel::{AnalyticalAccountId, Currency, Money, PartyId, ProductId};
use domain_budget::{Budget, BudgetType};
use domain_documents::{CustomerInvoice, DocumentLine, PurchaseOrder};
use domain_party::{Contact, ContactType};

use crate::fixtures::{MoneyFixtures, TemporalFixtures};

/// Builder for contacts
pub struct ContactBuilder {
    name: String,
    contact_type: ContactType,
    email: Option<String>,
}

impl ContactBuilder {
    pub fn customer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact_type: ContactType::Customer,
            email: None,
        }
    }

    pub fn vendor(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact_type: ContactType::Vendor,
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn build(self) -> Contact {
        let mut contact = Contact::new(self.name, self.contact_type);
        contact.email = self.email;
        contact
    }
}

/// Builder for budgets
pub struct BudgetBuilder {
    name: String,
    account_id: AnalyticalAccountId,
    budget_type: BudgetType,
    amount: Money,
    confirmed: bool,
}

impl BudgetBuilder {
    pub fn expense(account_id: AnalyticalAccountId, amount: i64) -> Self {
        Self {
            name: "Expense budget".to_string(),
            account_id,
            budget_type: BudgetType::Expense,
            amount: MoneyFixtures::inr(amount),
            confirmed: false,
        }
    }

    pub fn income(account_id: AnalyticalAccountId, amount: i64) -> Self {
        Self {
            name: "Income budget".to_string(),
            account_id,
            budget_type: BudgetType::Income,
            amount: MoneyFixtures::inr(amount),
            confirmed: false,
        }
    }

    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }

    pub fn build(self) -> Budget {
        let mut budget = Budget::new(
            self.name,
            TemporalFixtures::fiscal_2026(),
            self.account_id,
            self.budget_type,
            self.amount,
        )
        .expect("valid builder budget");

        if self.confirmed {
            budget.confirm().expect("fresh budget confirms");
        }
        budget.take_events();
        budget
    }
}

fn line(unit_price: i64, quantity: i64, account: Option<AnalyticalAccountId>) -> DocumentLine {
    let line = DocumentLine::new(
        ProductId::new_v7(),
        Decimal::from(quantity),
        MoneyFixtures::inr(unit_price),
    );
    match account {
        Some(account) => line.with_analytical_tag(account, None),
        None => line,
    }
}

/// Builder for purchase orders
pub struct PurchaseOrderBuilder {
    vendor_id: PartyId,
    lines: Vec<DocumentLine>,
}

impl PurchaseOrderBuilder {
    pub fn new(vendor_id: PartyId) -> Self {
        Self {
            vendor_id,
            lines: Vec::new(),
        }
    }

    pub fn with_tagged_line(
        mut self,
        unit_price: i64,
        quantity: i64,
        account: AnalyticalAccountId,
    ) -> Self {
        self.lines.push(line(unit_price, quantity, Some(account)));
        self
    }

    pub fn build(self) -> PurchaseOrder {
        let mut order =
            PurchaseOrder::new(self.vendor_id, TemporalFixtures::mid_year(), Currency::INR);
        for l in self.lines {
            order.add_line(l).expect("builder line matches currency");
        }
        order
    }
}

/// Builder for customer invoices
pub struct InvoiceBuilder {
    customer_id: PartyId,
    lines: Vec<DocumentLine>,
    posted: bool,
}

impl InvoiceBuilder {
    pub fn new(customer_id: PartyId) -> Self {
        Self {
            customer_id,
            lines: Vec::new(),
            posted: false,
        }
    }

    pub fn with_line(mut self, unit_price: i64, quantity: i64) -> Self {
        self.lines.push(line(unit_price, quantity, None));
        self
    }

    pub fn with_tagged_line(
        mut self,
        unit_price: i64,
        quantity: i64,
        account: AnalyticalAccountId,
    ) -> Self {
        self.lines.push(line(unit_price, quantity, Some(account)));
        self
    }

    /// Builds the invoice already in posted (payable) status
    pub fn posted(mut self) -> Self {
        self.posted = true;
        self
    }

    pub fn build(self) -> CustomerInvoice {
        let mut invoice =
            CustomerInvoice::new(self.customer_id, TemporalFixtures::mid_year(), Currency::INR);
        for l in self.lines {
            invoice.add_line(l).expect("builder line matches currency");
        }
        if self.posted {
            invoice.post().expect("draft invoice posts");
        }
        invoice.take_events();
        invoice
    }
}
