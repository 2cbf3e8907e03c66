//! Document lifecycle controller
//!
//! Consumes aggregate events and runs the cross-document side effects:
//! auto-billing on order confirmation, draft-invoice pairing on sales order
//! creation, and budget accrual refresh on every transition that changes
//! which lines qualify.
//!
//! # Failure semantics
//!
//! Each remote mutation commits independently. A failure mid-sequence (order
//! confirmed, bill insert failed) surfaces as an explicit partial-completion
//! error instead of a rollback, and the earlier commits stand. A failed
//! invoice-totals update after a successful payment insert is logged as a
//! reconciliation gap, never retried here.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use core_kernel::{
    AnalyticalAccountId, BudgetId, Currency, InvoiceId, Money, PartyId, ProductId,
    PurchaseOrderId, SalesOrderId, VendorBillId,
};
use domain_analytics::AutoAssigner;
use domain_budget::AccrualEngine;

use crate::customer_invoice::CustomerInvoice;
use crate::error::LifecycleError;
use crate::events::DocumentEvent;
use crate::line::DocumentLine;
use crate::payment::{BillPayment, InvoicePayment, PaymentMode};
use crate::ports::{
    BillPaymentPort, InvoicePaymentPort, InvoicePort, PurchaseOrderPort, SalesOrderPort,
    VendorBillPort,
};
use crate::purchase_order::PurchaseOrder;
use crate::sales_order::SalesOrder;
use crate::status::DocumentStatus;
use crate::vendor_bill::VendorBill;

/// Line input for document creation
#[derive(Debug, Clone)]
pub struct NewDocumentLine {
    pub product_id: ProductId,
    pub quantity: Decimal,
    pub unit_price: Money,
    /// Explicit assignment; when absent the auto-assigner decides
    pub analytical_account_id: Option<AnalyticalAccountId>,
    pub budget_id: Option<BudgetId>,
}

/// Input for creating a purchase order
#[derive(Debug, Clone)]
pub struct NewPurchaseOrder {
    pub vendor_id: PartyId,
    pub order_date: NaiveDate,
    pub expected_delivery_date: Option<NaiveDate>,
    pub currency: Currency,
    pub notes: Option<String>,
    pub lines: Vec<NewDocumentLine>,
}

/// Input for creating a sales order
#[derive(Debug, Clone)]
pub struct NewSalesOrder {
    pub customer_id: PartyId,
    pub order_date: NaiveDate,
    pub currency: Currency,
    pub lines: Vec<NewDocumentLine>,
}

/// Input for creating a vendor bill directly
#[derive(Debug, Clone)]
pub struct NewVendorBill {
    pub vendor_id: PartyId,
    pub bill_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub currency: Currency,
    pub lines: Vec<NewDocumentLine>,
}

/// Input for creating a customer invoice directly
#[derive(Debug, Clone)]
pub struct NewCustomerInvoice {
    pub customer_id: PartyId,
    pub invoice_date: NaiveDate,
    pub currency: Currency,
    pub lines: Vec<NewDocumentLine>,
}

/// Result of confirming a purchase order
#[derive(Debug, Clone)]
pub struct ConfirmedPurchaseOrder {
    pub order: PurchaseOrder,
    pub bill: VendorBill,
    pub payment: BillPayment,
}

/// Result of creating a sales order (order plus its paired invoice)
#[derive(Debug, Clone)]
pub struct SalesOrderWithInvoice {
    pub order: SalesOrder,
    pub invoice: CustomerInvoice,
}

/// Result of recording an invoice payment
#[derive(Debug, Clone)]
pub struct InvoicePaymentReceipt {
    pub payment_id: core_kernel::PaymentId,
    pub payment_number: String,
    pub payment_date: NaiveDate,
    pub paid_amount: Money,
    pub balance_due: Money,
    pub status: DocumentStatus,
    /// True when an identical gateway reference was already recorded and no
    /// new payment was created
    pub replayed: bool,
}

/// Orchestrates document transitions and their side effects
pub struct LifecycleService {
    orders: Arc<dyn PurchaseOrderPort>,
    sales_orders: Arc<dyn SalesOrderPort>,
    bills: Arc<dyn VendorBillPort>,
    invoices: Arc<dyn InvoicePort>,
    bill_payments: Arc<dyn BillPaymentPort>,
    invoice_payments: Arc<dyn InvoicePaymentPort>,
    assigner: Arc<AutoAssigner>,
    accrual: Arc<AccrualEngine>,
}

impl LifecycleService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        orders: Arc<dyn PurchaseOrderPort>,
        sales_orders: Arc<dyn SalesOrderPort>,
        bills: Arc<dyn VendorBillPort>,
        invoices: Arc<dyn InvoicePort>,
        bill_payments: Arc<dyn BillPaymentPort>,
        invoice_payments: Arc<dyn InvoicePaymentPort>,
        assigner: Arc<AutoAssigner>,
        accrual: Arc<AccrualEngine>,
    ) -> Self {
        Self {
            orders,
            sales_orders,
            bills,
            invoices,
            bill_payments,
            invoice_payments,
            assigner,
            accrual,
        }
    }

    // ========================================================================
    // Purchase orders
    // ========================================================================

    /// Creates a draft purchase order, auto-assigning untagged lines
    pub async fn create_purchase_order(
        &self,
        input: NewPurchaseOrder,
    ) -> Result<PurchaseOrder, LifecycleError> {
        let mut order =
            PurchaseOrder::new(input.vendor_id, input.order_date, input.currency);
        order.expected_delivery_date = input.expected_delivery_date;
        order.notes = input.notes;

        for line in self.build_lines(input.vendor_id, input.lines).await? {
            order.add_line(line)?;
        }

        self.orders.insert(order.clone()).await?;
        info!(order_id = %order.id, number = %order.order_number, "purchase order created");
        Ok(order)
    }

    /// Confirms a purchase order and settles it
    ///
    /// The `OrderConfirmed` event drives the full auto-pay model: one vendor
    /// bill in `Paid` status with the order's lines, one completed bill
    /// payment of the full amount, then a budget refresh for every distinct
    /// analytical account on the lines.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::AutoBillFailed`] means the order is confirmed but
    /// the bill was not created; the caller should surface a partial success.
    pub async fn confirm_purchase_order(
        &self,
        id: PurchaseOrderId,
    ) -> Result<ConfirmedPurchaseOrder, LifecycleError> {
        let mut order = self.orders.get(id).await?;
        order.confirm()?;
        self.orders.save(&order).await?;

        let mut settled = None;
        for event in order.take_events() {
            if let DocumentEvent::PurchaseOrderConfirmed { .. } = event {
                settled = Some(self.settle_confirmed_order(&order).await?);
            }
        }

        // confirm() always emits the event, so settlement must have run.
        let (bill, payment) = settled.ok_or_else(|| {
            LifecycleError::Port(core_kernel::PortError::storage(
                "order confirmation emitted no settlement event",
            ))
        })?;

        self.refresh_accounts(bill.distinct_analytical_accounts()).await;

        info!(
            order_id = %order.id,
            bill_id = %bill.id,
            amount = %bill.total_amount,
            "order confirmed and auto-settled"
        );

        Ok(ConfirmedPurchaseOrder {
            order,
            bill,
            payment,
        })
    }

    async fn settle_confirmed_order(
        &self,
        order: &PurchaseOrder,
    ) -> Result<(VendorBill, BillPayment), LifecycleError> {
        let bill = VendorBill::settled_from_order(order);
        let payment = BillPayment::completed(bill.id, bill.total_amount, PaymentMode::BankTransfer)
            .with_reference(format!("Auto-payment for {}", order.order_number))
            .with_notes("Automatic payment on order confirmation");

        self.bills
            .insert_settled(bill.clone(), payment.clone())
            .await
            .map_err(|source| {
                error!(order_id = %order.id, %source, "auto-bill creation failed");
                LifecycleError::AutoBillFailed {
                    order_id: order.id,
                    source,
                }
            })?;

        Ok((bill, payment))
    }

    /// Cancels a purchase order
    pub async fn cancel_purchase_order(
        &self,
        id: PurchaseOrderId,
    ) -> Result<PurchaseOrder, LifecycleError> {
        let mut order = self.orders.get(id).await?;
        order.cancel()?;
        self.orders.save(&order).await?;
        Ok(order)
    }

    /// Re-runs auto-assignment on every line after a vendor change
    ///
    /// A party change invalidates tag-based matches, so the whole document
    /// is re-scanned rather than patched incrementally.
    pub async fn change_purchase_order_vendor(
        &self,
        id: PurchaseOrderId,
        vendor_id: PartyId,
    ) -> Result<PurchaseOrder, LifecycleError> {
        let mut order = self.orders.get(id).await?;
        order.change_vendor(vendor_id)?;

        let mut tags = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let outcome = self
                .assigner
                .assign(Some(vendor_id), Some(line.product_id))
                .await?;
            tags.push(match outcome {
                Some(o) => (Some(o.analytical_account_id), o.budget_id),
                None => (None, None),
            });
        }
        order.replace_line_tags(tags)?;

        self.orders.save(&order).await?;
        Ok(order)
    }

    // ========================================================================
    // Sales orders
    // ========================================================================

    /// Creates a sales order together with its draft invoice
    ///
    /// # Errors
    ///
    /// [`LifecycleError::AutoInvoiceFailed`] means the order was saved but
    /// the invoice was not created; the caller should surface a partial
    /// success.
    pub async fn create_sales_order(
        &self,
        input: NewSalesOrder,
    ) -> Result<SalesOrderWithInvoice, LifecycleError> {
        let mut order = SalesOrder::new(input.customer_id, input.order_date, input.currency);

        for line in self.build_lines(input.customer_id, input.lines).await? {
            order.add_line(line)?;
        }
        order.seal_creation();

        self.sales_orders.insert(order.clone()).await?;

        let mut paired_invoice = None;
        for event in order.take_events() {
            if let DocumentEvent::SalesOrderCreated { .. } = event {
                let invoice = CustomerInvoice::draft_from_order(&order);
                self.invoices
                    .insert(invoice.clone())
                    .await
                    .map_err(|source| {
                        error!(order_id = %order.id, %source, "auto-invoice creation failed");
                        LifecycleError::AutoInvoiceFailed {
                            order_id: order.id,
                            source,
                        }
                    })?;
                paired_invoice = Some(invoice);
            }
        }

        let invoice = paired_invoice.ok_or_else(|| {
            LifecycleError::Port(core_kernel::PortError::storage(
                "sales order creation emitted no pairing event",
            ))
        })?;

        info!(
            order_id = %order.id,
            invoice_id = %invoice.id,
            total = %order.total_amount,
            "sales order and draft invoice created"
        );

        Ok(SalesOrderWithInvoice { order, invoice })
    }

    /// Confirms a sales order
    pub async fn confirm_sales_order(
        &self,
        id: SalesOrderId,
    ) -> Result<SalesOrder, LifecycleError> {
        let mut order = self.sales_orders.get(id).await?;
        order.confirm()?;
        self.sales_orders.save(&order).await?;
        order.take_events();
        Ok(order)
    }

    /// Re-runs auto-assignment on every line after a customer change
    pub async fn change_sales_order_customer(
        &self,
        id: SalesOrderId,
        customer_id: PartyId,
    ) -> Result<SalesOrder, LifecycleError> {
        let mut order = self.sales_orders.get(id).await?;
        order.change_customer(customer_id)?;

        let mut tags = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let outcome = self
                .assigner
                .assign(Some(customer_id), Some(line.product_id))
                .await?;
            tags.push(match outcome {
                Some(o) => (Some(o.analytical_account_id), o.budget_id),
                None => (None, None),
            });
        }
        order.replace_line_tags(tags)?;

        self.sales_orders.save(&order).await?;
        Ok(order)
    }

    // ========================================================================
    // Vendor bills
    // ========================================================================

    /// Creates a draft vendor bill, auto-assigning untagged lines
    pub async fn create_vendor_bill(
        &self,
        input: NewVendorBill,
    ) -> Result<VendorBill, LifecycleError> {
        let mut bill = VendorBill::new(input.vendor_id, input.bill_date, input.currency);
        bill.due_date = input.due_date;

        for line in self.build_lines(input.vendor_id, input.lines).await? {
            bill.add_line(line)?;
        }

        self.bills.insert(bill.clone()).await?;
        Ok(bill)
    }

    /// Posts a vendor bill; expense accrual recognizes it immediately
    pub async fn post_vendor_bill(&self, id: VendorBillId) -> Result<VendorBill, LifecycleError> {
        let mut bill = self.bills.get(id).await?;
        bill.post()?;
        self.bills.save(&bill).await?;
        bill.take_events();

        self.refresh_accounts(bill.distinct_analytical_accounts()).await;
        Ok(bill)
    }

    /// Cancels a vendor bill and removes it from accrual sums
    pub async fn cancel_vendor_bill(
        &self,
        id: VendorBillId,
    ) -> Result<VendorBill, LifecycleError> {
        let mut bill = self.bills.get(id).await?;
        bill.cancel()?;
        self.bills.save(&bill).await?;
        bill.take_events();

        self.refresh_accounts(bill.distinct_analytical_accounts()).await;
        Ok(bill)
    }

    /// Records a bill payment and re-derives the bill's payment status
    ///
    /// The new paid amount is the sum of all completed payments for the
    /// bill, recomputed from the ledger after the insert.
    pub async fn record_bill_payment(
        &self,
        bill_id: VendorBillId,
        amount: Money,
        mode: PaymentMode,
        reference: Option<String>,
    ) -> Result<BillPayment, LifecycleError> {
        let mut bill = self.bills.get(bill_id).await?;

        let mut payment = BillPayment::completed(bill_id, amount, mode);
        if let Some(reference) = reference {
            payment = payment.with_reference(reference);
        }
        self.bill_payments.insert(payment.clone()).await?;

        let total = self.bill_payments.completed_total_for(bill_id).await?;
        bill.apply_payment_total(Money::new(total, bill.currency))?;

        if let Err(gap) = self.bills.save(&bill).await {
            error!(
                bill_id = %bill_id,
                payment_id = %payment.id,
                %gap,
                "payment recorded but bill totals not updated; reconciliation needed"
            );
        }

        Ok(payment)
    }

    // ========================================================================
    // Customer invoices
    // ========================================================================

    /// Creates a draft customer invoice, auto-assigning untagged lines
    pub async fn create_customer_invoice(
        &self,
        input: NewCustomerInvoice,
    ) -> Result<CustomerInvoice, LifecycleError> {
        let mut invoice =
            CustomerInvoice::new(input.customer_id, input.invoice_date, input.currency);

        for line in self.build_lines(input.customer_id, input.lines).await? {
            invoice.add_line(line)?;
        }

        self.invoices.insert(invoice.clone()).await?;
        Ok(invoice)
    }

    /// Posts a customer invoice
    ///
    /// No budget refresh here: income is recognized on cash receipt, not on
    /// posting. The posted invoice will be picked up by the next refresh a
    /// payment (or a bill-side transition on the same account) triggers.
    pub async fn post_customer_invoice(
        &self,
        id: InvoiceId,
    ) -> Result<CustomerInvoice, LifecycleError> {
        let mut invoice = self.invoices.get(id).await?;
        invoice.post()?;
        self.invoices.save(&invoice).await?;
        invoice.take_events();
        Ok(invoice)
    }

    /// Cancels a customer invoice and removes it from accrual sums
    pub async fn cancel_customer_invoice(
        &self,
        id: InvoiceId,
    ) -> Result<CustomerInvoice, LifecycleError> {
        let mut invoice = self.invoices.get(id).await?;
        invoice.cancel()?;
        self.invoices.save(&invoice).await?;
        invoice.take_events();

        self.refresh_accounts(invoice.distinct_analytical_accounts()).await;
        Ok(invoice)
    }

    /// Records a verified invoice payment and re-derives the invoice status
    ///
    /// The new paid amount is always the sum of all completed payments for
    /// the invoice, never `previous + amount`. An already-recorded gateway
    /// reference short-circuits to the current state without double-crediting.
    /// A failed invoice update after the payment insert is logged as a
    /// reconciliation gap; the payment stands.
    pub async fn record_invoice_payment(
        &self,
        payment: InvoicePayment,
    ) -> Result<InvoicePaymentReceipt, LifecycleError> {
        let invoice_id = payment.invoice_id;
        let mut invoice = self.invoices.get(invoice_id).await?;

        if let Some(reference) = payment.reference.as_deref() {
            if let Some(existing) = self.invoice_payments.find_by_reference(reference).await? {
                warn!(
                    invoice_id = %invoice_id,
                    reference,
                    "gateway payment replayed; returning recorded state"
                );
                return Ok(InvoicePaymentReceipt {
                    payment_id: existing.id,
                    payment_number: existing.payment_number,
                    payment_date: existing.payment_date,
                    paid_amount: invoice.paid_amount,
                    balance_due: invoice.balance_due(),
                    status: invoice.status,
                    replayed: true,
                });
            }
        }

        self.invoice_payments.insert(payment.clone()).await?;

        let total = self.invoice_payments.completed_total_for(invoice_id).await?;
        invoice.apply_payment_total(Money::new(total, invoice.currency))?;

        if let Err(gap) = self.invoices.save(&invoice).await {
            error!(
                invoice_id = %invoice_id,
                payment_id = %payment.id,
                %gap,
                "payment recorded but invoice totals not updated; reconciliation needed"
            );
        }

        // Income is recognized on cash receipt: refresh the income budgets
        // behind this invoice's lines now.
        self.refresh_accounts(invoice.distinct_analytical_accounts()).await;

        Ok(InvoicePaymentReceipt {
            payment_id: payment.id,
            payment_number: payment.payment_number,
            payment_date: payment.payment_date,
            paid_amount: invoice.paid_amount,
            balance_due: invoice.balance_due(),
            status: invoice.status,
            replayed: false,
        })
    }

    // ========================================================================
    // Shared helpers
    // ========================================================================

    /// Builds document lines, consulting the auto-assigner for untagged ones
    async fn build_lines(
        &self,
        partner_id: PartyId,
        inputs: Vec<NewDocumentLine>,
    ) -> Result<Vec<DocumentLine>, LifecycleError> {
        let mut lines = Vec::with_capacity(inputs.len());

        for input in inputs {
            let mut line = DocumentLine::new(input.product_id, input.quantity, input.unit_price);

            if let Some(account) = input.analytical_account_id {
                line = line.with_analytical_tag(account, input.budget_id);
            } else if let Some(outcome) = self
                .assigner
                .assign(Some(partner_id), Some(input.product_id))
                .await?
            {
                line = line.with_analytical_tag(outcome.analytical_account_id, outcome.budget_id);
            }

            lines.push(line);
        }

        Ok(lines)
    }

    /// Refreshes confirmed budgets for each account, logging failures
    async fn refresh_accounts(&self, accounts: HashSet<AnalyticalAccountId>) {
        for account in accounts {
            if let Err(error) = self.accrual.refresh_all_for_account(account).await {
                warn!(
                    account_id = %account,
                    %error,
                    "budget refresh failed after document transition"
                );
            }
        }
    }
}
