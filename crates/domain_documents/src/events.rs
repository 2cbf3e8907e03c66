//! Domain events for transaction documents
//!
//! Events capture state changes that other parts of the system react to:
//! auto-creation of dependent documents and budget accrual refresh. They are
//! accumulated on the aggregate and drained by the lifecycle service after a
//! successful save.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{
    AnalyticalAccountId, InvoiceId, PartyId, PurchaseOrderId, SalesOrderId, VendorBillId,
};

use crate::status::DocumentStatus;

/// Domain events emitted by document aggregates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DocumentEvent {
    /// A purchase order moved to confirmed; triggers auto-billing
    PurchaseOrderConfirmed {
        order_id: PurchaseOrderId,
        vendor_id: PartyId,
        total_amount: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// A sales order was created; triggers draft invoice creation
    SalesOrderCreated {
        order_id: SalesOrderId,
        customer_id: PartyId,
        total_amount: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// A sales order moved to confirmed
    SalesOrderConfirmed {
        order_id: SalesOrderId,
        timestamp: DateTime<Utc>,
    },

    /// A vendor bill was posted; expense accrual recognizes it
    VendorBillPosted {
        bill_id: VendorBillId,
        accounts: Vec<AnalyticalAccountId>,
        timestamp: DateTime<Utc>,
    },

    /// A vendor bill was cancelled; accrual must drop it
    VendorBillCancelled {
        bill_id: VendorBillId,
        accounts: Vec<AnalyticalAccountId>,
        timestamp: DateTime<Utc>,
    },

    /// A cumulative payment total was applied to a vendor bill
    VendorBillPaymentApplied {
        bill_id: VendorBillId,
        paid_amount: Decimal,
        status: DocumentStatus,
        timestamp: DateTime<Utc>,
    },

    /// A customer invoice was posted (income accrues on payment, not here)
    InvoicePosted {
        invoice_id: InvoiceId,
        accounts: Vec<AnalyticalAccountId>,
        timestamp: DateTime<Utc>,
    },

    /// A customer invoice was cancelled; accrual must drop it
    InvoiceCancelled {
        invoice_id: InvoiceId,
        accounts: Vec<AnalyticalAccountId>,
        timestamp: DateTime<Utc>,
    },

    /// A cumulative payment total was applied to a customer invoice
    InvoicePaymentApplied {
        invoice_id: InvoiceId,
        paid_amount: Decimal,
        status: DocumentStatus,
        timestamp: DateTime<Utc>,
    },
}

impl DocumentEvent {
    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            DocumentEvent::PurchaseOrderConfirmed { .. } => "PurchaseOrderConfirmed",
            DocumentEvent::SalesOrderCreated { .. } => "SalesOrderCreated",
            DocumentEvent::SalesOrderConfirmed { .. } => "SalesOrderConfirmed",
            DocumentEvent::VendorBillPosted { .. } => "VendorBillPosted",
            DocumentEvent::VendorBillCancelled { .. } => "VendorBillCancelled",
            DocumentEvent::VendorBillPaymentApplied { .. } => "VendorBillPaymentApplied",
            DocumentEvent::InvoicePosted { .. } => "InvoicePosted",
            DocumentEvent::InvoiceCancelled { .. } => "InvoiceCancelled",
            DocumentEvent::InvoicePaymentApplied { .. } => "InvoicePaymentApplied",
        }
    }
}
