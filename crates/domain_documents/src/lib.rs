//! Transaction Document Domain
//!
//! Purchase orders, vendor bills, sales orders, and customer invoices share
//! one lifecycle shape: `Draft -> Confirmed/Posted -> PartiallyPaid -> Paid`,
//! with `Cancelled` reachable from any non-terminal state. `Draft` is the
//! only state in which a document's header and lines may change.
//!
//! # Cross-document side effects
//!
//! Aggregates emit domain events; the [`LifecycleService`] consumes them to
//! create dependent records and trigger budget refresh:
//!
//! - confirming a purchase order settles it immediately: a vendor bill in
//!   `Paid` status plus one completed bill payment of the full amount
//! - creating a sales order creates a matching draft customer invoice as one
//!   logical unit
//! - posting or cancelling a bill refreshes expense budgets; invoice income
//!   is recognized on cash receipt, not on posting
//!
//! Paid amounts are always recomputed as the sum of completed payments for
//! the document, never maintained as a running delta.

pub mod status;
pub mod line;
pub mod numbering;
pub mod purchase_order;
pub mod sales_order;
pub mod vendor_bill;
pub mod customer_invoice;
pub mod payment;
pub mod events;
pub mod ports;
pub mod lifecycle;
pub mod error;

pub use status::DocumentStatus;
pub use line::DocumentLine;
pub use purchase_order::PurchaseOrder;
pub use sales_order::SalesOrder;
pub use vendor_bill::VendorBill;
pub use customer_invoice::CustomerInvoice;
pub use payment::{BillPayment, InvoicePayment, PaymentMode, PaymentStatus};
pub use events::DocumentEvent;
pub use ports::{
    BillPaymentPort, InvoicePaymentPort, InvoicePort, PurchaseOrderPort, SalesOrderPort,
    VendorBillPort,
};
pub use lifecycle::{
    ConfirmedPurchaseOrder, InvoicePaymentReceipt, LifecycleService, NewCustomerInvoice,
    NewDocumentLine, NewPurchaseOrder, NewSalesOrder, NewVendorBill, SalesOrderWithInvoice,
};
pub use error::{DocumentError, LifecycleError};
