//! Transaction document DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_documents::{
    BillPayment, CustomerInvoice, DocumentLine, InvoicePayment, PurchaseOrder, SalesOrder,
    VendorBill,
};

/// Line input shared by all document creation requests
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub analytical_account_id: Option<Uuid>,
    pub budget_id: Option<Uuid>,
}

/// Request to create a purchase order
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseOrderRequest {
    pub vendor_id: Uuid,
    pub order_date: NaiveDate,
    pub expected_delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[validate(length(min = 1))]
    pub lines: Vec<LineRequest>,
}

/// Request to create a sales order
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalesOrderRequest {
    pub customer_id: Uuid,
    pub order_date: NaiveDate,
    #[validate(length(min = 1))]
    pub lines: Vec<LineRequest>,
}

/// Request to create a standalone customer invoice
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub customer_id: Uuid,
    pub invoice_date: NaiveDate,
    #[validate(length(min = 1))]
    pub lines: Vec<LineRequest>,
}

/// Request to create a vendor bill directly
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorBillRequest {
    pub vendor_id: Uuid,
    pub bill_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    #[validate(length(min = 1))]
    pub lines: Vec<LineRequest>,
}

/// Request to record a manual bill payment
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordBillPaymentRequest {
    pub amount: Decimal,
    /// "bank_transfer", "cash", "check", or "online"
    pub mode: String,
    pub reference: Option<String>,
}

/// Document line representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub analytical_account_id: Option<Uuid>,
    pub budget_id: Option<Uuid>,
}

impl From<DocumentLine> for LineResponse {
    fn from(line: DocumentLine) -> Self {
        Self {
            id: line.id,
            product_id: *line.product_id.as_uuid(),
            quantity: line.quantity,
            unit_price: line.unit_price.amount(),
            subtotal: line.subtotal.amount(),
            analytical_account_id: line.analytical_account_id.map(|a| *a.as_uuid()),
            budget_id: line.budget_id.map(|b| *b.as_uuid()),
        }
    }
}

/// Purchase order representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub vendor_id: Uuid,
    pub order_date: NaiveDate,
    pub expected_delivery_date: Option<NaiveDate>,
    pub total_amount: Decimal,
    pub status: String,
    pub analytical_account_id: Option<Uuid>,
    pub notes: Option<String>,
    pub lines: Vec<LineResponse>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PurchaseOrder> for PurchaseOrderResponse {
    fn from(order: PurchaseOrder) -> Self {
        Self {
            id: *order.id.as_uuid(),
            order_number: order.order_number,
            vendor_id: *order.vendor_id.as_uuid(),
            order_date: order.order_date,
            expected_delivery_date: order.expected_delivery_date,
            total_amount: order.total_amount.amount(),
            status: order.status.as_str().to_string(),
            analytical_account_id: order.analytical_account_id.map(|a| *a.as_uuid()),
            notes: order.notes,
            lines: order.lines.into_iter().map(Into::into).collect(),
            is_archived: order.is_archived,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Sales order representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub order_date: NaiveDate,
    pub total_amount: Decimal,
    pub status: String,
    pub lines: Vec<LineResponse>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SalesOrder> for SalesOrderResponse {
    fn from(order: SalesOrder) -> Self {
        Self {
            id: *order.id.as_uuid(),
            order_number: order.order_number,
            customer_id: *order.customer_id.as_uuid(),
            order_date: order.order_date,
            total_amount: order.total_amount.amount(),
            status: order.status.as_str().to_string(),
            lines: order.lines.into_iter().map(Into::into).collect(),
            is_archived: order.is_archived,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Vendor bill representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorBillResponse {
    pub id: Uuid,
    pub bill_number: String,
    pub vendor_id: Uuid,
    pub purchase_order_id: Option<Uuid>,
    pub bill_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub status: String,
    pub lines: Vec<LineResponse>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VendorBill> for VendorBillResponse {
    fn from(bill: VendorBill) -> Self {
        Self {
            id: *bill.id.as_uuid(),
            bill_number: bill.bill_number,
            vendor_id: *bill.vendor_id.as_uuid(),
            purchase_order_id: bill.purchase_order_id.map(|o| *o.as_uuid()),
            bill_date: bill.bill_date,
            due_date: bill.due_date,
            total_amount: bill.total_amount.amount(),
            paid_amount: bill.paid_amount.amount(),
            status: bill.status.as_str().to_string(),
            lines: bill.lines.into_iter().map(Into::into).collect(),
            is_archived: bill.is_archived,
            created_at: bill.created_at,
            updated_at: bill.updated_at,
        }
    }
}

/// Customer invoice representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub customer_id: Uuid,
    pub sales_order_id: Option<Uuid>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub status: String,
    pub lines: Vec<LineResponse>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomerInvoice> for InvoiceResponse {
    fn from(invoice: CustomerInvoice) -> Self {
        Self {
            id: *invoice.id.as_uuid(),
            invoice_number: invoice.invoice_number,
            customer_id: *invoice.customer_id.as_uuid(),
            sales_order_id: invoice.sales_order_id.map(|o| *o.as_uuid()),
            invoice_date: invoice.invoice_date,
            due_date: invoice.due_date,
            total_amount: invoice.total_amount.amount(),
            paid_amount: invoice.paid_amount.amount(),
            status: invoice.status.as_str().to_string(),
            lines: invoice.lines.into_iter().map(Into::into).collect(),
            is_archived: invoice.is_archived,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

/// Bill payment representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillPaymentResponse {
    pub id: Uuid,
    pub payment_number: String,
    pub bill_id: Uuid,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub mode: String,
    pub status: String,
    pub reference: Option<String>,
}

impl From<BillPayment> for BillPaymentResponse {
    fn from(payment: BillPayment) -> Self {
        Self {
            id: *payment.id.as_uuid(),
            payment_number: payment.payment_number,
            bill_id: *payment.bill_id.as_uuid(),
            payment_date: payment.payment_date,
            amount: payment.amount.amount(),
            mode: payment.mode.as_str().to_string(),
            status: payment.status.as_str().to_string(),
            reference: payment.reference,
        }
    }
}

/// Invoice payment representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePaymentResponse {
    pub id: Uuid,
    pub payment_number: String,
    pub invoice_id: Uuid,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub mode: String,
    pub status: String,
    pub reference: Option<String>,
}

impl From<InvoicePayment> for InvoicePaymentResponse {
    fn from(payment: InvoicePayment) -> Self {
        Self {
            id: *payment.id.as_uuid(),
            payment_number: payment.payment_number,
            invoice_id: *payment.invoice_id.as_uuid(),
            payment_date: payment.payment_date,
            amount: payment.amount.amount(),
            mode: payment.mode.as_str().to_string(),
            status: payment.status.as_str().to_string(),
            reference: payment.reference,
        }
    }
}

/// Response for purchase order confirmation (order plus settlement records)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOrderResponse {
    pub order: PurchaseOrderResponse,
    pub bill: VendorBillResponse,
    pub payment: BillPaymentResponse,
}

/// Response for sales order creation (order plus its paired invoice)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderCreatedResponse {
    pub order: SalesOrderResponse,
    pub invoice: InvoiceResponse,
}
