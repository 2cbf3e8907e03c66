//! Transaction document handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{
    AnalyticalAccountId, BudgetId, Currency, InvoiceId, Money, PartyId, ProductId,
    PurchaseOrderId, SalesOrderId, VendorBillId,
};
use domain_documents::ports::{
    BillPaymentPort, InvoicePaymentPort, InvoicePort, PurchaseOrderPort, SalesOrderPort,
    VendorBillPort,
};
use domain_documents::{
    NewCustomerInvoice, NewDocumentLine, NewPurchaseOrder, NewSalesOrder, NewVendorBill,
    PaymentMode,
};

use crate::dto::documents::*;
use crate::error::ApiError;
use crate::AppState;

fn to_new_lines(lines: Vec<LineRequest>) -> Vec<NewDocumentLine> {
    lines
        .into_iter()
        .map(|l| NewDocumentLine {
            product_id: ProductId::from(l.product_id),
            quantity: l.quantity,
            unit_price: Money::new(l.unit_price, Currency::INR),
            analytical_account_id: l.analytical_account_id.map(AnalyticalAccountId::from),
            budget_id: l.budget_id.map(BudgetId::from),
        })
        .collect()
}

// ============================================================================
// Purchase orders
// ============================================================================

/// Creates a draft purchase order
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(request): Json<CreatePurchaseOrderRequest>,
) -> Result<Json<PurchaseOrderResponse>, ApiError> {
    request.validate()?;

    let order = state
        .lifecycle
        .create_purchase_order(NewPurchaseOrder {
            vendor_id: PartyId::from(request.vendor_id),
            order_date: request.order_date,
            expected_delivery_date: request.expected_delivery_date,
            currency: Currency::INR,
            notes: request.notes,
            lines: to_new_lines(request.lines),
        })
        .await?;

    Ok(Json(order.into()))
}

/// Lists purchase orders
pub async fn list_purchase_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<PurchaseOrderResponse>>, ApiError> {
    let orders = state.orders.list().await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// Gets a purchase order by id
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseOrderResponse>, ApiError> {
    let order = state.orders.get(PurchaseOrderId::from(id)).await?;
    Ok(Json(order.into()))
}

/// Confirms a purchase order, auto-creating the settled bill and payment
pub async fn confirm_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConfirmOrderResponse>, ApiError> {
    let confirmed = state
        .lifecycle
        .confirm_purchase_order(PurchaseOrderId::from(id))
        .await?;

    Ok(Json(ConfirmOrderResponse {
        order: confirmed.order.into(),
        bill: confirmed.bill.into(),
        payment: confirmed.payment.into(),
    }))
}

/// Cancels a purchase order
pub async fn cancel_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseOrderResponse>, ApiError> {
    let order = state
        .lifecycle
        .cancel_purchase_order(PurchaseOrderId::from(id))
        .await?;
    Ok(Json(order.into()))
}

// ============================================================================
// Sales orders
// ============================================================================

/// Creates a sales order and its paired draft invoice
pub async fn create_sales_order(
    State(state): State<AppState>,
    Json(request): Json<CreateSalesOrderRequest>,
) -> Result<Json<SalesOrderCreatedResponse>, ApiError> {
    request.validate()?;

    let pair = state
        .lifecycle
        .create_sales_order(NewSalesOrder {
            customer_id: PartyId::from(request.customer_id),
            order_date: request.order_date,
            currency: Currency::INR,
            lines: to_new_lines(request.lines),
        })
        .await?;

    Ok(Json(SalesOrderCreatedResponse {
        order: pair.order.into(),
        invoice: pair.invoice.into(),
    }))
}

/// Lists sales orders
pub async fn list_sales_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<SalesOrderResponse>>, ApiError> {
    let orders = state.sales_orders.list().await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// Gets a sales order by id
pub async fn get_sales_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SalesOrderResponse>, ApiError> {
    let order = state.sales_orders.get(SalesOrderId::from(id)).await?;
    Ok(Json(order.into()))
}

/// Confirms a sales order
pub async fn confirm_sales_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SalesOrderResponse>, ApiError> {
    let order = state
        .lifecycle
        .confirm_sales_order(SalesOrderId::from(id))
        .await?;
    Ok(Json(order.into()))
}

// ============================================================================
// Vendor bills
// ============================================================================

/// Creates a draft vendor bill
pub async fn create_vendor_bill(
    State(state): State<AppState>,
    Json(request): Json<CreateVendorBillRequest>,
) -> Result<Json<VendorBillResponse>, ApiError> {
    request.validate()?;

    let bill = state
        .lifecycle
        .create_vendor_bill(NewVendorBill {
            vendor_id: PartyId::from(request.vendor_id),
            bill_date: request.bill_date,
            due_date: request.due_date,
            currency: Currency::INR,
            lines: to_new_lines(request.lines),
        })
        .await?;

    Ok(Json(bill.into()))
}

/// Lists vendor bills
pub async fn list_vendor_bills(
    State(state): State<AppState>,
) -> Result<Json<Vec<VendorBillResponse>>, ApiError> {
    let bills = state.bills.list().await?;
    Ok(Json(bills.into_iter().map(Into::into).collect()))
}

/// Gets a vendor bill by id
pub async fn get_vendor_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VendorBillResponse>, ApiError> {
    let bill = state.bills.get(VendorBillId::from(id)).await?;
    Ok(Json(bill.into()))
}

/// Posts a vendor bill; expense budgets update immediately
pub async fn post_vendor_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VendorBillResponse>, ApiError> {
    let bill = state
        .lifecycle
        .post_vendor_bill(VendorBillId::from(id))
        .await?;
    Ok(Json(bill.into()))
}

/// Cancels a vendor bill, reverting its budget accrual
pub async fn cancel_vendor_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VendorBillResponse>, ApiError> {
    let bill = state
        .lifecycle
        .cancel_vendor_bill(VendorBillId::from(id))
        .await?;
    Ok(Json(bill.into()))
}

/// Records a manual bill payment
pub async fn record_bill_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordBillPaymentRequest>,
) -> Result<Json<BillPaymentResponse>, ApiError> {
    request.validate()?;

    let mode: PaymentMode = request
        .mode
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown payment mode: {}", request.mode)))?;

    let payment = state
        .lifecycle
        .record_bill_payment(
            VendorBillId::from(id),
            Money::new(request.amount, Currency::INR),
            mode,
            request.reference,
        )
        .await?;

    Ok(Json(payment.into()))
}

/// Lists payments recorded against a bill
pub async fn list_bill_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BillPaymentResponse>>, ApiError> {
    let payments = state.bill_payments.list_for(VendorBillId::from(id)).await?;
    Ok(Json(payments.into_iter().map(Into::into).collect()))
}

// ============================================================================
// Customer invoices
// ============================================================================

/// Lists payments recorded against an invoice
pub async fn list_invoice_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<InvoicePaymentResponse>>, ApiError> {
    let payments = state
        .invoice_payments
        .list_for(InvoiceId::from(id))
        .await?;
    Ok(Json(payments.into_iter().map(Into::into).collect()))
}

/// Lists customer invoices
pub async fn list_invoices(
    State(state): State<AppState>,
) -> Result<Json<Vec<InvoiceResponse>>, ApiError> {
    let invoices = state.invoices.list().await?;
    Ok(Json(invoices.into_iter().map(Into::into).collect()))
}

/// Gets a customer invoice by id
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = state.invoices.get(InvoiceId::from(id)).await?;
    Ok(Json(invoice.into()))
}

/// Posts a customer invoice (income recognized on payment, not here)
pub async fn post_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = state
        .lifecycle
        .post_customer_invoice(InvoiceId::from(id))
        .await?;
    Ok(Json(invoice.into()))
}

/// Cancels a customer invoice, reverting its budget accrual
pub async fn cancel_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = state
        .lifecycle
        .cancel_customer_invoice(InvoiceId::from(id))
        .await?;
    Ok(Json(invoice.into()))
}

// Direct invoice creation stays available alongside the sales order pairing.
/// Creates a standalone draft invoice
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    request.validate()?;

    let invoice = state
        .lifecycle
        .create_customer_invoice(NewCustomerInvoice {
            customer_id: PartyId::from(request.customer_id),
            invoice_date: request.invoice_date,
            currency: Currency::INR,
            lines: to_new_lines(request.lines),
        })
        .await?;

    Ok(Json(invoice.into()))
}
