//! Portal handlers: payment verification and user provisioning
//!
//! The payment endpoint never trusts client-side confirmation. Order
//! creation validates the invoice balance against stored state; payment
//! verification recomputes the callback signature server-side and, on
//! success, recomputes the invoice's paid amount from the full payment
//! ledger rather than applying the claimed delta.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};

use core_kernel::{Currency, InvoiceId, Money};
use domain_documents::ports::InvoicePort;
use domain_documents::InvoicePayment;

use crate::dto::portal::*;
use crate::gateway::{verify_signature, GatewayOrderRequest, PaymentGateway};
use crate::AppState;

fn portal_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(PortalErrorResponse {
            success: false,
            error: message.into(),
        }),
    )
        .into_response()
}

/// Portal payment endpoint: `create_order` and `verify_payment` actions
pub async fn payments(
    State(state): State<AppState>,
    Json(request): Json<PortalPaymentRequest>,
) -> Response {
    match request {
        PortalPaymentRequest::CreateOrder { invoice_id, amount } => {
            create_order(state, invoice_id.into(), amount).await
        }
        PortalPaymentRequest::VerifyPayment {
            invoice_id,
            razorpay_order_id,
            razorpay_payment_id,
            razorpay_signature,
            amount,
        } => {
            verify_payment(
                state,
                invoice_id.into(),
                razorpay_order_id,
                razorpay_payment_id,
                razorpay_signature,
                amount,
            )
            .await
        }
    }
}

async fn create_order(
    state: AppState,
    invoice_id: InvoiceId,
    amount: rust_decimal::Decimal,
) -> Response {
    let invoice = match state.invoices.get(invoice_id).await {
        Ok(invoice) => invoice,
        Err(err) if err.is_not_found() => {
            return portal_error(StatusCode::NOT_FOUND, "Invoice not found");
        }
        Err(err) => {
            error!(%err, "invoice lookup failed");
            return portal_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    if !invoice.is_payable() {
        return portal_error(StatusCode::BAD_REQUEST, "Invoice is not payable");
    }

    let balance_due = invoice.balance_due();
    let requested = Money::new(amount, invoice.currency);
    if requested.amount() > balance_due.amount() {
        return portal_error(
            StatusCode::BAD_REQUEST,
            format!("Amount exceeds balance due ({})", balance_due),
        );
    }

    let order = match state
        .gateway
        .create_order(GatewayOrderRequest {
            amount_minor: requested.to_minor(),
            currency: invoice.currency.code().to_string(),
            receipt: invoice.invoice_number.clone(),
            invoice_id: invoice.id.to_string(),
        })
        .await
    {
        Ok(order) => order,
        Err(err) => {
            error!(%err, invoice_id = %invoice_id, "gateway order creation failed");
            return portal_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create payment order",
            );
        }
    };

    info!(order_id = %order.id, invoice_id = %invoice_id, "gateway order created");

    (
        StatusCode::OK,
        Json(CreateOrderResponse {
            success: true,
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: state.gateway.key_id().to_string(),
        }),
    )
        .into_response()
}

async fn verify_payment(
    state: AppState,
    invoice_id: InvoiceId,
    order_id: String,
    payment_id: String,
    signature: String,
    amount: rust_decimal::Decimal,
) -> Response {
    // The signature check comes first: an invalid callback creates nothing.
    if !verify_signature(
        &order_id,
        &payment_id,
        &signature,
        &state.config.razorpay_key_secret,
    ) {
        warn!(%order_id, "invalid gateway signature");
        return portal_error(StatusCode::BAD_REQUEST, "Payment verification failed");
    }

    let payment = InvoicePayment::from_gateway(
        invoice_id,
        Money::new(amount, Currency::INR),
        payment_id.clone(),
        &order_id,
    );

    let receipt = match state.lifecycle.record_invoice_payment(payment).await {
        Ok(receipt) => receipt,
        Err(domain_documents::LifecycleError::Port(err)) if err.is_not_found() => {
            return portal_error(StatusCode::NOT_FOUND, "Invoice not found");
        }
        Err(err) => {
            error!(%err, invoice_id = %invoice_id, "payment recording failed");
            return portal_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record payment");
        }
    };

    info!(
        invoice_id = %invoice_id,
        paid = %receipt.paid_amount,
        status = %receipt.status,
        replayed = receipt.replayed,
        "gateway payment verified"
    );

    (
        StatusCode::OK,
        Json(VerifyPaymentResponse {
            success: true,
            payment_id: *receipt.payment_id.as_uuid(),
            payment_number: receipt.payment_number,
            razorpay_payment_id: payment_id,
            payment_date: receipt.payment_date,
            new_paid_amount: receipt.paid_amount.amount(),
            new_balance_due: receipt.balance_due.amount(),
            new_status: receipt.status.as_str().to_string(),
        }),
    )
        .into_response()
}

/// Provisions portal users from customer contacts
pub async fn provision_users(
    State(state): State<AppState>,
    request: Option<Json<ProvisionUsersRequest>>,
) -> Response {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    let results = if request.create_demo_user {
        match state.provisioner.provision_demo().await {
            Ok(account) => vec![account],
            Err(err) => {
                error!(%err, "demo user provisioning failed");
                return portal_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
            }
        }
    } else {
        match state.provisioner.provision_all().await {
            Ok(results) => results,
            Err(err) => {
                error!(%err, "portal user provisioning failed");
                return portal_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
            }
        }
    };

    (
        StatusCode::OK,
        Json(ProvisionUsersResponse {
            success: true,
            results,
        }),
    )
        .into_response()
}
