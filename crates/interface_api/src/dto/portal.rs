//! Portal DTOs
//!
//! Wire contract of the payment endpoint: two JSON actions over one route,
//! with the gateway's camelCase field names preserved.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_party::ProvisionedAccount;

/// Portal payment endpoint request, dispatched on `action`
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PortalPaymentRequest {
    /// Open a gateway order for an invoice payment
    #[serde(rename_all = "camelCase")]
    CreateOrder { invoice_id: Uuid, amount: Decimal },

    /// Verify a completed checkout and record the payment
    #[serde(rename_all = "camelCase")]
    VerifyPayment {
        invoice_id: Uuid,
        razorpay_order_id: String,
        razorpay_payment_id: String,
        razorpay_signature: String,
        amount: Decimal,
    },
}

/// Successful order creation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    /// Public key for client-side checkout
    pub key_id: String,
}

/// Successful payment verification
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub payment_id: Uuid,
    pub payment_number: String,
    pub razorpay_payment_id: String,
    pub payment_date: NaiveDate,
    pub new_paid_amount: Decimal,
    pub new_balance_due: Decimal,
    pub new_status: String,
}

/// Failure body shared by all portal endpoints
#[derive(Debug, Serialize)]
pub struct PortalErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Portal user provisioning request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionUsersRequest {
    #[serde(default)]
    pub create_demo_user: bool,
}

/// Portal user provisioning report
#[derive(Debug, Serialize)]
pub struct ProvisionUsersResponse {
    pub success: bool,
    pub results: Vec<ProvisionedAccount>,
}
