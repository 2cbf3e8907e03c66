//! Payment gateway integration
//!
//! The portal never confirms a payment on its own word: the gateway callback
//! carries an HMAC-SHA256 signature over `order_id|payment_id` which is
//! recomputed server-side with the secret key. The signature binds only the
//! order and payment ids; amount and invoice are validated against stored
//! state afterwards.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use thiserror::Error;
use tracing::error;

type HmacSha256 = Hmac<Sha256>;

/// Computes the hex HMAC-SHA256 signature for an order/payment pair
pub fn sign(order_id: &str, payment_id: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a gateway payment signature
///
/// Returns false on any malformed input; never panics on untrusted data.
pub fn verify_signature(order_id: &str, payment_id: &str, signature: &str, secret: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());

    match hex::decode(signature) {
        Ok(expected) => mac.verify_slice(&expected).is_ok(),
        Err(_) => false,
    }
}

/// Errors from gateway order creation
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Request(String),

    #[error("Gateway rejected the order: {0}")]
    Rejected(String),
}

/// Request to open a gateway order
#[derive(Debug, Clone)]
pub struct GatewayOrderRequest {
    /// Amount in minor currency units (paise)
    pub amount_minor: i64,
    /// ISO currency code
    pub currency: String,
    /// Receipt reference shown in the gateway dashboard (invoice number)
    pub receipt: String,
    /// Invoice id carried in the order notes
    pub invoice_id: String,
}

/// A gateway order handle for client-side checkout
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// Payment gateway client interface
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates an order the portal checkout can complete
    async fn create_order(&self, request: GatewayOrderRequest)
        -> Result<GatewayOrder, GatewayError>;

    /// The public key id handed to the client for checkout
    fn key_id(&self) -> &str;
}

/// Razorpay REST client
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
    base_url: String,
}

impl RazorpayClient {
    /// Creates a client for the given credentials and API endpoint
    pub fn new(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(
        &self,
        request: GatewayOrderRequest,
    ) -> Result<GatewayOrder, GatewayError> {
        let body = json!({
            "amount": request.amount_minor,
            "currency": request.currency,
            "receipt": request.receipt,
            "notes": {
                "invoice_id": request.invoice_id,
            },
        });

        let response = self
            .http
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!(%status, %text, "gateway order creation failed");
            return Err(GatewayError::Rejected(format!("{}: {}", status, text)));
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

/// Deterministic in-memory gateway for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    /// Mock gateway issuing sequential order ids
    #[derive(Debug, Default)]
    pub struct MockGateway {
        counter: AtomicU64,
        fail: AtomicBool,
    }

    impl MockGateway {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes subsequent order creations fail
        pub fn set_failing(&self, failing: bool) {
            self.fail.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn create_order(
            &self,
            request: GatewayOrderRequest,
        ) -> Result<GatewayOrder, GatewayError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(GatewayError::Rejected("mock gateway down".to_string()));
            }

            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(GatewayOrder {
                id: format!("order_mock{:06}", n),
                amount: request.amount_minor,
                currency: request.currency,
            })
        }

        fn key_id(&self) -> &str {
            "rzp_test_mock"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let signature = sign("order_abc", "pay_xyz", "secret");
        assert!(verify_signature("order_abc", "pay_xyz", &signature, "secret"));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let signature = sign("order_abc", "pay_xyz", "secret");
        assert!(!verify_signature("order_abc", "pay_other", &signature, "secret"));
        assert!(!verify_signature("order_abc", "pay_xyz", &signature, "wrong-secret"));
        assert!(!verify_signature("order_abc", "pay_xyz", "not-hex!", "secret"));
    }
}
