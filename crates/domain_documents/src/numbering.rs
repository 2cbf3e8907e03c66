//! Human-readable document number generation
//!
//! Numbers combine the calendar year with a millisecond-derived sequence so
//! that client-side generation stays collision-free without a database
//! counter.

use chrono::{Datelike, Utc};

/// Millisecond-derived sequence component
fn sequence() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (duration.as_millis() % 10_000_000_000) as u64
}

fn numbered(prefix: &str) -> String {
    format!("{}-{}{}", prefix, Utc::now().year(), sequence())
}

/// `PO-<year><seq>`
pub fn purchase_order_number() -> String {
    numbered("PO")
}

/// `SO-<year><seq>`
pub fn sales_order_number() -> String {
    numbered("SO")
}

/// `BILL-<year><seq>`
pub fn bill_number() -> String {
    numbered("BILL")
}

/// `INV-<year><seq>`
pub fn invoice_number() -> String {
    numbered("INV")
}

/// `BPAY-<year><seq>` for outbound bill payments
pub fn bill_payment_number() -> String {
    numbered("BPAY")
}

/// `REC-<year><seq>` for inbound invoice receipts
pub fn receipt_number() -> String {
    numbered("REC")
}

/// `RZP-<yymm>-<nnnn>` for gateway-verified payments
pub fn gateway_payment_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    format!(
        "RZP-{}-{:04}",
        Utc::now().format("%y%m"),
        nanos % 10_000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert!(purchase_order_number().starts_with("PO-"));
        assert!(sales_order_number().starts_with("SO-"));
        assert!(bill_number().starts_with("BILL-"));
        assert!(invoice_number().starts_with("INV-"));
        assert!(bill_payment_number().starts_with("BPAY-"));
        assert!(receipt_number().starts_with("REC-"));
        assert!(gateway_payment_number().starts_with("RZP-"));
    }

    #[test]
    fn test_gateway_number_shape() {
        let number = gateway_payment_number();
        let parts: Vec<_> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 4);
        assert_eq!(parts[2].len(), 4);
    }
}
