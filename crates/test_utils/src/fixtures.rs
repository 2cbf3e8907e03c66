//! Common fixture values

use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::{AnalyticalAccountId, Currency, DateRange, Money, PartyId, ProductId};

/// Money fixtures in the ledger's reference currency
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// An INR amount from whole rupees
    pub fn inr(amount: i64) -> Money {
        Money::new(Decimal::from(amount), Currency::INR)
    }
}

/// Date fixtures
pub struct TemporalFixtures;

impl TemporalFixtures {
    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
    }

    /// A full-year budget window for 2026
    pub fn fiscal_2026() -> DateRange {
        DateRange::new(Self::date(2026, 1, 1), Self::date(2026, 12, 31))
            .expect("valid fixture range")
    }

    /// A document date inside [`Self::fiscal_2026`]
    pub fn mid_year() -> NaiveDate {
        Self::date(2026, 6, 15)
    }
}

/// Identifier fixtures
pub struct IdFixtures;

impl IdFixtures {
    pub fn party_id() -> PartyId {
        PartyId::new_v7()
    }

    pub fn product_id() -> ProductId {
        ProductId::new_v7()
    }

    pub fn account_id() -> AnalyticalAccountId {
        AnalyticalAccountId::new_v7()
    }
}
