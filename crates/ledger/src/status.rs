//! Display-only classifications derived from batch state.
//!
//! Neither classification blocks any operation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How close a batch is to its expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryRisk {
    /// At most one month away (or already past).
    Critical,
    /// At most three months away.
    Warning,
    Normal,
}

/// How depleted a batch is relative to its received quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    /// Below 20% of the received quantity.
    Critical,
    /// Below 50% of the received quantity.
    Warning,
    Normal,
}

/// Classify expiry risk with months approximated as 30-day windows.
pub fn expiry_risk(expiry: NaiveDate, today: NaiveDate) -> ExpiryRisk {
    let months = (expiry - today).num_days() as f64 / 30.0;
    if months <= 1.0 {
        ExpiryRisk::Critical
    } else if months <= 3.0 {
        ExpiryRisk::Warning
    } else {
        ExpiryRisk::Normal
    }
}

/// Classify remaining stock against the received quantity.
pub fn stock_level(current_stock: i64, quantity: i64) -> StockLevel {
    let current = current_stock as f64;
    let quantity = quantity as f64;
    if current < quantity * 0.2 {
        StockLevel::Critical
    } else if current < quantity * 0.5 {
        StockLevel::Warning
    } else {
        StockLevel::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expiry_thresholds() {
        let today = date(2024, 6, 1);
        assert_eq!(expiry_risk(date(2024, 6, 15), today), ExpiryRisk::Critical);
        assert_eq!(expiry_risk(date(2024, 5, 1), today), ExpiryRisk::Critical);
        assert_eq!(expiry_risk(date(2024, 8, 1), today), ExpiryRisk::Warning);
        assert_eq!(expiry_risk(date(2025, 6, 1), today), ExpiryRisk::Normal);
    }

    #[test]
    fn stock_thresholds() {
        assert_eq!(stock_level(100, 1000), StockLevel::Critical);
        assert_eq!(stock_level(199, 1000), StockLevel::Critical);
        assert_eq!(stock_level(200, 1000), StockLevel::Warning);
        assert_eq!(stock_level(499, 1000), StockLevel::Warning);
        assert_eq!(stock_level(500, 1000), StockLevel::Normal);
        assert_eq!(stock_level(1000, 1000), StockLevel::Normal);
    }
}
