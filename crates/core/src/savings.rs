//! Household savings health check.
//!
//! Values holdings at known prices and compares total savings against an
//! emergency fund of `emergency_fund_months` times monthly income.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{Holding, SavingsConfig};

/// How total savings compare with the emergency fund target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "amount", rename_all = "snake_case")]
pub enum FundStatus {
    /// Savings exceed the target by the given surplus.
    Exceeds(Decimal),
    /// Savings match the target exactly.
    Equal,
    /// Savings fall short of the target by the given amount.
    ShortBy(Decimal),
}

/// Valued savings and the emergency fund verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsSummary {
    pub crypto_value: Decimal,
    pub shares_value: Decimal,
    pub total_savings: Decimal,
    pub emergency_fund: Decimal,
    pub status: FundStatus,
}

impl SavingsSummary {
    /// Values every holding and compares the total with the emergency fund target.
    #[must_use]
    pub fn assess(config: &SavingsConfig) -> Self {
        let crypto_value = total_value(&config.crypto);
        let shares_value = total_value(&config.shares);
        let total_savings = crypto_value + shares_value;
        let emergency_fund = config.monthly_income * Decimal::from(config.emergency_fund_months);

        let status = match total_savings.cmp(&emergency_fund) {
            std::cmp::Ordering::Greater => FundStatus::Exceeds(total_savings - emergency_fund),
            std::cmp::Ordering::Equal => FundStatus::Equal,
            std::cmp::Ordering::Less => FundStatus::ShortBy(emergency_fund - total_savings),
        };

        Self {
            crypto_value,
            shares_value,
            total_savings,
            emergency_fund,
            status,
        }
    }
}

fn total_value(holdings: &[Holding]) -> Decimal {
    holdings.iter().map(Holding::value).sum()
}
