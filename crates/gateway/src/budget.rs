// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spend ledger: sums `ApiUsageRecord`s over the UTC day/month boundary
//! and compares against configured caps before every remote call.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use taskd_core::ApiUsageRecord;

use crate::error::GatewayError;

/// Per-million-token pricing for one model. Thinking tokens are priced
/// as output tokens, per the distilled spec.
#[derive(Debug, Clone, Copy)]
pub struct ModelPricing {
    pub input_per_million_usd: f64,
    pub output_per_million_usd: f64,
}

impl ModelPricing {
    fn cost(&self, input_tokens: u64, output_tokens: u64, thinking_tokens: u64) -> f64 {
        let input_cost = input_tokens as f64 / 1_000_000.0 * self.input_per_million_usd;
        let output_cost = (output_tokens + thinking_tokens) as f64 / 1_000_000.0 * self.output_per_million_usd;
        input_cost + output_cost
    }
}

/// Budget configuration: hard caps plus the pricing table used to turn
/// token counts into dollars.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub daily_cap_usd: f64,
    pub monthly_cap_usd: f64,
    pub pricing: HashMap<String, ModelPricing>,
}

/// Spend summary for the current UTC day and month.
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetStatus {
    pub day_spend_usd: f64,
    pub month_spend_usd: f64,
}

impl BudgetStatus {
    /// Fraction of the daily cap already spent, feeding `RouteContext::spend_ratio`.
    pub fn daily_ratio(&self, daily_cap_usd: f64) -> f64 {
        if daily_cap_usd <= 0.0 {
            return 1.0;
        }
        self.day_spend_usd / daily_cap_usd
    }
}

fn record_cost(record: &ApiUsageRecord, pricing: &HashMap<String, ModelPricing>) -> f64 {
    pricing
        .get(&record.model)
        .map(|p| p.cost(record.input_tokens, record.output_tokens, record.thinking_tokens))
        .unwrap_or(0.0)
}

/// Sum `records` into today's and this month's spend, in UTC.
pub fn summarize(records: &[ApiUsageRecord], pricing: &HashMap<String, ModelPricing>, now_ms: u64) -> BudgetStatus {
    let now = DateTime::<Utc>::from_timestamp_millis(now_ms as i64).unwrap_or_else(Utc::now);
    let today = now.date_naive();
    let (this_year, this_month) = (now.year(), now.month());

    let mut status = BudgetStatus::default();
    for record in records {
        let Some(recorded_at) = DateTime::<Utc>::from_timestamp_millis(record.recorded_at_ms as i64) else {
            continue;
        };
        let cost = record_cost(record, pricing);
        if recorded_at.year() == this_year && recorded_at.month() == this_month {
            status.month_spend_usd += cost;
            if recorded_at.date_naive() == today {
                status.day_spend_usd += cost;
            }
        }
    }
    status
}

/// Refuse with [`GatewayError::BudgetExceeded`] once either cap is hit.
pub fn enforce(status: &BudgetStatus, cfg: &GatewayConfig) -> Result<(), GatewayError> {
    if status.day_spend_usd >= cfg.daily_cap_usd || status.month_spend_usd >= cfg.monthly_cap_usd {
        return Err(GatewayError::BudgetExceeded);
    }
    Ok(())
}

#[cfg(test)]
#[path = "budget_tests.rs"]
mod tests;
