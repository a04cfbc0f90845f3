use super::*;
use taskd_core::TaskId;

fn record(model: &str, output_tokens: u64, recorded_at_ms: u64) -> ApiUsageRecord {
    ApiUsageRecord {
        task_id: TaskId::new(),
        purpose: "plan".to_string(),
        model: model.to_string(),
        input_tokens: 1_000,
        output_tokens,
        thinking_tokens: 0,
        recorded_at_ms,
    }
}

fn pricing() -> HashMap<String, ModelPricing> {
    let mut map = HashMap::new();
    map.insert("remote-big".to_string(), ModelPricing { input_per_million_usd: 3.0, output_per_million_usd: 15.0 });
    map
}

#[test]
fn summarize_sums_only_records_in_the_current_month_and_day() {
    let now_ms: u64 = 1_700_000_000_000;
    let today = record("remote-big", 1_000_000, now_ms);
    let last_month = record("remote-big", 1_000_000, 1_690_000_000_000);
    let status = summarize(&[today, last_month], &pricing(), now_ms);
    assert!(status.day_spend_usd > 0.0);
    assert_eq!(status.day_spend_usd, status.month_spend_usd);
}

#[test]
fn enforce_refuses_once_daily_cap_is_reached() {
    let cfg = GatewayConfig { daily_cap_usd: 1.0, monthly_cap_usd: 100.0, pricing: pricing() };
    let status = BudgetStatus { day_spend_usd: 1.5, month_spend_usd: 1.5 };
    assert!(matches!(enforce(&status, &cfg), Err(GatewayError::BudgetExceeded)));
}

#[test]
fn enforce_allows_spend_under_cap() {
    let cfg = GatewayConfig { daily_cap_usd: 10.0, monthly_cap_usd: 100.0, pricing: pricing() };
    let status = BudgetStatus { day_spend_usd: 1.0, month_spend_usd: 1.0 };
    assert!(enforce(&status, &cfg).is_ok());
}

#[test]
fn daily_ratio_computes_fraction_of_cap() {
    let status = BudgetStatus { day_spend_usd: 7.0, month_spend_usd: 7.0 };
    assert_eq!(status.daily_ratio(10.0), 0.7);
}
