use crate::{
    AppState,
    auth::{AuthUser, DASHBOARD},
    currency::CurrencyService,
    error::ApiError,
    models::{DashboardStats, MonthTrend, RatesResponse, StatsResponse, TrendsResponse},
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Deserialize;

/// TrendQuery
///
/// Query parameters for the monthly trend report. The window is clamped to 1..=12
/// months, defaulting to 6.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct TrendQuery {
    pub months: Option<u32>,
}

/// First instant of the month identified by a linear month index (year * 12 +
/// month0). Indexing linearly keeps the December -> January step arithmetic.
fn month_start(index: i32) -> DateTime<Utc> {
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// get_stats
///
/// [Admin Route] The dashboard counter set, plus the all-time received withdrawal
/// volume converted to USD.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses(
        (status = 200, description = "Dashboard", body = StatsResponse),
        (status = 403, description = "Not on the dashboard allow-list")
    )
)]
pub async fn get_stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    user.require(DASHBOARD)?;

    let (employees, active_casinos, free_cards, pending_withdrawals) =
        state.repo.stats_counters().await?;

    let rates = state.currency.rates().await;
    let received_total_usd = state
        .repo
        .received_amounts()
        .await?
        .iter()
        .map(|r| CurrencyService::convert_with(&rates.rates, r.amount, &r.currency))
        .sum();

    Ok(Json(StatsResponse {
        success: true,
        stats: DashboardStats {
            employees,
            active_casinos,
            free_cards,
            pending_withdrawals,
            received_total_usd,
        },
    }))
}

/// get_trends
///
/// [Admin Route] The monthly trend report: a fixed loop over the last N calendar
/// months, two range queries per month (tests started, withdrawals received), and a
/// manually computed success rate. The queries run sequentially, one month at a
/// time, mirroring how the dashboard has always been fed.
#[utoipa::path(
    get,
    path = "/admin/trends",
    params(TrendQuery),
    responses(
        (status = 200, description = "Monthly buckets, oldest first", body = TrendsResponse),
        (status = 403, description = "Not on the dashboard allow-list")
    )
)]
pub async fn get_trends(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<TrendsResponse>, ApiError> {
    user.require(DASHBOARD)?;

    let window = query.months.unwrap_or(6).clamp(1, 12) as i32;

    // One rate table for the whole report.
    let rates = state.currency.rates().await;

    let now = Utc::now();
    let current_index = now.year() * 12 + now.month0() as i32;

    let mut months = Vec::with_capacity(window as usize);
    for offset in (0..window).rev() {
        let index = current_index - offset;
        let from = month_start(index);
        let to = month_start(index + 1);

        let tests_started = state.repo.count_tests_between(from, to).await?;
        let received = state.repo.received_amounts_between(from, to).await?;

        let withdrawals_received = received.len() as i64;
        let received_usd = received
            .iter()
            .map(|r| CurrencyService::convert_with(&rates.rates, r.amount, &r.currency))
            .sum();
        let success_rate = if tests_started > 0 {
            withdrawals_received as f64 / tests_started as f64
        } else {
            0.0
        };

        months.push(MonthTrend {
            month: format!("{:04}-{:02}", from.year(), from.month()),
            tests_started,
            withdrawals_received,
            received_usd,
            success_rate,
        });
    }

    Ok(Json(TrendsResponse {
        success: true,
        months,
    }))
}

/// get_rates
///
/// [Authenticated Route] The USD conversion table currently in effect and whether it
/// came from the live feed or the static fallback.
#[utoipa::path(
    get,
    path = "/rates",
    responses((status = 200, description = "Conversion table", body = RatesResponse))
)]
pub async fn get_rates(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<RatesResponse>, ApiError> {
    user.require_active()?;
    let in_effect = state.currency.rates().await;
    Ok(Json(RatesResponse {
        success: true,
        rates: in_effect.rates,
        source: in_effect.source.to_string(),
    }))
}
