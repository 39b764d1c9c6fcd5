//! Dashboard API endpoints. Read-only.

use api_types::{
    dashboard::{
        CategorySpendView, MonthlyTotalsView, RecentQuery, StatsQuery, StatsView, TrendQuery,
    },
    envelope::ApiResponse,
    transaction::{SummaryQuery, TransactionView},
};
use axum::{Extension, Json, extract::State};
use engine::User;

use crate::{ApiQuery, ServerError, server::ServerState, transactions::map_transaction};

pub async fn stats(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<StatsQuery>,
) -> Result<Json<ApiResponse<StatsView>>, ServerError> {
    let stats = state.engine.dashboard_stats(user.id, query.as_of).await?;
    Ok(Json(ApiResponse::ok(
        "dashboard stats retrieved",
        StatsView {
            as_of: stats.as_of,
            total_balance_minor: stats.total_balance_minor,
            total_income_minor: stats.total_income_minor,
            total_expense_minor: stats.total_expense_minor,
            net_savings_minor: stats.net_savings_minor,
            monthly_change: stats.monthly_change,
        },
    )))
}

pub async fn monthly_trend(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<TrendQuery>,
) -> Result<Json<ApiResponse<Vec<MonthlyTotalsView>>>, ServerError> {
    let trend = state
        .engine
        .monthly_trend(user.id, query.months, query.as_of)
        .await?
        .into_iter()
        .map(|m| MonthlyTotalsView {
            month: m.month,
            income_minor: m.income_minor,
            expense_minor: m.expense_minor,
        })
        .collect();
    Ok(Json(ApiResponse::ok("monthly trend retrieved", trend)))
}

pub async fn expense_by_category(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> Result<Json<ApiResponse<Vec<CategorySpendView>>>, ServerError> {
    let split = state
        .engine
        .expense_by_category(user.id, query.start_date, query.end_date)
        .await?
        .into_iter()
        .map(|s| CategorySpendView {
            category_id: s.category_id,
            category_name: s.category_name,
            category_color: s.category_color,
            total_minor: s.total_minor,
            percentage: s.percentage,
        })
        .collect();
    Ok(Json(ApiResponse::ok("expense by category retrieved", split)))
}

pub async fn recent_transactions(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<RecentQuery>,
) -> Result<Json<ApiResponse<Vec<TransactionView>>>, ServerError> {
    let recent = state
        .engine
        .recent_transactions(user.id, query.limit)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();
    Ok(Json(ApiResponse::ok("recent transactions retrieved", recent)))
}
