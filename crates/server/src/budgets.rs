//! Budgets API endpoints.

use api_types::{
    budget::{BudgetNew, BudgetPeriod as ApiPeriod, BudgetUpdate, BudgetView},
    envelope::ApiResponse,
};
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use engine::{BudgetPatch, BudgetPeriod, BudgetStatus, NewBudgetCmd, User};
use uuid::Uuid;

use crate::{ApiJson, ApiPath, ServerError, server::ServerState};

fn map_period(period: BudgetPeriod) -> ApiPeriod {
    match period {
        BudgetPeriod::Weekly => ApiPeriod::Weekly,
        BudgetPeriod::Monthly => ApiPeriod::Monthly,
        BudgetPeriod::Yearly => ApiPeriod::Yearly,
    }
}

fn engine_period(period: ApiPeriod) -> BudgetPeriod {
    match period {
        ApiPeriod::Weekly => BudgetPeriod::Weekly,
        ApiPeriod::Monthly => BudgetPeriod::Monthly,
        ApiPeriod::Yearly => BudgetPeriod::Yearly,
    }
}

fn map_budget(status: BudgetStatus) -> BudgetView {
    let budget = status.budget;
    BudgetView {
        id: budget.id,
        category_id: budget.category_id,
        category_name: status.category_name,
        category_color: status.category_color,
        category_icon: status.category_icon,
        amount_minor: budget.amount_minor,
        period: map_period(budget.period),
        start_date: budget.start_date,
        end_date: budget.end_date,
        alert_threshold: budget.alert_threshold,
        spent_minor: status.spent_minor,
        remaining_minor: status.remaining_minor,
        percentage_used: status.percentage_used,
        created_at: budget.created_at,
        updated_at: budget.updated_at,
    }
}

fn map_budgets(statuses: Vec<BudgetStatus>) -> Vec<BudgetView> {
    statuses.into_iter().map(map_budget).collect()
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<BudgetView>>>, ServerError> {
    let budgets = state.engine.budgets(user.id).await?;
    Ok(Json(ApiResponse::ok("budgets retrieved", map_budgets(budgets))))
}

pub async fn alerts(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<BudgetView>>>, ServerError> {
    let budgets = state.engine.budget_alerts(user.id).await?;
    Ok(Json(ApiResponse::ok(
        "budget alerts retrieved",
        map_budgets(budgets),
    )))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<BudgetNew>,
) -> Result<(StatusCode, Json<ApiResponse<BudgetView>>), ServerError> {
    let mut cmd = NewBudgetCmd::new(
        user.id,
        payload.category_id,
        payload.amount_minor,
        engine_period(payload.period),
        payload.start_date,
    );
    if let Some(end_date) = payload.end_date {
        cmd = cmd.end_date(end_date);
    }
    if let Some(alert_threshold) = payload.alert_threshold {
        cmd = cmd.alert_threshold(alert_threshold);
    }

    let status = state.engine.create_budget(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("budget created", map_budget(status))),
    ))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiPath(budget_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<BudgetView>>, ServerError> {
    let status = state.engine.budget(user.id, budget_id).await?;
    Ok(Json(ApiResponse::ok("budget retrieved", map_budget(status))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiPath(budget_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BudgetUpdate>,
) -> Result<Json<ApiResponse<BudgetView>>, ServerError> {
    let patch = BudgetPatch {
        amount_minor: payload.amount_minor,
        period: payload.period.map(engine_period),
        start_date: payload.start_date,
        end_date: payload.end_date,
        alert_threshold: payload.alert_threshold,
    };
    let status = state.engine.update_budget(user.id, budget_id, patch).await?;
    Ok(Json(ApiResponse::ok("budget updated", map_budget(status))))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiPath(budget_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_budget(user.id, budget_id).await?;
    Ok(Json(ApiResponse::message("budget deleted")))
}
