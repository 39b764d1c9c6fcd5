//! Transactions API endpoints

use api_types::{
    envelope::{ApiResponse, PageMeta},
    transaction::{
        SummaryQuery, SummaryView, TransactionKind as ApiKind, TransactionListQuery,
        TransactionNew, TransactionUpdate, TransactionView,
    },
};
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use engine::{NewTransactionCmd, TransactionKind, TransactionListFilter, TransactionPatch, User};
use uuid::Uuid;

use crate::{ApiJson, ApiPath, ApiQuery, ServerError, server::ServerState};

fn map_kind(kind: TransactionKind) -> ApiKind {
    match kind {
        TransactionKind::Income => ApiKind::Income,
        TransactionKind::Expense => ApiKind::Expense,
        TransactionKind::Transfer => ApiKind::Transfer,
    }
}

fn engine_kind(kind: ApiKind) -> TransactionKind {
    match kind {
        ApiKind::Income => TransactionKind::Income,
        ApiKind::Expense => TransactionKind::Expense,
        ApiKind::Transfer => TransactionKind::Transfer,
    }
}

pub(crate) fn map_transaction(detail: engine::TransactionDetail) -> TransactionView {
    let tx = detail.transaction;
    TransactionView {
        id: tx.id,
        account_id: tx.account_id,
        account_name: detail.account_name,
        category_id: tx.category_id,
        category_name: detail.category_name,
        category_color: detail.category_color,
        category_icon: detail.category_icon,
        kind: map_kind(tx.kind),
        amount_minor: tx.amount_minor,
        description: tx.description,
        transaction_date: tx.transaction_date,
        notes: tx.notes,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<TransactionListQuery>,
) -> Result<Json<ApiResponse<Vec<TransactionView>>>, ServerError> {
    let filter = TransactionListFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        account_id: query.account_id,
        category_id: query.category_id,
        kind: query.kind.map(engine_kind),
        min_amount_minor: query.min_amount_minor,
        max_amount_minor: query.max_amount_minor,
        page: query.page,
        limit: query.limit,
    };

    let page = state.engine.list_transactions(user.id, &filter).await?;
    let meta = PageMeta {
        page: page.page,
        limit: page.limit,
        total: page.total,
        total_pages: page.total_pages(),
    };
    let items = page.items.into_iter().map(map_transaction).collect();
    Ok(Json(ApiResponse::page("transactions retrieved", items, meta)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<TransactionNew>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionView>>), ServerError> {
    let mut cmd = NewTransactionCmd::new(
        user.id,
        payload.account_id,
        engine_kind(payload.kind),
        payload.amount_minor,
        payload.description,
        payload.transaction_date,
    );
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let detail = state.engine.create_transaction(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "transaction created",
            map_transaction(detail),
        )),
    ))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiPath(transaction_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<TransactionView>>, ServerError> {
    let detail = state.engine.transaction(user.id, transaction_id).await?;
    Ok(Json(ApiResponse::ok(
        "transaction retrieved",
        map_transaction(detail),
    )))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiPath(transaction_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<TransactionUpdate>,
) -> Result<Json<ApiResponse<TransactionView>>, ServerError> {
    let patch = TransactionPatch {
        account_id: payload.account_id,
        category_id: payload.category_id,
        kind: payload.kind.map(engine_kind),
        amount_minor: payload.amount_minor,
        description: payload.description,
        transaction_date: payload.transaction_date,
        notes: payload.notes,
    };
    let detail = state
        .engine
        .update_transaction(user.id, transaction_id, patch)
        .await?;
    Ok(Json(ApiResponse::ok(
        "transaction updated",
        map_transaction(detail),
    )))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiPath(transaction_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state
        .engine
        .delete_transaction(user.id, transaction_id)
        .await?;
    Ok(Json(ApiResponse::message("transaction deleted")))
}

pub async fn summary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> Result<Json<ApiResponse<SummaryView>>, ServerError> {
    let summary = state
        .engine
        .transaction_summary(user.id, query.start_date, query.end_date)
        .await?;
    Ok(Json(ApiResponse::ok(
        "summary retrieved",
        SummaryView {
            start_date: summary.start_date,
            end_date: summary.end_date,
            total_income_minor: summary.total_income_minor,
            total_expense_minor: summary.total_expense_minor,
            net_minor: summary.net_minor,
            transaction_count: summary.transaction_count,
        },
    )))
}
