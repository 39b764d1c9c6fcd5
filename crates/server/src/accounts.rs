//! Accounts API endpoints.

use api_types::{
    Currency as ApiCurrency,
    account::{AccountKind as ApiKind, AccountNew, AccountUpdate, AccountView, BalanceAuditView},
    envelope::ApiResponse,
};
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use engine::{AccountKind, AccountPatch, Currency, Money, NewAccountCmd, User};
use uuid::Uuid;

use crate::{ApiJson, ApiPath, ServerError, server::ServerState};

fn map_kind(kind: AccountKind) -> ApiKind {
    match kind {
        AccountKind::Checking => ApiKind::Checking,
        AccountKind::Savings => ApiKind::Savings,
        AccountKind::CreditCard => ApiKind::CreditCard,
        AccountKind::Cash => ApiKind::Cash,
        AccountKind::Investment => ApiKind::Investment,
        AccountKind::Other => ApiKind::Other,
    }
}

fn engine_kind(kind: ApiKind) -> AccountKind {
    match kind {
        ApiKind::Checking => AccountKind::Checking,
        ApiKind::Savings => AccountKind::Savings,
        ApiKind::CreditCard => AccountKind::CreditCard,
        ApiKind::Cash => AccountKind::Cash,
        ApiKind::Investment => AccountKind::Investment,
        ApiKind::Other => AccountKind::Other,
    }
}

fn map_currency(currency: Currency) -> ApiCurrency {
    match currency {
        Currency::Usd => ApiCurrency::Usd,
        Currency::Eur => ApiCurrency::Eur,
        Currency::Gbp => ApiCurrency::Gbp,
        Currency::Cad => ApiCurrency::Cad,
        Currency::Aud => ApiCurrency::Aud,
        Currency::Chf => ApiCurrency::Chf,
    }
}

fn engine_currency(currency: ApiCurrency) -> Currency {
    match currency {
        ApiCurrency::Usd => Currency::Usd,
        ApiCurrency::Eur => Currency::Eur,
        ApiCurrency::Gbp => Currency::Gbp,
        ApiCurrency::Cad => Currency::Cad,
        ApiCurrency::Aud => Currency::Aud,
        ApiCurrency::Chf => Currency::Chf,
    }
}

fn map_account(account: engine::Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        kind: map_kind(account.kind),
        balance_minor: account.balance_minor,
        opening_balance_minor: account.opening_balance_minor,
        currency: map_currency(account.currency),
        description: account.description,
        is_active: account.is_active,
        created_at: account.created_at,
        updated_at: account.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<AccountView>>>, ServerError> {
    let accounts = state
        .engine
        .accounts(user.id)
        .await?
        .into_iter()
        .map(map_account)
        .collect();
    Ok(Json(ApiResponse::ok("accounts retrieved", accounts)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<AccountNew>,
) -> Result<(StatusCode, Json<ApiResponse<AccountView>>), ServerError> {
    let mut cmd = NewAccountCmd::new(user.id, payload.name, engine_kind(payload.kind))
        .opening_balance(Money::new(payload.opening_balance_minor.unwrap_or(0)));
    if let Some(currency) = payload.currency {
        cmd = cmd.currency(engine_currency(currency));
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let account = state.engine.create_account(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("account created", map_account(account))),
    ))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiPath(account_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<AccountView>>, ServerError> {
    let account = state.engine.account(user.id, account_id).await?;
    Ok(Json(ApiResponse::ok("account retrieved", map_account(account))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiPath(account_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<AccountUpdate>,
) -> Result<Json<ApiResponse<AccountView>>, ServerError> {
    let patch = AccountPatch {
        name: payload.name,
        kind: payload.kind.map(engine_kind),
        description: payload.description,
        is_active: payload.is_active,
    };
    let account = state
        .engine
        .update_account(user.id, account_id, patch)
        .await?;
    Ok(Json(ApiResponse::ok("account updated", map_account(account))))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiPath(account_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_account(user.id, account_id).await?;
    Ok(Json(ApiResponse::message("account deleted")))
}

pub async fn audit(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiPath(account_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<BalanceAuditView>>, ServerError> {
    let audit = state.engine.verify_balance(user.id, account_id).await?;
    if !audit.is_consistent() {
        tracing::warn!(%account_id, drift = %audit.drift(), "balance drift detected");
    }
    Ok(Json(ApiResponse::ok(
        "balance verified",
        BalanceAuditView {
            account_id: audit.account_id,
            stored_minor: audit.stored_minor,
            expected_minor: audit.expected_minor,
            drift_minor: audit.drift().minor(),
            consistent: audit.is_consistent(),
        },
    )))
}
