use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
    typed_header::TypedHeaderRejection,
};
use uuid::Uuid;

use std::sync::Arc;

use crate::{ServerError, accounts, budgets, categories, dashboard, transactions};
use engine::{Engine, EngineError};

static USER_ID_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `TypedHeader` for the caller identity.
///
/// Every request must carry an "x-user-id" entry holding the user UUID.
#[derive(Debug)]
struct UserIdHeader(Uuid);

impl Header for UserIdHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let Ok(value) = Uuid::parse_str(value.trim()) else {
            return Err(AxumError::invalid());
        };

        Ok(UserIdHeader(value))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        let as_string = self.0.to_string();
        match axum::http::HeaderValue::from_str(&as_string) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-user-id header"),
        }
    }
}

async fn auth(
    user_header: Result<TypedHeader<UserIdHeader>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(TypedHeader(UserIdHeader(user_id))) = user_header else {
        return Err(ServerError::Unauthorized);
    };

    let user = match state.engine.user(user_id).await {
        Ok(user) => user,
        Err(EngineError::NotFound(_)) => {
            tracing::debug!(%user_id, "unknown caller");
            return Err(ServerError::Unauthorized);
        }
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Every route requires a known caller.
pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    Router::new()
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/accounts/{id}",
            get(accounts::get)
                .patch(accounts::update)
                .delete(accounts::delete),
        )
        .route("/accounts/{id}/audit", get(accounts::audit))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/summary", get(transactions::summary))
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::delete),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::get)
                .patch(categories::update)
                .delete(categories::delete),
        )
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route("/budgets/alerts", get(budgets::alerts))
        .route(
            "/budgets/{id}",
            get(budgets::get)
                .patch(budgets::update)
                .delete(budgets::delete),
        )
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/dashboard/monthly-trend", get(dashboard::monthly_trend))
        .route(
            "/dashboard/expense-by-category",
            get(dashboard::expense_by_category),
        )
        .route(
            "/dashboard/recent-transactions",
            get(dashboard::recent_transactions),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
