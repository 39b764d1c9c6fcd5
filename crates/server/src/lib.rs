use api_types::envelope::{ErrorResponse, FieldError};
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Query, Request,
        path::ErrorKind as PathErrorKind,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, request::Parts},
    response::IntoResponse,
};
use engine::{EngineError, ErrorKind};

pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod accounts;
mod budgets;
mod categories;
mod dashboard;
mod server;
mod transactions;

pub enum ServerError {
    Engine(EngineError),
    Unauthorized,
    /// Request body, path or query string could not be decoded.
    Body(Vec<FieldError>),
}

fn status_for_kind(kind: ErrorKind) -> StatusCode {
    StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

/// `serde_path_to_error` prefixes the message with the offending key.
fn query_field_of(message: &str) -> String {
    message
        .split_once("query string: ")
        .and_then(|(_, rest)| rest.split_once(": "))
        .map(|(field, _)| field)
        .filter(|field| !field.is_empty() && !field.contains(' '))
        .unwrap_or("query")
        .to_string()
}

/// Best effort: serde quotes missing or unknown field names in backticks.
fn field_of(message: &str) -> String {
    message
        .split_once("field `")
        .and_then(|(_, rest)| rest.split_once('`'))
        .map_or("body", |(field, _)| field)
        .to_string()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (
                status_for_kind(err.kind()),
                ErrorResponse::new(message_for_engine_error(err)),
            ),
            ServerError::Unauthorized => (
                status_for_kind(ErrorKind::Unauthorized),
                ErrorResponse::new("unauthorized"),
            ),
            ServerError::Body(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_errors("validation failed", errors),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        Self::Body(vec![FieldError {
            field: field_of(&message),
            message,
        }])
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        let field = match &rejection {
            PathRejection::FailedToDeserializePathParams(err) => match err.kind() {
                PathErrorKind::ParseErrorAtKey { key, .. }
                | PathErrorKind::DeserializeError { key, .. }
                | PathErrorKind::InvalidUtf8InPathParam { key } => key.clone(),
                _ => "path".to_string(),
            },
            _ => "path".to_string(),
        };
        Self::Body(vec![FieldError {
            field,
            message: rejection.body_text(),
        }])
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        let message = rejection.body_text();
        Self::Body(vec![FieldError {
            field: query_field_of(&message),
            message,
        }])
    }
}

/// `Path` whose rejections use the API error envelope.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// `Query` whose rejections use the API error envelope.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// `Json` whose rejections use the API error envelope.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
