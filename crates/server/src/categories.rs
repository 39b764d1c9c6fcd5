//! Categories API endpoints.

use api_types::{
    category::{
        CategoryKind as ApiKind, CategoryListQuery, CategoryNew, CategoryUpdate, CategoryView,
    },
    envelope::ApiResponse,
};
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use engine::{CategoryKind, CategoryPatch, NewCategoryCmd, User};
use uuid::Uuid;

use crate::{ApiJson, ApiPath, ApiQuery, ServerError, server::ServerState};

fn map_kind(kind: CategoryKind) -> ApiKind {
    match kind {
        CategoryKind::Income => ApiKind::Income,
        CategoryKind::Expense => ApiKind::Expense,
    }
}

fn engine_kind(kind: ApiKind) -> CategoryKind {
    match kind {
        ApiKind::Income => CategoryKind::Income,
        ApiKind::Expense => CategoryKind::Expense,
    }
}

fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: map_kind(category.kind),
        color: category.color,
        icon: category.icon,
        is_default: category.is_default,
        created_at: category.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<CategoryListQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryView>>>, ServerError> {
    let categories = state
        .engine
        .categories(user.id, query.kind.map(engine_kind))
        .await?
        .into_iter()
        .map(map_category)
        .collect();

    Ok(Json(ApiResponse::ok("categories retrieved", categories)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<CategoryNew>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryView>>), ServerError> {
    let mut cmd = NewCategoryCmd::new(user.id, payload.name, engine_kind(payload.kind));
    if let Some(color) = payload.color {
        cmd = cmd.color(color);
    }
    if let Some(icon) = payload.icon {
        cmd = cmd.icon(icon);
    }

    let category = state.engine.create_category(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("category created", map_category(category))),
    ))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiPath(category_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<CategoryView>>, ServerError> {
    let category = state.engine.category(user.id, category_id).await?;
    Ok(Json(ApiResponse::ok(
        "category retrieved",
        map_category(category),
    )))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiPath(category_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CategoryUpdate>,
) -> Result<Json<ApiResponse<CategoryView>>, ServerError> {
    let patch = CategoryPatch {
        name: payload.name,
        kind: payload.kind.map(engine_kind),
        color: payload.color,
        icon: payload.icon,
    };
    let category = state
        .engine
        .update_category(user.id, category_id, patch)
        .await?;
    Ok(Json(ApiResponse::ok("category updated", map_category(category))))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiPath(category_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_category(user.id, category_id).await?;
    Ok(Json(ApiResponse::message("category deleted")))
}
