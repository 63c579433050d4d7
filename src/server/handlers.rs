//! HTTP handlers for cat operations

use axum::{
    Json,
    extract::{
        FromRequestParts, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::application::{ApplicationRecord, ApplicationStatus};
use crate::core::auth::{Action, AuthContext, AuthProvider, Resource};
use crate::core::cat::{CatRecord, CatStatus, CatSummary, NewCat};
use crate::core::error::{PawprintError, ValidationError};
use crate::core::query::{SearchRequest, SearchResult};
use crate::core::{CatCatalog, CatSearchService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub search: CatSearchService,
    pub catalog: CatCatalog,
    pub auth: Arc<dyn AuthProvider>,
}

/// Caller identity resolved by the configured [`AuthProvider`]
pub struct Actor(pub AuthContext);

impl FromRequestParts<AppState> for Actor {
    type Rejection = PawprintError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .auth
            .extract_context(parts)
            .await
            .map(Actor)
            .map_err(|e| PawprintError::Unauthorized {
                message: e.to_string(),
            })
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, PawprintError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        PawprintError::InvalidArgument(ValidationError::InvalidBody {
            message: rejection.body_text(),
        })
    })
}

fn path_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, PawprintError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| PawprintError::invalid("id", rejection.body_text()))
}

/// Body of a status change
#[derive(Debug, Deserialize, Serialize)]
pub struct StatusChange {
    pub status: CatStatus,
}

/// Body of an application review
#[derive(Debug, Deserialize, Serialize)]
pub struct ApplicationDecision {
    pub status: ApplicationStatus,
}

/// Response for the list endpoint
#[derive(Debug, Serialize)]
pub struct ListCatsResponse {
    pub cats: Vec<CatSummary>,
    pub count: usize,
}

/// POST /cats/search
pub async fn search_cats(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResult>, PawprintError> {
    let request = body(payload)?;
    state
        .catalog
        .policy()
        .authorize(&actor, Action::SearchCats, &Resource::Catalogue)?;
    Ok(Json(state.search.search(request).await?))
}

/// GET /cats
pub async fn list_cats(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<Json<ListCatsResponse>, PawprintError> {
    state
        .catalog
        .policy()
        .authorize(&actor, Action::SearchCats, &Resource::Catalogue)?;
    let cats = state.search.list_cats().await?;
    Ok(Json(ListCatsResponse {
        count: cats.len(),
        cats,
    }))
}

/// GET /cats/{id}
pub async fn get_cat(
    State(state): State<AppState>,
    Actor(actor): Actor,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<CatRecord>, PawprintError> {
    let id = path_id(path)?;
    Ok(Json(state.catalog.view(&actor, &id).await?))
}

/// POST /cats
pub async fn create_cat(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<NewCat>, JsonRejection>,
) -> Result<Response, PawprintError> {
    let new = body(payload)?;
    let created = state.catalog.create(&actor, new).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// PUT /cats/{id}/status
pub async fn update_cat_status(
    State(state): State<AppState>,
    Actor(actor): Actor,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<StatusChange>, JsonRejection>,
) -> Result<Json<CatRecord>, PawprintError> {
    let id = path_id(path)?;
    let change = body(payload)?;
    Ok(Json(
        state.catalog.set_status(&actor, &id, change.status).await?,
    ))
}

/// DELETE /cats/{id}
pub async fn delete_cat(
    State(state): State<AppState>,
    Actor(actor): Actor,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, PawprintError> {
    let id = path_id(path)?;
    state.catalog.delete(&actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /cats/{id}/applications
pub async fn apply_for_cat(
    State(state): State<AppState>,
    Actor(actor): Actor,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, PawprintError> {
    let id = path_id(path)?;
    let application = state.catalog.apply(&actor, &id).await?;
    Ok((StatusCode::CREATED, Json(application)).into_response())
}

/// PUT /applications/{id}/status
pub async fn review_application(
    State(state): State<AppState>,
    Actor(actor): Actor,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ApplicationDecision>, JsonRejection>,
) -> Result<Json<ApplicationRecord>, PawprintError> {
    let id = path_id(path)?;
    let decision = body(payload)?;
    Ok(Json(
        state
            .catalog
            .set_application_status(&actor, &id, decision.status)
            .await?,
    ))
}

/// GET /users/{id}/applications
pub async fn list_user_applications(
    State(state): State<AppState>,
    Actor(actor): Actor,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<ApplicationRecord>>, PawprintError> {
    let user_id = path_id(path)?;
    Ok(Json(
        state.catalog.applications_for_user(&actor, &user_id).await?,
    ))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
