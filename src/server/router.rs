//! Router builder for cat routes

use super::handlers::{
    AppState, apply_for_cat, create_cat, delete_cat, get_cat, health, list_cats,
    list_user_applications, review_application, search_cats, update_cat_status,
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Build the catalogue routes
///
/// - GET /health - Liveness
/// - POST /cats/search - Filtered, keyset-paginated search
/// - GET /cats - List every cat
/// - POST /cats - Upload a cat (admin)
/// - GET /cats/{id} - Get one cat
/// - DELETE /cats/{id} - Delete a cat (owner or admin, no pending applications)
/// - PUT /cats/{id}/status - Change lifecycle state (owner or admin)
/// - POST /cats/{id}/applications - Apply to adopt (signed in)
/// - PUT /applications/{id}/status - Approve or reject (cat owner or admin)
/// - GET /users/{id}/applications - A user's applications (that user or admin)
pub fn build_cat_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cats/search", post(search_cats))
        .route("/cats", get(list_cats).post(create_cat))
        .route("/cats/{id}", get(get_cat).delete(delete_cat))
        .route("/cats/{id}/status", put(update_cat_status))
        .route("/cats/{id}/applications", post(apply_for_cat))
        .route("/applications/{id}/status", put(review_application))
        .route("/users/{id}/applications", get(list_user_applications))
        .with_state(state)
}
