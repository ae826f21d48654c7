//! Listing endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use ojt_common::AppResult;
use ojt_core::{CreateListingInput, ListingQuery, ListingView, UpdateListingInput, today};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Browse listings visible to the caller.
async fn list(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> AppResult<ApiResponse<Vec<ListingView>>> {
    let listings = state
        .listing_service
        .list(viewer.as_ref(), query, today())
        .await?;
    Ok(ApiResponse::ok(listings))
}

/// Create a listing as a company.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateListingInput>,
) -> AppResult<ApiResponse<ListingView>> {
    let today = today();
    let listing = state.listing_service.create(&user, input, today).await?;
    Ok(ApiResponse::created(ListingView::new(
        listing,
        Some(&user),
        today,
    )))
}

async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ListingView>> {
    let listing = state
        .listing_service
        .get(viewer.as_ref(), &id, today())
        .await?;
    Ok(ApiResponse::ok(listing))
}

/// Partially update one of the caller's listings.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateListingInput>,
) -> AppResult<ApiResponse<ListingView>> {
    let today = today();
    let listing = state
        .listing_service
        .update(&user, &id, input, today)
        .await?;
    Ok(ApiResponse::ok(ListingView::new(listing, Some(&user), today)))
}

async fn destroy(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.listing_service.delete(&user, &id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).patch(update).delete(destroy))
}
