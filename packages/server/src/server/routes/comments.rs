use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::common::{CommentId, ParcelId};
use crate::domains::comments::activities::{
    create_comment, list_ranked_comments, vote_comment, CreateCommentInput, RankedComment,
    VoteInput,
};
use crate::domains::comments::Comment;
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsQuery {
    parcel_id: Option<String>,
}

/// GET /comments?parcelId= - a parcel's comments, best first
pub async fn list_comments(
    Extension(state): Extension<AppState>,
    query: Result<Query<ListCommentsQuery>, QueryRejection>,
) -> Result<Json<Vec<RankedComment>>, ApiError> {
    let Query(query) = query?;
    let raw = query
        .parcel_id
        .ok_or_else(|| ApiError::Validation("parcelId is required".into()))?;
    let parcel_id = ParcelId::parse(&raw)
        .map_err(|e| ApiError::Validation(format!("Invalid parcelId: {}", e)))?;

    let comments = list_ranked_comments(parcel_id, &state.db_pool).await?;
    Ok(Json(comments))
}

/// POST /comments - create, then invalidate the parcel's cached summaries
pub async fn create_comment_handler(
    Extension(state): Extension<AppState>,
    body: Result<Json<CreateCommentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let Json(input) = body?;
    let comment = create_comment(
        &input,
        state.deps.summary_cache.as_ref(),
        &state.db_pool,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH /comments/:id/vote - atomic increment of one counter
pub async fn vote_comment_handler(
    Extension(state): Extension<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<VoteInput>, JsonRejection>,
) -> Result<Json<Comment>, ApiError> {
    let Path(raw_id) = path?;
    let comment_id = CommentId::parse(&raw_id)
        .map_err(|e| ApiError::Validation(format!("Invalid comment id: {}", e)))?;
    let Json(input) = body?;

    let comment = vote_comment(comment_id, &input, &state.db_pool).await?;
    Ok(Json(comment))
}
