use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Query,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::ParcelId;
use crate::domains::parcels::models::Parcel;
use crate::domains::summaries::activities::{clamp_top_k, gather_comments, SummaryRequest};
use crate::domains::summaries::models::{DebugInfo, SummaryMode, SummaryPayload};
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// Validated summary request parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryParams {
    pub parcel_id: ParcelId,
    pub mode: SummaryMode,
    pub top_k: usize,
    pub debug: bool,
    pub mock: bool,
}

/// GET form: everything arrives as text
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    parcel_id: Option<String>,
    mode: Option<String>,
    top_k: Option<String>,
    debug: Option<String>,
    mock: Option<String>,
}

/// POST form: JSON body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryBody {
    parcel_id: Option<i64>,
    mode: Option<SummaryMode>,
    top_k: Option<i64>,
    #[serde(default)]
    debug: bool,
    #[serde(default)]
    mock: bool,
}

fn parse_mode(raw: Option<&str>) -> Result<SummaryMode, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(SummaryMode::default()),
        Some("narrative") => Ok(SummaryMode::Narrative),
        Some("structured") => Ok(SummaryMode::Structured),
        Some(other) => Err(ApiError::Validation(format!(
            "mode must be 'narrative' or 'structured', got '{}'",
            other
        ))),
    }
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some("true") | Some("1"))
}

fn required_parcel_id(raw: Option<i64>) -> Result<ParcelId, ApiError> {
    let value = raw.ok_or_else(|| ApiError::Validation("parcelId is required".into()))?;
    ParcelId::checked(value).map_err(|e| ApiError::Validation(format!("Invalid parcelId: {}", e)))
}

impl TryFrom<SummaryQuery> for SummaryParams {
    type Error = ApiError;

    fn try_from(query: SummaryQuery) -> Result<Self, Self::Error> {
        let parcel_id = match query.parcel_id.as_deref() {
            Some(raw) => ParcelId::parse(raw)
                .map_err(|e| ApiError::Validation(format!("Invalid parcelId: {}", e)))?,
            None => return Err(ApiError::Validation("parcelId is required".into())),
        };

        let top_k = query
            .top_k
            .as_deref()
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| ApiError::Validation(format!("Invalid topK: {}", raw)))
            })
            .transpose()?;

        Ok(SummaryParams {
            parcel_id,
            mode: parse_mode(query.mode.as_deref())?,
            top_k: clamp_top_k(top_k),
            debug: parse_flag(query.debug.as_deref()),
            mock: parse_flag(query.mock.as_deref()),
        })
    }
}

impl TryFrom<SummaryBody> for SummaryParams {
    type Error = ApiError;

    fn try_from(body: SummaryBody) -> Result<Self, Self::Error> {
        Ok(SummaryParams {
            parcel_id: required_parcel_id(body.parcel_id)?,
            mode: body.mode.unwrap_or_default(),
            top_k: clamp_top_k(body.top_k),
            debug: body.debug,
            mock: body.mock,
        })
    }
}

/// The payload, flattened, with `_debug` only on request
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub payload: SummaryPayload,
    #[serde(rename = "_debug", skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

/// GET /comments/summary
pub async fn summary_get_handler(
    Extension(state): Extension<AppState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let Query(query) = query?;
    summarize(&state, SummaryParams::try_from(query)?).await
}

/// POST /comments/summary
pub async fn summary_post_handler(
    Extension(state): Extension<AppState>,
    body: Result<Json<SummaryBody>, JsonRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let Json(body) = body?;
    summarize(&state, SummaryParams::try_from(body)?).await
}

async fn summarize(
    state: &AppState,
    params: SummaryParams,
) -> Result<Json<SummaryResponse>, ApiError> {
    let pool = &state.db_pool;

    let parcel = Parcel::find_by_id(params.parcel_id, pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Parcel {} not found", params.parcel_id)))?;

    let gathered = gather_comments(parcel.id, state.deps.summary.max_comments, pool).await?;
    let texts = gathered.texts();
    let service = state.deps.summary_service();

    let outcome = if params.mock && params.mode == SummaryMode::Structured {
        service.mock(&texts, params.top_k)
    } else {
        let request = SummaryRequest::builder()
            .parcel_id(parcel.id)
            .address(parcel.address.clone())
            .mode(params.mode)
            .comments(texts)
            .fingerprint(gathered.fingerprint())
            .top_k(params.top_k)
            .build();
        service.summarize(request).await
    };

    Ok(Json(SummaryResponse {
        payload: outcome.payload,
        debug: params.debug.then_some(outcome.debug),
    }))
}
