use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::instrument;

use super::types::{
    AddMemberRequest, ArchiveResponse, CampaignDetails, CampaignListResponse,
    CampaignWithMembers, CreateCampaignRequest, MemberView, UpdateCampaignRequest,
};
use crate::auth::AuthClaims;
use crate::shared::{AppError, AppState};

/// POST /api/campaigns
#[instrument(name = "create_campaign", skip(state, claims, request), fields(user_id = %claims.id))]
pub async fn create_campaign(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Json(request): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<CampaignWithMembers>), AppError> {
    let campaign = state
        .campaign_service
        .create_campaign(&claims.id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

/// GET /api/campaigns
#[instrument(name = "list_campaigns", skip(state, claims), fields(user_id = %claims.id))]
pub async fn list_campaigns(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
) -> Result<Json<CampaignListResponse>, AppError> {
    let campaigns = state.campaign_service.list_campaigns(&claims.id).await?;
    Ok(Json(campaigns))
}

/// GET /api/campaigns/:id
#[instrument(name = "get_campaign", skip(state, claims), fields(user_id = %claims.id))]
pub async fn get_campaign(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(campaign_id): Path<String>,
) -> Result<Json<CampaignDetails>, AppError> {
    let campaign = state
        .campaign_service
        .get_campaign(&claims.id, &campaign_id)
        .await?;
    Ok(Json(campaign))
}

/// PUT /api/campaigns/:id
#[instrument(name = "update_campaign", skip(state, claims, request), fields(user_id = %claims.id))]
pub async fn update_campaign(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(campaign_id): Path<String>,
    Json(request): Json<UpdateCampaignRequest>,
) -> Result<Json<CampaignWithMembers>, AppError> {
    let campaign = state
        .campaign_service
        .update_campaign(&claims.id, &campaign_id, request)
        .await?;
    Ok(Json(campaign))
}

/// DELETE /api/campaigns/:id
///
/// Archives rather than deletes.
#[instrument(name = "archive_campaign", skip(state, claims), fields(user_id = %claims.id))]
pub async fn archive_campaign(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(campaign_id): Path<String>,
) -> Result<Json<ArchiveResponse>, AppError> {
    let response = state
        .campaign_service
        .archive_campaign(&claims.id, &campaign_id)
        .await?;
    Ok(Json(response))
}

/// POST /api/campaigns/:id/members
#[instrument(name = "add_member", skip(state, claims, request), fields(user_id = %claims.id))]
pub async fn add_member(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(campaign_id): Path<String>,
    Json(request): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberView>), AppError> {
    let member = state
        .campaign_service
        .add_member(&claims.id, &campaign_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}
