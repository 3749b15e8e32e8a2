use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::instrument;

use super::{
    models::CharacterModel,
    types::{
        CharacterSheet, CharacterWithOwner, CreateCharacterRequest, DeleteCharacterResponse,
        UpdateCharacterRequest,
    },
};
use crate::auth::AuthClaims;
use crate::shared::{AppError, AppState};

/// POST /api/characters
#[instrument(name = "create_character", skip(state, claims, request), fields(user_id = %claims.id))]
pub async fn create_character(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Json(request): Json<CreateCharacterRequest>,
) -> Result<(StatusCode, Json<CharacterModel>), AppError> {
    let character = state
        .character_service
        .create_character(&claims.id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(character)))
}

/// GET /api/characters/:id
#[instrument(name = "get_character", skip(state, claims), fields(user_id = %claims.id))]
pub async fn get_character(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(character_id): Path<String>,
) -> Result<Json<CharacterSheet>, AppError> {
    let sheet = state
        .character_service
        .get_character(&claims.id, &character_id)
        .await?;
    Ok(Json(sheet))
}

/// PUT /api/characters/:id
#[instrument(name = "update_character", skip(state, claims, request), fields(user_id = %claims.id))]
pub async fn update_character(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(character_id): Path<String>,
    Json(request): Json<UpdateCharacterRequest>,
) -> Result<Json<CharacterModel>, AppError> {
    let character = state
        .character_service
        .update_character(&claims.id, &character_id, request)
        .await?;
    Ok(Json(character))
}

/// DELETE /api/characters/:id
#[instrument(name = "delete_character", skip(state, claims), fields(user_id = %claims.id))]
pub async fn delete_character(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(character_id): Path<String>,
) -> Result<Json<DeleteCharacterResponse>, AppError> {
    let response = state
        .character_service
        .delete_character(&claims.id, &character_id)
        .await?;
    Ok(Json(response))
}

/// GET /api/characters/campaign/:campaign_id
#[instrument(name = "list_campaign_characters", skip(state, claims), fields(user_id = %claims.id))]
pub async fn list_campaign_characters(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(campaign_id): Path<String>,
) -> Result<Json<Vec<CharacterWithOwner>>, AppError> {
    let characters = state
        .character_service
        .list_campaign_characters(&claims.id, &campaign_id)
        .await?;
    Ok(Json(characters))
}
