use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::CharacterModel,
    repository::CharacterRepository,
    types::{
        CampaignRef, CharacterSheet, CharacterWithOwner, CreateCharacterRequest,
        DeleteCharacterResponse, UpdateCharacterRequest,
    },
};
use crate::campaign::repository::CampaignRepository;
use crate::shared::{non_empty, AppError};
use crate::user::UserRepository;

const NOT_A_MEMBER: &str = "You are not a member of this campaign";

/// Service for character sheets. Authorization rides on campaign membership.
pub struct CharacterService {
    characters: Arc<dyn CharacterRepository + Send + Sync>,
    campaigns: Arc<dyn CampaignRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
}

impl CharacterService {
    pub fn new(
        characters: Arc<dyn CharacterRepository + Send + Sync>,
        campaigns: Arc<dyn CampaignRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            characters,
            campaigns,
            users,
        }
    }

    #[instrument(skip(self, request))]
    pub async fn create_character(
        &self,
        user_id: &str,
        request: CreateCharacterRequest,
    ) -> Result<CharacterModel, AppError> {
        let (campaign_id, name, class) = match (
            non_empty(&request.campaign_id),
            non_empty(&request.name),
            non_empty(&request.class),
        ) {
            (Some(campaign_id), Some(name), Some(class)) => (campaign_id, name, class),
            _ => {
                return Err(AppError::BadRequest(
                    "campaignId, name and class are required".to_string(),
                ))
            }
        };

        self.ensure_member(campaign_id, user_id).await?;

        let character = CharacterModel::new(
            user_id.to_string(),
            campaign_id.to_string(),
            name.to_string(),
            class.to_string(),
            request.attributes.unwrap_or_default(),
        );
        self.characters.create_character(&character).await?;

        info!(character_id = %character.id, campaign_id = %campaign_id, "Character created");

        Ok(character)
    }

    #[instrument(skip(self))]
    pub async fn get_character(
        &self,
        user_id: &str,
        character_id: &str,
    ) -> Result<CharacterSheet, AppError> {
        let character = self.load_character(character_id).await?;
        self.ensure_member(&character.campaign_id, user_id).await?;

        let user = self
            .users
            .get_user(&character.user_id)
            .await?
            .map(|u| u.summary());
        let campaign = self
            .campaigns
            .get_campaign(&character.campaign_id)
            .await?
            .map(|c| CampaignRef {
                id: c.id,
                name: c.name,
                system: c.system,
            });

        Ok(CharacterSheet {
            character,
            user,
            campaign,
        })
    }

    /// Applies a partial update. The owner or a MASTER of the campaign may edit.
    #[instrument(skip(self, request))]
    pub async fn update_character(
        &self,
        user_id: &str,
        character_id: &str,
        request: UpdateCharacterRequest,
    ) -> Result<CharacterModel, AppError> {
        let mut character = self.load_character(character_id).await?;

        if character.user_id != user_id {
            let is_master = self
                .campaigns
                .get_membership(&character.campaign_id, user_id)
                .await?
                .is_some_and(|m| m.is_master());
            if !is_master {
                return Err(AppError::Forbidden(
                    "Only the owner or the master can edit this character".to_string(),
                ));
            }
        }

        if let Some(name) = non_empty(&request.name) {
            character.name = name.to_string();
        }
        if let Some(class) = non_empty(&request.class) {
            character.class = class.to_string();
        }
        let patch = request.attributes;
        let attributes = &mut character.attributes;
        attributes.agility = patch.agility.unwrap_or(attributes.agility);
        attributes.strength = patch.strength.unwrap_or(attributes.strength);
        attributes.intellect = patch.intellect.unwrap_or(attributes.intellect);
        attributes.presence = patch.presence.unwrap_or(attributes.presence);
        attributes.vigor = patch.vigor.unwrap_or(attributes.vigor);

        character.pv = request.pv.unwrap_or(character.pv);
        character.pv_max = request.pv_max.unwrap_or(character.pv_max);
        character.san = request.san.unwrap_or(character.san);
        character.san_max = request.san_max.unwrap_or(character.san_max);
        character.pe = request.pe.unwrap_or(character.pe);
        character.pe_max = request.pe_max.unwrap_or(character.pe_max);
        character.nex = request.nex.unwrap_or(character.nex);

        character.touch();
        self.characters.update_character(&character).await?;

        info!(character_id = %character_id, "Character updated");

        Ok(character)
    }

    #[instrument(skip(self))]
    pub async fn delete_character(
        &self,
        user_id: &str,
        character_id: &str,
    ) -> Result<DeleteCharacterResponse, AppError> {
        let character = self.load_character(character_id).await?;

        if character.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the owner can delete this character".to_string(),
            ));
        }

        self.characters.delete_character(character_id).await?;

        info!(character_id = %character_id, "Character deleted");

        Ok(DeleteCharacterResponse {
            message: "Character deleted successfully".to_string(),
        })
    }

    #[instrument(skip(self))]
    pub async fn list_campaign_characters(
        &self,
        user_id: &str,
        campaign_id: &str,
    ) -> Result<Vec<CharacterWithOwner>, AppError> {
        self.ensure_member(campaign_id, user_id).await?;

        let characters = self.characters.list_by_campaign(campaign_id).await?;
        let ids: Vec<String> = characters.iter().map(|c| c.user_id.clone()).collect();
        let owners = self.users.get_users(&ids).await?;

        Ok(characters
            .into_iter()
            .map(|character| {
                let user = owners
                    .iter()
                    .find(|u| u.id == character.user_id)
                    .map(|u| u.summary());
                CharacterWithOwner { character, user }
            })
            .collect())
    }

    async fn ensure_member(&self, campaign_id: &str, user_id: &str) -> Result<(), AppError> {
        match self.campaigns.get_membership(campaign_id, user_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::Forbidden(NOT_A_MEMBER.to_string())),
        }
    }

    async fn load_character(&self, character_id: &str) -> Result<CharacterModel, AppError> {
        self.characters
            .get_character(character_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Character not found".to_string()))
    }
}
