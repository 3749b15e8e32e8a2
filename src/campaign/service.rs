use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{CampaignMemberModel, CampaignModel, CampaignStatus, MemberRole},
    repository::{CampaignRepository, ALREADY_MEMBER},
    types::{
        AddMemberRequest, ArchiveResponse, CampaignDetails, CampaignListResponse,
        CampaignSummary, CampaignWithMembers, CharacterCount, CreateCampaignRequest,
        DetailCounts, MemberView, UpdateCampaignRequest,
    },
};
use crate::character::{
    models::CharacterModel, repository::CharacterRepository, types::CharacterWithOwner,
};
use crate::shared::{non_empty, AppError};
use crate::user::{UserRepository, UserSummary};

const NOT_A_MEMBER: &str = "You are not a member of this campaign";
const MASTER_ONLY: &str = "Only the master can perform this action";

/// Service for campaign management and membership checks
pub struct CampaignService {
    campaigns: Arc<dyn CampaignRepository + Send + Sync>,
    characters: Arc<dyn CharacterRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
}

impl CampaignService {
    pub fn new(
        campaigns: Arc<dyn CampaignRepository + Send + Sync>,
        characters: Arc<dyn CharacterRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            campaigns,
            characters,
            users,
        }
    }

    /// Creates a campaign with the caller as its MASTER
    #[instrument(skip(self, request))]
    pub async fn create_campaign(
        &self,
        user_id: &str,
        request: CreateCampaignRequest,
    ) -> Result<CampaignWithMembers, AppError> {
        let name = non_empty(&request.name)
            .ok_or_else(|| AppError::BadRequest("Campaign name is required".to_string()))?
            .to_string();

        let campaign = CampaignModel::new(
            name,
            request.description,
            request.cover_image,
            non_empty(&request.system).map(str::to_string),
        );
        let master =
            CampaignMemberModel::new(campaign.id.clone(), user_id.to_string(), MemberRole::Master);

        self.campaigns.create_campaign(&campaign, &master).await?;

        info!(campaign_id = %campaign.id, "Campaign created");

        let members = self.member_views(&campaign.id).await?;
        Ok(CampaignWithMembers { campaign, members })
    }

    /// Lists every campaign the user belongs to, split by role
    #[instrument(skip(self))]
    pub async fn list_campaigns(&self, user_id: &str) -> Result<CampaignListResponse, AppError> {
        let memberships = self.campaigns.list_memberships_for_user(user_id).await?;

        let mut response = CampaignListResponse {
            as_master: Vec::new(),
            as_player: Vec::new(),
        };

        for membership in memberships {
            let Some(campaign) = self.campaigns.get_campaign(&membership.campaign_id).await? else {
                warn!(campaign_id = %membership.campaign_id, "Membership points at missing campaign");
                continue;
            };

            let members = self.member_views(&campaign.id).await?;
            let characters = self.characters.count_by_campaign(&campaign.id).await?;
            let summary = CampaignSummary {
                campaign,
                members,
                count: CharacterCount { characters },
                my_role: membership.role,
            };

            match membership.role {
                MemberRole::Master => response.as_master.push(summary),
                MemberRole::Player | MemberRole::Observer => response.as_player.push(summary),
            }
        }

        debug!(
            as_master = response.as_master.len(),
            as_player = response.as_player.len(),
            "Listed campaigns"
        );

        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn get_campaign(
        &self,
        user_id: &str,
        campaign_id: &str,
    ) -> Result<CampaignDetails, AppError> {
        let membership = self.require_membership(campaign_id, user_id).await?;
        let campaign = self.load_campaign(campaign_id).await?;

        let members = self.member_views(campaign_id).await?;
        let characters = self.characters.list_by_campaign(campaign_id).await?;
        let characters = self.attach_owners(characters).await?;

        let count = DetailCounts {
            characters: characters.len(),
            members: members.len(),
        };

        Ok(CampaignDetails {
            campaign,
            members,
            characters,
            count,
            my_role: membership.role,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update_campaign(
        &self,
        user_id: &str,
        campaign_id: &str,
        request: UpdateCampaignRequest,
    ) -> Result<CampaignWithMembers, AppError> {
        self.require_master(campaign_id, user_id).await?;
        let mut campaign = self.load_campaign(campaign_id).await?;

        if let Some(name) = non_empty(&request.name) {
            campaign.name = name.to_string();
        }
        if let Some(system) = non_empty(&request.system) {
            campaign.system = system.to_string();
        }
        if let Some(description) = request.description {
            campaign.description = description;
        }
        if let Some(cover_image) = request.cover_image {
            campaign.cover_image = cover_image;
        }
        if let Some(status) = request.status {
            campaign.status = CampaignStatus::from_str(&status)
                .map_err(|_| AppError::BadRequest(format!("Invalid campaign status: {status}")))?;
        }
        if let Some(items) = request.items {
            campaign.items = items;
        }
        if let Some(abilities) = request.abilities {
            campaign.abilities = abilities;
        }
        if let Some(npcs) = request.npcs {
            campaign.npcs = npcs;
        }
        if let Some(creatures) = request.creatures {
            campaign.creatures = creatures;
        }

        campaign.touch();
        self.campaigns.update_campaign(&campaign).await?;

        info!(campaign_id = %campaign_id, status = %campaign.status, "Campaign updated");

        let members = self.member_views(campaign_id).await?;
        Ok(CampaignWithMembers { campaign, members })
    }

    /// Soft delete: the campaign stays readable with status ENDED
    #[instrument(skip(self))]
    pub async fn archive_campaign(
        &self,
        user_id: &str,
        campaign_id: &str,
    ) -> Result<ArchiveResponse, AppError> {
        self.require_master(campaign_id, user_id).await?;
        let mut campaign = self.load_campaign(campaign_id).await?;

        campaign.status = CampaignStatus::Ended;
        campaign.touch();
        self.campaigns.update_campaign(&campaign).await?;

        info!(campaign_id = %campaign_id, "Campaign archived");

        Ok(ArchiveResponse {
            message: "Campaign archived successfully".to_string(),
            campaign,
        })
    }

    /// Adds an existing user to the campaign as PLAYER or OBSERVER
    #[instrument(skip(self, request))]
    pub async fn add_member(
        &self,
        user_id: &str,
        campaign_id: &str,
        request: AddMemberRequest,
    ) -> Result<MemberView, AppError> {
        self.require_master(campaign_id, user_id).await?;

        let username = non_empty(&request.username)
            .ok_or_else(|| AppError::BadRequest("Username is required".to_string()))?;

        let role = match request.role.as_deref() {
            None => MemberRole::Player,
            Some(raw) => match MemberRole::from_str(raw) {
                Ok(role @ (MemberRole::Player | MemberRole::Observer)) => role,
                _ => {
                    return Err(AppError::BadRequest(format!(
                        "Invalid member role: {raw}"
                    )))
                }
            },
        };

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if self
            .campaigns
            .get_membership(campaign_id, &user.id)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(ALREADY_MEMBER.to_string()));
        }

        let member = CampaignMemberModel::new(campaign_id.to_string(), user.id.clone(), role);
        self.campaigns.add_member(&member).await?;

        info!(campaign_id = %campaign_id, member_id = %user.id, role = %role, "Member added");

        Ok(MemberView::new(&member, Some(user.summary())))
    }

    /// Returns the caller's membership or 403. Unknown campaigns are also 403.
    pub async fn require_membership(
        &self,
        campaign_id: &str,
        user_id: &str,
    ) -> Result<CampaignMemberModel, AppError> {
        self.campaigns
            .get_membership(campaign_id, user_id)
            .await?
            .ok_or_else(|| {
                debug!(campaign_id = %campaign_id, user_id = %user_id, "Membership check failed");
                AppError::Forbidden(NOT_A_MEMBER.to_string())
            })
    }

    async fn require_master(&self, campaign_id: &str, user_id: &str) -> Result<(), AppError> {
        let membership = self
            .campaigns
            .get_membership(campaign_id, user_id)
            .await?;

        match membership {
            Some(member) if member.is_master() => Ok(()),
            _ => Err(AppError::Forbidden(MASTER_ONLY.to_string())),
        }
    }

    async fn load_campaign(&self, campaign_id: &str) -> Result<CampaignModel, AppError> {
        self.campaigns
            .get_campaign(campaign_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))
    }

    async fn member_views(&self, campaign_id: &str) -> Result<Vec<MemberView>, AppError> {
        let members = self.campaigns.list_members(campaign_id).await?;
        let ids: Vec<String> = members.iter().map(|m| m.user_id.clone()).collect();
        let users = self.summaries(&ids).await?;

        Ok(members
            .iter()
            .map(|m| MemberView::new(m, users.get(&m.user_id).cloned()))
            .collect())
    }

    /// Pairs characters with their owners' public profiles
    pub async fn attach_owners(
        &self,
        characters: Vec<CharacterModel>,
    ) -> Result<Vec<CharacterWithOwner>, AppError> {
        let ids: Vec<String> = characters.iter().map(|c| c.user_id.clone()).collect();
        let users = self.summaries(&ids).await?;

        Ok(characters
            .into_iter()
            .map(|character| {
                let user = users.get(&character.user_id).cloned();
                CharacterWithOwner { character, user }
            })
            .collect())
    }

    async fn summaries(&self, ids: &[String]) -> Result<HashMap<String, UserSummary>, AppError> {
        let users = self.users.get_users(ids).await?;
        Ok(users.into_iter().map(|u| (u.id.clone(), u.summary())).collect())
    }
}
