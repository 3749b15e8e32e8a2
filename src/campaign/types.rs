use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::models::{CampaignMemberModel, CampaignModel, MemberRole};
use crate::character::types::CharacterWithOwner;
use crate::shared::double_option;
use crate::user::UserSummary;

/// Request payload for creating a campaign
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub system: Option<String>,
}

/// Partial update of a campaign.
///
/// `description` and `coverImage` distinguish an absent field (keep) from an
/// explicit `null` (clear). Template arrays are replaced wholesale when present.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover_image: Option<Option<String>>,
    pub system: Option<String>,
    pub status: Option<String>,
    pub items: Option<Value>,
    pub abilities: Option<Value>,
    pub npcs: Option<Value>,
    pub creatures: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddMemberRequest {
    pub username: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub user_id: String,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    pub user: Option<UserSummary>,
}

impl MemberView {
    pub fn new(member: &CampaignMemberModel, user: Option<UserSummary>) -> Self {
        Self {
            user_id: member.user_id.clone(),
            role: member.role,
            joined_at: member.joined_at,
            user,
        }
    }
}

/// Campaign with its members, returned on create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignWithMembers {
    #[serde(flatten)]
    pub campaign: CampaignModel,
    pub members: Vec<MemberView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterCount {
    pub characters: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailCounts {
    pub characters: usize,
    pub members: usize,
}

/// Entry of the campaign listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    #[serde(flatten)]
    pub campaign: CampaignModel,
    pub members: Vec<MemberView>,
    #[serde(rename = "_count")]
    pub count: CharacterCount,
    pub my_role: MemberRole,
}

/// Full campaign view for a member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDetails {
    #[serde(flatten)]
    pub campaign: CampaignModel,
    pub members: Vec<MemberView>,
    pub characters: Vec<CharacterWithOwner>,
    #[serde(rename = "_count")]
    pub count: DetailCounts,
    pub my_role: MemberRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignListResponse {
    pub as_master: Vec<CampaignSummary>,
    pub as_player: Vec<CampaignSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveResponse {
    pub message: String,
    pub campaign: CampaignModel,
}
