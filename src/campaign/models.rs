use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

pub const DEFAULT_SYSTEM: &str = "Ordem Paranormal";

/// Lifecycle of a campaign. ENDED doubles as the archived (soft deleted) state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Active,
    Paused,
    Ended,
}

/// Membership role controlling campaign edit rights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Master,
    Player,
    Observer,
}

/// Database model for campaigns table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampaignModel {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub system: String,
    pub status: CampaignStatus,
    // Free-form templates authored in the campaign wizard
    pub items: Value,
    pub abilities: Value,
    pub npcs: Value,
    pub creatures: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CampaignModel {
    pub fn new(
        name: String,
        description: Option<String>,
        cover_image: Option<String>,
        system: Option<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            cover_image,
            system: system.unwrap_or_else(|| DEFAULT_SYSTEM.to_string()),
            status: CampaignStatus::Active,
            items: Value::Array(vec![]),
            abilities: Value::Array(vec![]),
            npcs: Value::Array(vec![]),
            creatures: Value::Array(vec![]),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Database model for campaign_members table, unique per (campaign_id, user_id)
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignMemberModel {
    pub campaign_id: String,
    pub user_id: String,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

impl CampaignMemberModel {
    pub fn new(campaign_id: String, user_id: String, role: MemberRole) -> Self {
        Self {
            campaign_id,
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }

    pub fn is_master(&self) -> bool {
        self.role == MemberRole::Master
    }
}
