use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::models::{CampaignMemberModel, CampaignModel, CampaignStatus, MemberRole};
use crate::shared::{map_unique_violation, AppError};

pub const ALREADY_MEMBER: &str = "User is already a member of this campaign";

/// Trait for campaign and membership repository operations
#[async_trait]
pub trait CampaignRepository {
    /// Atomically stores a campaign together with its creator's membership
    async fn create_campaign(
        &self,
        campaign: &CampaignModel,
        master: &CampaignMemberModel,
    ) -> Result<(), AppError>;
    async fn get_campaign(&self, campaign_id: &str) -> Result<Option<CampaignModel>, AppError>;
    async fn update_campaign(&self, campaign: &CampaignModel) -> Result<(), AppError>;
    async fn get_membership(
        &self,
        campaign_id: &str,
        user_id: &str,
    ) -> Result<Option<CampaignMemberModel>, AppError>;
    async fn add_member(&self, member: &CampaignMemberModel) -> Result<(), AppError>;
    async fn list_members(&self, campaign_id: &str) -> Result<Vec<CampaignMemberModel>, AppError>;
    async fn list_memberships_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<CampaignMemberModel>, AppError>;
}

#[derive(Default)]
struct CampaignStore {
    campaigns: HashMap<String, CampaignModel>,
    // (campaign_id, user_id) -> membership
    members: HashMap<(String, String), CampaignMemberModel>,
}

/// In-memory implementation of CampaignRepository for development and testing
pub struct InMemoryCampaignRepository {
    store: Mutex<CampaignStore>,
}

impl Default for InMemoryCampaignRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCampaignRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(CampaignStore::default()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CampaignStore>, AppError> {
        self.store.lock().map_err(|_| AppError::Internal)
    }
}

#[async_trait]
impl CampaignRepository for InMemoryCampaignRepository {
    #[instrument(skip(self, campaign, master))]
    async fn create_campaign(
        &self,
        campaign: &CampaignModel,
        master: &CampaignMemberModel,
    ) -> Result<(), AppError> {
        debug!(campaign_id = %campaign.id, "Creating campaign in memory");

        let mut store = self.lock()?;
        if store.campaigns.contains_key(&campaign.id) {
            warn!(campaign_id = %campaign.id, "Campaign already exists in memory");
            return Err(AppError::DatabaseError(
                "Campaign already exists".to_string(),
            ));
        }

        store
            .campaigns
            .insert(campaign.id.clone(), campaign.clone());
        store.members.insert(
            (master.campaign_id.clone(), master.user_id.clone()),
            master.clone(),
        );

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_campaign(&self, campaign_id: &str) -> Result<Option<CampaignModel>, AppError> {
        Ok(self.lock()?.campaigns.get(campaign_id).cloned())
    }

    #[instrument(skip(self, campaign))]
    async fn update_campaign(&self, campaign: &CampaignModel) -> Result<(), AppError> {
        let mut store = self.lock()?;
        match store.campaigns.get_mut(&campaign.id) {
            Some(existing) => {
                *existing = campaign.clone();
                Ok(())
            }
            None => {
                warn!(campaign_id = %campaign.id, "Campaign not found for update in memory");
                Err(AppError::NotFound("Campaign not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_membership(
        &self,
        campaign_id: &str,
        user_id: &str,
    ) -> Result<Option<CampaignMemberModel>, AppError> {
        let store = self.lock()?;
        Ok(store
            .members
            .get(&(campaign_id.to_string(), user_id.to_string()))
            .cloned())
    }

    #[instrument(skip(self, member))]
    async fn add_member(&self, member: &CampaignMemberModel) -> Result<(), AppError> {
        let mut store = self.lock()?;
        let key = (member.campaign_id.clone(), member.user_id.clone());
        if store.members.contains_key(&key) {
            warn!(
                campaign_id = %member.campaign_id,
                user_id = %member.user_id,
                "Membership already exists in memory"
            );
            return Err(AppError::BadRequest(ALREADY_MEMBER.to_string()));
        }
        store.members.insert(key, member.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_members(&self, campaign_id: &str) -> Result<Vec<CampaignMemberModel>, AppError> {
        let store = self.lock()?;
        let mut members: Vec<_> = store
            .members
            .values()
            .filter(|m| m.campaign_id == campaign_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.joined_at);
        Ok(members)
    }

    #[instrument(skip(self))]
    async fn list_memberships_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<CampaignMemberModel>, AppError> {
        let store = self.lock()?;
        let mut memberships: Vec<_> = store
            .members
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        memberships.sort_by_key(|m| m.joined_at);
        Ok(memberships)
    }
}

/// PostgreSQL implementation of campaign repository
pub struct PostgresCampaignRepository {
    pool: PgPool,
}

impl PostgresCampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CAMPAIGN_COLUMNS: &str = "id, name, description, cover_image, system, status, \
     items, abilities, npcs, creatures, created_at, updated_at";

fn campaign_from_row(row: &PgRow) -> Result<CampaignModel, AppError> {
    let status: String = row.get("status");
    let status = CampaignStatus::from_str(&status)
        .map_err(|_| AppError::DatabaseError(format!("Unknown campaign status {}", status)))?;

    Ok(CampaignModel {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        cover_image: row.get("cover_image"),
        system: row.get("system"),
        status,
        items: row.get::<Value, _>("items"),
        abilities: row.get::<Value, _>("abilities"),
        npcs: row.get::<Value, _>("npcs"),
        creatures: row.get::<Value, _>("creatures"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn member_from_row(row: &PgRow) -> Result<CampaignMemberModel, AppError> {
    let role: String = row.get("role");
    let role = MemberRole::from_str(&role)
        .map_err(|_| AppError::DatabaseError(format!("Unknown member role {}", role)))?;

    Ok(CampaignMemberModel {
        campaign_id: row.get("campaign_id"),
        user_id: row.get("user_id"),
        role,
        joined_at: row.get("joined_at"),
    })
}

#[async_trait]
impl CampaignRepository for PostgresCampaignRepository {
    #[instrument(skip(self, campaign, master))]
    async fn create_campaign(
        &self,
        campaign: &CampaignModel,
        master: &CampaignMemberModel,
    ) -> Result<(), AppError> {
        debug!(campaign_id = %campaign.id, "Creating campaign in database");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO campaigns (id, name, description, cover_image, system, status, \
             items, abilities, npcs, creatures, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&campaign.id)
        .bind(&campaign.name)
        .bind(&campaign.description)
        .bind(&campaign.cover_image)
        .bind(&campaign.system)
        .bind(campaign.status.to_string())
        .bind(&campaign.items)
        .bind(&campaign.abilities)
        .bind(&campaign.npcs)
        .bind(&campaign.creatures)
        .bind(campaign.created_at)
        .bind(campaign.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert campaign");
            AppError::DatabaseError(e.to_string())
        })?;

        sqlx::query(
            "INSERT INTO campaign_members (campaign_id, user_id, role, joined_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&master.campaign_id)
        .bind(&master.user_id)
        .bind(master.role.to_string())
        .bind(master.joined_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert master membership");
            AppError::DatabaseError(e.to_string())
        })?;

        tx.commit().await?;

        info!(campaign_id = %campaign.id, "Campaign and master membership committed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_campaign(&self, campaign_id: &str) -> Result<Option<CampaignModel>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1"
        ))
        .bind(campaign_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(campaign_from_row).transpose()
    }

    #[instrument(skip(self, campaign))]
    async fn update_campaign(&self, campaign: &CampaignModel) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE campaigns SET name = $2, description = $3, cover_image = $4, system = $5, \
             status = $6, items = $7, abilities = $8, npcs = $9, creatures = $10, updated_at = $11 \
             WHERE id = $1",
        )
        .bind(&campaign.id)
        .bind(&campaign.name)
        .bind(&campaign.description)
        .bind(&campaign.cover_image)
        .bind(&campaign.system)
        .bind(campaign.status.to_string())
        .bind(&campaign.items)
        .bind(&campaign.abilities)
        .bind(&campaign.npcs)
        .bind(&campaign.creatures)
        .bind(campaign.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!(campaign_id = %campaign.id, "Campaign not found for update");
            return Err(AppError::NotFound("Campaign not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_membership(
        &self,
        campaign_id: &str,
        user_id: &str,
    ) -> Result<Option<CampaignMemberModel>, AppError> {
        let row = sqlx::query(
            "SELECT campaign_id, user_id, role, joined_at FROM campaign_members \
             WHERE campaign_id = $1 AND user_id = $2",
        )
        .bind(campaign_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(member_from_row).transpose()
    }

    #[instrument(skip(self, member))]
    async fn add_member(&self, member: &CampaignMemberModel) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO campaign_members (campaign_id, user_id, role, joined_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&member.campaign_id)
        .bind(&member.user_id)
        .bind(member.role.to_string())
        .bind(member.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert membership");
            map_unique_violation(e, |_| ALREADY_MEMBER.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_members(&self, campaign_id: &str) -> Result<Vec<CampaignMemberModel>, AppError> {
        let rows = sqlx::query(
            "SELECT campaign_id, user_id, role, joined_at FROM campaign_members \
             WHERE campaign_id = $1 ORDER BY joined_at",
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(member_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn list_memberships_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<CampaignMemberModel>, AppError> {
        let rows = sqlx::query(
            "SELECT campaign_id, user_id, role, joined_at FROM campaign_members \
             WHERE user_id = $1 ORDER BY joined_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(member_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign_with_master(user_id: &str) -> (CampaignModel, CampaignMemberModel) {
        let campaign = CampaignModel::new("Vendetta".to_string(), None, None, None);
        let master = CampaignMemberModel::new(
            campaign.id.clone(),
            user_id.to_string(),
            MemberRole::Master,
        );
        (campaign, master)
    }

    #[tokio::test]
    async fn test_create_stores_campaign_and_master() {
        let repo = InMemoryCampaignRepository::new();
        let (campaign, master) = campaign_with_master("user-1");
        repo.create_campaign(&campaign, &master).await.unwrap();

        let stored = repo.get_campaign(&campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Vendetta");

        let membership = repo
            .get_membership(&campaign.id, "user-1")
            .await
            .unwrap()
            .unwrap();
        assert!(membership.is_master());
    }

    #[tokio::test]
    async fn test_duplicate_membership_rejected() {
        let repo = InMemoryCampaignRepository::new();
        let (campaign, master) = campaign_with_master("user-1");
        repo.create_campaign(&campaign, &master).await.unwrap();

        let again = CampaignMemberModel::new(
            campaign.id.clone(),
            "user-1".to_string(),
            MemberRole::Player,
        );
        let result = repo.add_member(&again).await;
        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == ALREADY_MEMBER));
    }

    #[tokio::test]
    async fn test_update_missing_campaign() {
        let repo = InMemoryCampaignRepository::new();
        let (campaign, _) = campaign_with_master("user-1");

        let result = repo.update_campaign(&campaign).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_memberships_for_user() {
        let repo = InMemoryCampaignRepository::new();
        let (first, first_master) = campaign_with_master("user-1");
        let (second, second_master) = campaign_with_master("user-2");
        repo.create_campaign(&first, &first_master).await.unwrap();
        repo.create_campaign(&second, &second_master).await.unwrap();
        repo.add_member(&CampaignMemberModel::new(
            second.id.clone(),
            "user-1".to_string(),
            MemberRole::Player,
        ))
        .await
        .unwrap();

        let memberships = repo.list_memberships_for_user("user-1").await.unwrap();
        assert_eq!(memberships.len(), 2);

        let members = repo.list_members(&second.id).await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].role, MemberRole::Master);
    }
}
