use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{Attributes, CharacterModel};
use crate::shared::AppError;

/// Trait for character repository operations
#[async_trait]
pub trait CharacterRepository {
    async fn create_character(&self, character: &CharacterModel) -> Result<(), AppError>;
    async fn get_character(&self, character_id: &str) -> Result<Option<CharacterModel>, AppError>;
    async fn update_character(&self, character: &CharacterModel) -> Result<(), AppError>;
    async fn delete_character(&self, character_id: &str) -> Result<(), AppError>;
    async fn list_by_campaign(&self, campaign_id: &str) -> Result<Vec<CharacterModel>, AppError>;
    async fn count_by_campaign(&self, campaign_id: &str) -> Result<usize, AppError>;
}

/// In-memory implementation of CharacterRepository for development and testing
pub struct InMemoryCharacterRepository {
    characters: Mutex<HashMap<String, CharacterModel>>,
}

impl Default for InMemoryCharacterRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCharacterRepository {
    pub fn new() -> Self {
        Self {
            characters: Mutex::new(HashMap::new()),
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, CharacterModel>>, AppError> {
        self.characters.lock().map_err(|_| AppError::Internal)
    }
}

#[async_trait]
impl CharacterRepository for InMemoryCharacterRepository {
    #[instrument(skip(self, character))]
    async fn create_character(&self, character: &CharacterModel) -> Result<(), AppError> {
        debug!(character_id = %character.id, "Creating character in memory");

        let mut characters = self.lock()?;
        if characters.contains_key(&character.id) {
            return Err(AppError::DatabaseError(
                "Character already exists".to_string(),
            ));
        }
        characters.insert(character.id.clone(), character.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_character(&self, character_id: &str) -> Result<Option<CharacterModel>, AppError> {
        Ok(self.lock()?.get(character_id).cloned())
    }

    #[instrument(skip(self, character))]
    async fn update_character(&self, character: &CharacterModel) -> Result<(), AppError> {
        let mut characters = self.lock()?;
        match characters.get_mut(&character.id) {
            Some(existing) => {
                *existing = character.clone();
                Ok(())
            }
            None => {
                warn!(character_id = %character.id, "Character not found for update in memory");
                Err(AppError::NotFound("Character not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_character(&self, character_id: &str) -> Result<(), AppError> {
        if self.lock()?.remove(character_id).is_none() {
            warn!(character_id = %character_id, "Character not found for deletion in memory");
            return Err(AppError::NotFound("Character not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_by_campaign(&self, campaign_id: &str) -> Result<Vec<CharacterModel>, AppError> {
        let characters = self.lock()?;
        let mut found: Vec<_> = characters
            .values()
            .filter(|c| c.campaign_id == campaign_id)
            .cloned()
            .collect();
        found.sort_by_key(|c| c.created_at);
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn count_by_campaign(&self, campaign_id: &str) -> Result<usize, AppError> {
        Ok(self
            .lock()?
            .values()
            .filter(|c| c.campaign_id == campaign_id)
            .count())
    }
}

/// PostgreSQL implementation of character repository
pub struct PostgresCharacterRepository {
    pool: PgPool,
}

impl PostgresCharacterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CHARACTER_COLUMNS: &str = "id, user_id, campaign_id, name, class, agilidade, forca, \
     intelecto, presenca, vigor, pv, pv_max, san, san_max, pe, pe_max, nex, created_at, updated_at";

fn character_from_row(row: &PgRow) -> CharacterModel {
    CharacterModel {
        id: row.get("id"),
        user_id: row.get("user_id"),
        campaign_id: row.get("campaign_id"),
        name: row.get("name"),
        class: row.get("class"),
        attributes: Attributes {
            agility: row.get("agilidade"),
            strength: row.get("forca"),
            intellect: row.get("intelecto"),
            presence: row.get("presenca"),
            vigor: row.get("vigor"),
        },
        pv: row.get("pv"),
        pv_max: row.get("pv_max"),
        san: row.get("san"),
        san_max: row.get("san_max"),
        pe: row.get("pe"),
        pe_max: row.get("pe_max"),
        nex: row.get("nex"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl CharacterRepository for PostgresCharacterRepository {
    #[instrument(skip(self, character))]
    async fn create_character(&self, character: &CharacterModel) -> Result<(), AppError> {
        debug!(character_id = %character.id, "Creating character in database");

        sqlx::query(&format!(
            "INSERT INTO characters ({CHARACTER_COLUMNS}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)"
        ))
        .bind(&character.id)
        .bind(&character.user_id)
        .bind(&character.campaign_id)
        .bind(&character.name)
        .bind(&character.class)
        .bind(character.attributes.agility)
        .bind(character.attributes.strength)
        .bind(character.attributes.intellect)
        .bind(character.attributes.presence)
        .bind(character.attributes.vigor)
        .bind(character.pv)
        .bind(character.pv_max)
        .bind(character.san)
        .bind(character.san_max)
        .bind(character.pe)
        .bind(character.pe_max)
        .bind(character.nex)
        .bind(character.created_at)
        .bind(character.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create character in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_character(&self, character_id: &str) -> Result<Option<CharacterModel>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {CHARACTER_COLUMNS} FROM characters WHERE id = $1"
        ))
        .bind(character_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(character_from_row))
    }

    #[instrument(skip(self, character))]
    async fn update_character(&self, character: &CharacterModel) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE characters SET name = $2, class = $3, agilidade = $4, forca = $5, \
             intelecto = $6, presenca = $7, vigor = $8, pv = $9, pv_max = $10, san = $11, \
             san_max = $12, pe = $13, pe_max = $14, nex = $15, updated_at = $16 WHERE id = $1",
        )
        .bind(&character.id)
        .bind(&character.name)
        .bind(&character.class)
        .bind(character.attributes.agility)
        .bind(character.attributes.strength)
        .bind(character.attributes.intellect)
        .bind(character.attributes.presence)
        .bind(character.attributes.vigor)
        .bind(character.pv)
        .bind(character.pv_max)
        .bind(character.san)
        .bind(character.san_max)
        .bind(character.pe)
        .bind(character.pe_max)
        .bind(character.nex)
        .bind(character.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!(character_id = %character.id, "Character not found for update");
            return Err(AppError::NotFound("Character not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_character(&self, character_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM characters WHERE id = $1")
            .bind(character_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            warn!(character_id = %character_id, "Character not found for deletion");
            return Err(AppError::NotFound("Character not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_by_campaign(&self, campaign_id: &str) -> Result<Vec<CharacterModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {CHARACTER_COLUMNS} FROM characters WHERE campaign_id = $1 ORDER BY created_at"
        ))
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(character_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn count_by_campaign(&self, campaign_id: &str) -> Result<usize, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM characters WHERE campaign_id = $1")
                .bind(campaign_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.max(0) as usize)
    }
}
