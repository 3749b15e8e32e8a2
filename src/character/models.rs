use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const BASE_PV: i32 = 10;
pub const BASE_SAN: i32 = 10;
pub const BASE_PE: i32 = 5;
pub const STARTING_NEX: i32 = 5;

/// The five Ordem Paranormal attributes, keyed on the wire by their
/// Portuguese names as the sheet shows them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    #[serde(rename = "agilidade")]
    pub agility: i32,
    #[serde(rename = "forca")]
    pub strength: i32,
    #[serde(rename = "intelecto")]
    pub intellect: i32,
    #[serde(rename = "presenca")]
    pub presence: i32,
    pub vigor: i32,
}

impl Attributes {
    /// Starting life points grow with vigor
    pub fn starting_pv(&self) -> i32 {
        BASE_PV + self.vigor
    }
}

/// Database model for characters table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CharacterModel {
    pub id: String,
    pub user_id: String,
    pub campaign_id: String,
    pub name: String,
    pub class: String,
    #[serde(flatten)]
    pub attributes: Attributes,
    pub pv: i32,
    pub pv_max: i32,
    pub san: i32,
    pub san_max: i32,
    pub pe: i32,
    pub pe_max: i32,
    pub nex: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CharacterModel {
    /// Creates a fresh character with resources derived from its attributes
    pub fn new(
        user_id: String,
        campaign_id: String,
        name: String,
        class: String,
        attributes: Attributes,
    ) -> Self {
        let now = Utc::now();
        let pv = attributes.starting_pv();

        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            campaign_id,
            name,
            class,
            attributes,
            pv,
            pv_max: pv,
            san: BASE_SAN,
            san_max: BASE_SAN,
            pe: BASE_PE,
            pe_max: BASE_PE,
            nex: STARTING_NEX,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
