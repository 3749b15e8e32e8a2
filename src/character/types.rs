use serde::{Deserialize, Serialize};

use super::models::{Attributes, CharacterModel};
use crate::user::UserSummary;

/// Request payload for creating a character
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterRequest {
    pub campaign_id: Option<String>,
    pub name: Option<String>,
    pub class: Option<String>,
    pub attributes: Option<Attributes>,
}

/// Partial update of a character sheet. Attributes sit at the top level, the
/// same flat shape the sheet is returned in. Ownership and campaign are not
/// editable.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCharacterRequest {
    pub name: Option<String>,
    pub class: Option<String>,
    #[serde(flatten)]
    pub attributes: AttributesPatch,
    pub pv: Option<i32>,
    pub pv_max: Option<i32>,
    pub san: Option<i32>,
    pub san_max: Option<i32>,
    pub pe: Option<i32>,
    pub pe_max: Option<i32>,
    pub nex: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AttributesPatch {
    #[serde(rename = "agilidade")]
    pub agility: Option<i32>,
    #[serde(rename = "forca")]
    pub strength: Option<i32>,
    #[serde(rename = "intelecto")]
    pub intellect: Option<i32>,
    #[serde(rename = "presenca")]
    pub presence: Option<i32>,
    pub vigor: Option<i32>,
}

/// Minimal campaign reference embedded in a character sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRef {
    pub id: String,
    pub name: String,
    pub system: String,
}

/// Character together with its owner's public profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterWithOwner {
    #[serde(flatten)]
    pub character: CharacterModel,
    pub user: Option<UserSummary>,
}

/// Full character sheet response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSheet {
    #[serde(flatten)]
    pub character: CharacterModel,
    pub user: Option<UserSummary>,
    pub campaign: Option<CampaignRef>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteCharacterResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_reads_sheet_attributes() {
        let request: CreateCharacterRequest = serde_json::from_str(
            r#"{
                "campaignId": "c-1",
                "name": "Dante",
                "class": "combatente",
                "attributes": {"agilidade": 3, "forca": 2, "intelecto": 1, "presenca": 1, "vigor": 2}
            }"#,
        )
        .unwrap();

        let attributes = request.attributes.unwrap();
        assert_eq!(attributes.agility, 3);
        assert_eq!(attributes.strength, 2);
        assert_eq!(attributes.intellect, 1);
        assert_eq!(attributes.presence, 1);
        assert_eq!(attributes.vigor, 2);
    }

    #[test]
    fn test_update_request_takes_flat_attributes() {
        let request: UpdateCharacterRequest =
            serde_json::from_str(r#"{"forca": 4, "pv": 7, "name": "Dante"}"#).unwrap();

        assert_eq!(request.attributes.strength, Some(4));
        assert_eq!(request.attributes.agility, None);
        assert_eq!(request.pv, Some(7));
        assert_eq!(request.name.as_deref(), Some("Dante"));
    }
}
