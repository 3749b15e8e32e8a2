pub use handlers::{
    create_character, delete_character, get_character, list_campaign_characters,
    update_character,
};
pub use models::{Attributes, CharacterModel};

mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
