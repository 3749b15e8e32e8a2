pub use handlers::{
    add_member, archive_campaign, create_campaign, get_campaign, list_campaigns, update_campaign,
};
pub use models::{CampaignMemberModel, CampaignModel, CampaignStatus, MemberRole};

mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
