pub use models::{UserModel, UserSummary};
pub use repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};

pub mod models;
pub mod repository;
