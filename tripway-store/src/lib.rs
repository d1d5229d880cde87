pub mod app_config;
pub mod booking_repo;
pub mod catalog_repo;
pub mod database;
pub mod memory;
pub mod notifier;
pub mod redis_repo;
pub mod user_repo;

pub use booking_repo::MySqlBookingRepository;
pub use catalog_repo::{MySqlDestinationRepository, MySqlHotelRepository, MySqlPackageRepository};
pub use database::DbClient;
pub use memory::{MemoryEphemeralStore, MemoryStore};
pub use notifier::{SendGridClient, TwilioClient};
pub use redis_repo::RedisClient;
pub use user_repo::MySqlUserRepository;
