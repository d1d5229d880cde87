use std::sync::Arc;
use tripway_core::notify::{EmailSender, SmsSender};
use tripway_core::repository::{
    BookingRepository, DestinationRepository, EphemeralStore, HotelRepository, PackageRepository,
    UserRepository,
};
use tripway_store::app_config::BusinessRules;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub hotels: Arc<dyn HotelRepository>,
    pub destinations: Arc<dyn DestinationRepository>,
    pub packages: Arc<dyn PackageRepository>,
    pub ephemeral: Arc<dyn EphemeralStore>,
    pub email: Arc<dyn EmailSender>,
    pub sms: Arc<dyn SmsSender>,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

impl AppState {
    /// State backed entirely by in-process stores, for tests and database-less runs.
    pub fn in_memory(
        auth: AuthConfig,
        business_rules: BusinessRules,
        email: Arc<dyn EmailSender>,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        let store = Arc::new(tripway_store::MemoryStore::new());
        Self {
            users: store.clone(),
            bookings: store.clone(),
            hotels: store.clone(),
            destinations: store.clone(),
            packages: store,
            ephemeral: Arc::new(tripway_store::MemoryEphemeralStore::new()),
            email,
            sms,
            auth,
            business_rules,
        }
    }
}
