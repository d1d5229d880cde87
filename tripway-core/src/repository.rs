use async_trait::async_trait;

use crate::booking::{Booking, BookingPatch, NewBooking};
use crate::catalog::{
    Accommodation, Destination, DestinationInput, Faq, Hotel, ItineraryDay, NewHotel, NewPackage,
    Package, PackageImage, PackageItem,
};
use crate::search::{DestinationSearch, HotelSearch};
use crate::user::{NewUser, ProfileUpdate, User, UserCredentials};
use crate::CoreResult;

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, user: NewUser) -> CoreResult<User>;

    async fn get_user(&self, id: u64) -> CoreResult<Option<User>>;

    async fn find_credentials(&self, email: &str) -> CoreResult<Option<UserCredentials>>;

    /// Returns `None` when no user has this id.
    async fn update_profile(&self, id: u64, update: &ProfileUpdate) -> CoreResult<Option<User>>;
}

/// Repository trait for bookings
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts in a transaction. Fails with `Conflict` on a duplicate booking_id and
    /// `NotFound` when the user does not exist.
    async fn create_booking(&self, booking: NewBooking) -> CoreResult<Booking>;

    async fn list_bookings(&self) -> CoreResult<Vec<Booking>>;

    async fn get_booking(&self, booking_id: &str) -> CoreResult<Option<Booking>>;

    async fn list_user_bookings(&self, user_id: u64) -> CoreResult<Vec<Booking>>;

    /// Sets only the columns present in the patch. `NotFound` for an unknown booking,
    /// `Conflict` for a disallowed status move.
    async fn update_booking(&self, booking_id: &str, patch: BookingPatch) -> CoreResult<Booking>;

    /// Returns whether a row was removed.
    async fn delete_booking(&self, booking_id: &str) -> CoreResult<bool>;
}

/// Repository trait for hotel reference data
#[async_trait]
pub trait HotelRepository: Send + Sync {
    async fn list_hotels(&self) -> CoreResult<Vec<Hotel>>;

    async fn get_hotel(&self, id: u64) -> CoreResult<Option<Hotel>>;

    async fn create_hotel(&self, hotel: NewHotel) -> CoreResult<Hotel>;

    /// Ordered by rating, highest first, at most `HOTEL_SEARCH_LIMIT` rows.
    async fn search_hotels(&self, search: &HotelSearch) -> CoreResult<Vec<Hotel>>;
}

/// Repository trait for destinations
#[async_trait]
pub trait DestinationRepository: Send + Sync {
    async fn list_destinations(&self) -> CoreResult<Vec<Destination>>;

    async fn get_destination(&self, id: u64) -> CoreResult<Option<Destination>>;

    async fn create_destination(&self, input: DestinationInput) -> CoreResult<Destination>;

    async fn update_destination(&self, id: u64, input: DestinationInput) -> CoreResult<Option<Destination>>;

    async fn delete_destination(&self, id: u64) -> CoreResult<bool>;

    /// Ordered by rating, highest first, at most `DESTINATION_SEARCH_LIMIT` rows.
    async fn search_destinations(&self, search: &DestinationSearch) -> CoreResult<Vec<Destination>>;
}

/// Repository trait for tour packages and their child collections
#[async_trait]
pub trait PackageRepository: Send + Sync {
    async fn list_packages(&self, destination_id: Option<u64>) -> CoreResult<Vec<Package>>;

    async fn get_package(&self, id: u64) -> CoreResult<Option<Package>>;

    async fn create_package(&self, package: NewPackage) -> CoreResult<Package>;

    async fn package_images(&self, package_id: u64) -> CoreResult<Vec<PackageImage>>;

    async fn package_inclusions(&self, package_id: u64) -> CoreResult<Vec<PackageItem>>;

    async fn package_exclusions(&self, package_id: u64) -> CoreResult<Vec<PackageItem>>;

    async fn package_itinerary(&self, package_id: u64) -> CoreResult<Vec<ItineraryDay>>;

    async fn package_accommodations(&self, package_id: u64) -> CoreResult<Vec<Accommodation>>;

    async fn package_faqs(&self, package_id: u64) -> CoreResult<Vec<Faq>>;
}

/// Short-lived keys: phone confirmation codes and rate-limit counters.
#[async_trait]
pub trait EphemeralStore: Send + Sync {
    async fn put_code(&self, key: &str, code: &str, ttl_seconds: u64) -> CoreResult<()>;

    /// Compares and deletes in one step. Returns true only for the caller that
    /// consumed a matching, unexpired code.
    async fn take_code(&self, key: &str, code: &str) -> CoreResult<bool>;

    /// Drops a code or a counter.
    async fn delete(&self, key: &str) -> CoreResult<()>;

    /// Counts one hit against `key` and returns the count in the current window.
    /// The window opens on the first hit and later hits do not extend it.
    async fn hit(&self, key: &str, window_seconds: u64) -> CoreResult<u64>;
}
