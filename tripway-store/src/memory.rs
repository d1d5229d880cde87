//! In-process implementations of the repository traits. They hold the same
//! contracts as the MySQL and Redis ones (unique keys, ordering, limits) and back
//! the API test suite and local runs without a database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use tripway_core::booking::{Booking, BookingPatch, NewBooking};
use tripway_core::catalog::{
    Accommodation, Destination, DestinationInput, Faq, Hotel, ItineraryDay, NewHotel, NewPackage,
    Package, PackageImage, PackageItem,
};
use tripway_core::repository::{
    BookingRepository, DestinationRepository, EphemeralStore, HotelRepository, PackageRepository,
    UserRepository,
};
use tripway_core::search::{DestinationSearch, HotelSearch, DESTINATION_SEARCH_LIMIT, HOTEL_SEARCH_LIMIT};
use tripway_core::user::{normalize_email, NewUser, ProfileUpdate, User, UserCredentials};
use tripway_core::{CoreError, CoreResult};

#[derive(Default)]
struct Tables {
    next_id: u64,
    users: Vec<UserCredentials>,
    bookings: Vec<Booking>,
    hotels: Vec<Hotel>,
    destinations: Vec<Destination>,
    packages: Vec<Package>,
    images: Vec<PackageImage>,
    inclusions: Vec<PackageItem>,
    exclusions: Vec<PackageItem>,
    itinerary: Vec<ItineraryDay>,
    accommodations: Vec<Accommodation>,
    faqs: Vec<Faq>,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// All relational tables behind one lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(a: &Booking, b: &Booking) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> CoreResult<User> {
        let mut tables = self.tables.write().await;
        let email = normalize_email(&user.email);
        if tables.users.iter().any(|c| c.user.email == email) {
            return Err(CoreError::Conflict("A user with this email already exists".to_string()));
        }
        let created = User {
            id: tables.next_id(),
            name: user.name.trim().to_string(),
            email,
            phone: user.phone,
            created_at: Utc::now(),
        };
        tables.users.push(UserCredentials {
            user: created.clone(),
            password_hash: user.password_hash,
        });
        Ok(created)
    }

    async fn get_user(&self, id: u64) -> CoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|c| c.user.id == id).map(|c| c.user.clone()))
    }

    async fn find_credentials(&self, email: &str) -> CoreResult<Option<UserCredentials>> {
        let tables = self.tables.read().await;
        let email = normalize_email(email);
        Ok(tables.users.iter().find(|c| c.user.email == email).cloned())
    }

    async fn update_profile(&self, id: u64, update: &ProfileUpdate) -> CoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &update.email {
            let email = normalize_email(email);
            if tables.users.iter().any(|c| c.user.email == email && c.user.id != id) {
                return Err(CoreError::Conflict("A user with this email already exists".to_string()));
            }
        }
        Ok(tables
            .users
            .iter_mut()
            .find(|c| c.user.id == id)
            .map(|c| {
                update.apply(&mut c.user);
                c.user.clone()
            }))
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create_booking(&self, booking: NewBooking) -> CoreResult<Booking> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|c| c.user.id == booking.user_id) {
            return Err(CoreError::NotFound(format!("User {}", booking.user_id)));
        }
        if tables.bookings.iter().any(|b| b.booking_id == booking.booking_id) {
            return Err(CoreError::Conflict(format!("Booking {} already exists", booking.booking_id)));
        }
        let created = Booking {
            id: tables.next_id(),
            booking_id: booking.booking_id,
            user_id: booking.user_id,
            booking_type: booking.booking_type,
            package_id: booking.package_id,
            hotel_id: booking.hotel_id,
            flight_number: booking.flight_number,
            travel_date: booking.travel_date,
            return_date: booking.return_date,
            adults: booking.adults,
            children: booking.children,
            total_price: booking.total_price,
            status: booking.status,
            payment_status: booking.payment_status,
            contact_email: booking.contact_email,
            special_requests: booking.special_requests,
            created_at: Utc::now(),
        };
        tables.bookings.push(created.clone());
        Ok(created)
    }

    async fn list_bookings(&self) -> CoreResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        let mut bookings = tables.bookings.clone();
        bookings.sort_by(newest_first);
        Ok(bookings)
    }

    async fn get_booking(&self, booking_id: &str) -> CoreResult<Option<Booking>> {
        let tables = self.tables.read().await;
        Ok(tables.bookings.iter().find(|b| b.booking_id == booking_id).cloned())
    }

    async fn list_user_bookings(&self, user_id: u64) -> CoreResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(newest_first);
        Ok(bookings)
    }

    async fn update_booking(&self, booking_id: &str, patch: BookingPatch) -> CoreResult<Booking> {
        if patch.is_empty() {
            return Err(CoreError::Validation("nothing to update".to_string()));
        }
        let mut tables = self.tables.write().await;
        let booking = tables
            .bookings
            .iter_mut()
            .find(|b| b.booking_id == booking_id)
            .ok_or_else(|| CoreError::NotFound(format!("Booking {}", booking_id)))?;
        patch.check_against(booking.status)?;
        patch.apply(booking);
        Ok(booking.clone())
    }

    async fn delete_booking(&self, booking_id: &str) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.bookings.len();
        tables.bookings.retain(|b| b.booking_id != booking_id);
        Ok(tables.bookings.len() < before)
    }
}

#[async_trait]
impl HotelRepository for MemoryStore {
    async fn list_hotels(&self) -> CoreResult<Vec<Hotel>> {
        let tables = self.tables.read().await;
        let mut hotels = tables.hotels.clone();
        hotels.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        Ok(hotels)
    }

    async fn get_hotel(&self, id: u64) -> CoreResult<Option<Hotel>> {
        let tables = self.tables.read().await;
        Ok(tables.hotels.iter().find(|h| h.id == id).cloned())
    }

    async fn create_hotel(&self, hotel: NewHotel) -> CoreResult<Hotel> {
        let mut tables = self.tables.write().await;
        let created = Hotel {
            id: tables.next_id(),
            name: hotel.name,
            location: hotel.location,
            description: hotel.description,
            price_range: hotel.price_range,
            price_per_night: hotel.price_per_night,
            rating: hotel.rating,
            amenities: hotel.amenities,
            image_url: hotel.image_url,
        };
        tables.hotels.push(created.clone());
        Ok(created)
    }

    async fn search_hotels(&self, search: &HotelSearch) -> CoreResult<Vec<Hotel>> {
        let tables = self.tables.read().await;
        let mut hotels: Vec<Hotel> = tables.hotels.iter().filter(|h| search.matches(h)).cloned().collect();
        hotels.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        hotels.truncate(HOTEL_SEARCH_LIMIT);
        Ok(hotels)
    }
}

#[async_trait]
impl DestinationRepository for MemoryStore {
    async fn list_destinations(&self) -> CoreResult<Vec<Destination>> {
        let tables = self.tables.read().await;
        let mut destinations = tables.destinations.clone();
        destinations.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        Ok(destinations)
    }

    async fn get_destination(&self, id: u64) -> CoreResult<Option<Destination>> {
        let tables = self.tables.read().await;
        Ok(tables.destinations.iter().find(|d| d.id == id).cloned())
    }

    async fn create_destination(&self, input: DestinationInput) -> CoreResult<Destination> {
        let mut tables = self.tables.write().await;
        let created = Destination {
            id: tables.next_id(),
            name: input.name,
            country: input.country,
            description: input.description,
            category: input.category,
            rating: input.rating,
            image_url: input.image_url,
        };
        tables.destinations.push(created.clone());
        Ok(created)
    }

    async fn update_destination(&self, id: u64, input: DestinationInput) -> CoreResult<Option<Destination>> {
        let mut tables = self.tables.write().await;
        Ok(tables.destinations.iter_mut().find(|d| d.id == id).map(|d| {
            *d = Destination {
                id,
                name: input.name,
                country: input.country,
                description: input.description,
                category: input.category,
                rating: input.rating,
                image_url: input.image_url,
            };
            d.clone()
        }))
    }

    async fn delete_destination(&self, id: u64) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.destinations.len();
        tables.destinations.retain(|d| d.id != id);
        let removed = tables.destinations.len() < before;
        if removed {
            // ON DELETE SET NULL
            for package in tables.packages.iter_mut().filter(|p| p.destination_id == Some(id)) {
                package.destination_id = None;
            }
        }
        Ok(removed)
    }

    async fn search_destinations(&self, search: &DestinationSearch) -> CoreResult<Vec<Destination>> {
        let tables = self.tables.read().await;
        let mut destinations: Vec<Destination> =
            tables.destinations.iter().filter(|d| search.matches(d)).cloned().collect();
        destinations.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        destinations.truncate(DESTINATION_SEARCH_LIMIT);
        Ok(destinations)
    }
}

#[async_trait]
impl PackageRepository for MemoryStore {
    async fn list_packages(&self, destination_id: Option<u64>) -> CoreResult<Vec<Package>> {
        let tables = self.tables.read().await;
        let mut packages: Vec<Package> = tables
            .packages
            .iter()
            .filter(|p| destination_id.is_none() || p.destination_id == destination_id)
            .cloned()
            .collect();
        packages.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        Ok(packages)
    }

    async fn get_package(&self, id: u64) -> CoreResult<Option<Package>> {
        let tables = self.tables.read().await;
        Ok(tables.packages.iter().find(|p| p.id == id).cloned())
    }

    async fn create_package(&self, package: NewPackage) -> CoreResult<Package> {
        let mut tables = self.tables.write().await;
        if let Some(destination_id) = package.destination_id {
            if !tables.destinations.iter().any(|d| d.id == destination_id) {
                return Err(CoreError::Validation("Package references a missing record".to_string()));
            }
        }

        let package_id = tables.next_id();
        let created = Package {
            id: package_id,
            destination_id: package.destination_id,
            title: package.title,
            description: package.description,
            duration_days: package.duration_days,
            price: package.price,
            discounted_price: package.discounted_price,
            rating: package.rating,
            image_url: package.image_url,
        };
        tables.packages.push(created.clone());

        for image in package.images {
            let id = tables.next_id();
            tables.images.push(PackageImage {
                id,
                package_id,
                image_url: image.image_url,
                caption: image.caption,
            });
        }
        for description in package.inclusions {
            let id = tables.next_id();
            tables.inclusions.push(PackageItem { id, package_id, description });
        }
        for description in package.exclusions {
            let id = tables.next_id();
            tables.exclusions.push(PackageItem { id, package_id, description });
        }
        for day in package.itinerary {
            let id = tables.next_id();
            tables.itinerary.push(ItineraryDay {
                id,
                package_id,
                day_number: day.day_number,
                title: day.title,
                description: day.description,
                activities: day.activities,
            });
        }
        for stay in package.accommodations {
            let id = tables.next_id();
            tables.accommodations.push(Accommodation {
                id,
                package_id,
                hotel_name: stay.hotel_name,
                location: stay.location,
                nights: stay.nights,
                room_type: stay.room_type,
            });
        }
        for faq in package.faqs {
            let id = tables.next_id();
            tables.faqs.push(Faq {
                id,
                package_id,
                question: faq.question,
                answer: faq.answer,
            });
        }

        Ok(created)
    }

    async fn package_images(&self, package_id: u64) -> CoreResult<Vec<PackageImage>> {
        let tables = self.tables.read().await;
        Ok(tables.images.iter().filter(|i| i.package_id == package_id).cloned().collect())
    }

    async fn package_inclusions(&self, package_id: u64) -> CoreResult<Vec<PackageItem>> {
        let tables = self.tables.read().await;
        Ok(tables.inclusions.iter().filter(|i| i.package_id == package_id).cloned().collect())
    }

    async fn package_exclusions(&self, package_id: u64) -> CoreResult<Vec<PackageItem>> {
        let tables = self.tables.read().await;
        Ok(tables.exclusions.iter().filter(|i| i.package_id == package_id).cloned().collect())
    }

    async fn package_itinerary(&self, package_id: u64) -> CoreResult<Vec<ItineraryDay>> {
        let tables = self.tables.read().await;
        let mut days: Vec<ItineraryDay> =
            tables.itinerary.iter().filter(|d| d.package_id == package_id).cloned().collect();
        days.sort_by_key(|d| (d.day_number, d.id));
        Ok(days)
    }

    async fn package_accommodations(&self, package_id: u64) -> CoreResult<Vec<Accommodation>> {
        let tables = self.tables.read().await;
        Ok(tables.accommodations.iter().filter(|a| a.package_id == package_id).cloned().collect())
    }

    async fn package_faqs(&self, package_id: u64) -> CoreResult<Vec<Faq>> {
        let tables = self.tables.read().await;
        Ok(tables.faqs.iter().filter(|f| f.package_id == package_id).cloned().collect())
    }
}

// ============================================================================
// Ephemeral keys
// ============================================================================

/// Expiring key-value entries with the semantics of the Redis store: `SET EX`,
/// compare-and-delete, `DEL` and a fixed-window `INCR`.
#[derive(Default)]
pub struct MemoryEphemeralStore {
    codes: RwLock<HashMap<String, (String, Instant)>>,
    counters: RwLock<HashMap<String, (u64, Instant)>>,
}

impl MemoryEphemeralStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EphemeralStore for MemoryEphemeralStore {
    async fn put_code(&self, key: &str, code: &str, ttl_seconds: u64) -> CoreResult<()> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_seconds);
        self.codes
            .write()
            .await
            .insert(key.to_string(), (code.to_string(), expires_at));
        Ok(())
    }

    async fn take_code(&self, key: &str, code: &str) -> CoreResult<bool> {
        let mut codes = self.codes.write().await;
        match codes.get(key) {
            Some((_, expires_at)) if *expires_at <= Instant::now() => {
                codes.remove(key);
                Ok(false)
            }
            Some((stored, _)) if stored == code => {
                codes.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> CoreResult<()> {
        self.codes.write().await.remove(key);
        self.counters.write().await.remove(key);
        Ok(())
    }

    async fn hit(&self, key: &str, window_seconds: u64) -> CoreResult<u64> {
        let now = Instant::now();
        let mut counters = self.counters.write().await;
        let entry = counters
            .entry(key.to_string())
            .or_insert((0, now + Duration::from_secs(window_seconds)));
        // Fixed window: the expiry is set when the count starts, as INCR + EXPIRE on 1.
        if entry.1 <= now {
            *entry = (0, now + Duration::from_secs(window_seconds));
        }
        entry.0 += 1;
        Ok(entry.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripway_core::booking::{BookingStatus, BookingType, PaymentStatus};
    use tripway_shared::Masked;

    async fn store_with_user() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser {
                name: "Asha".to_string(),
                email: "Asha@Example.com".to_string(),
                phone: None,
                password_hash: Masked("hash".to_string()),
            })
            .await
            .unwrap();
        (store, user)
    }

    fn new_booking(booking_id: &str, user_id: u64) -> NewBooking {
        NewBooking {
            booking_id: booking_id.to_string(),
            user_id,
            booking_type: BookingType::Package,
            package_id: Some(1),
            hotel_id: None,
            flight_number: None,
            travel_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            return_date: None,
            adults: 2,
            children: 0,
            total_price: 2360.0,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            contact_email: None,
            special_requests: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (store, user) = store_with_user().await;
        assert_eq!(user.email, "asha@example.com");

        let err = store
            .create_user(NewUser {
                name: "Other".to_string(),
                email: "asha@example.com".to_string(),
                phone: None,
                password_hash: Masked("hash".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_duplicate_booking_id_conflicts() {
        let (store, user) = store_with_user().await;
        store.create_booking(new_booking("BK1", user.id)).await.unwrap();
        let err = store.create_booking(new_booking("BK1", user.id)).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_booking_for_unknown_user_is_rejected() {
        let store = MemoryStore::new();
        let err = store.create_booking(new_booking("BK1", 99)).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_patch_keeps_unmentioned_columns() {
        let (store, user) = store_with_user().await;
        store.create_booking(new_booking("BK1", user.id)).await.unwrap();

        let updated = store
            .update_booking(
                "BK1",
                BookingPatch {
                    status: Some(BookingStatus::Confirmed),
                    payment_status: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Confirmed);
        assert_eq!(updated.payment_status, PaymentStatus::Unpaid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_codes_expire() {
        let store = MemoryEphemeralStore::new();
        store.put_code("code:+1555", "123456", 60).await.unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!store.take_code("code:+1555", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn test_code_is_taken_once() {
        let store = MemoryEphemeralStore::new();
        store.put_code("code:+1555", "123456", 60).await.unwrap();

        assert!(!store.take_code("code:+1555", "654321").await.unwrap());
        assert!(store.take_code("code:+1555", "123456").await.unwrap());
        assert!(!store.take_code("code:+1555", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_takes_consume_once() {
        let store = std::sync::Arc::new(MemoryEphemeralStore::new());
        for round in 0..50 {
            let key = format!("code:{}", round);
            store.put_code(&key, "123456", 60).await.unwrap();
            let (a, b) = tokio::join!(
                tokio::spawn({
                    let store = store.clone();
                    let key = key.clone();
                    async move { store.take_code(&key, "123456").await.unwrap() }
                }),
                tokio::spawn({
                    let store = store.clone();
                    let key = key.clone();
                    async move { store.take_code(&key, "123456").await.unwrap() }
                }),
            );
            assert!(a.unwrap() ^ b.unwrap(), "round {} consumed the code twice or never", round);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_counter_resets_after_window() {
        let store = MemoryEphemeralStore::new();
        assert_eq!(store.hit("ip", 60).await.unwrap(), 1);
        assert_eq!(store.hit("ip", 60).await.unwrap(), 2);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(store.hit("ip", 60).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_steady_traffic_does_not_extend_window() {
        let store = MemoryEphemeralStore::new();
        let mut highest = 0;
        for _ in 0..101 {
            highest = highest.max(store.hit("ratelimit:1.2.3.4", 60).await.unwrap());
            tokio::time::advance(Duration::from_secs(59)).await;
        }
        // One request every 59 s never puts more than two in a 60 s window.
        assert!(highest <= 2, "count reached {}", highest);
    }

    #[tokio::test]
    async fn test_delete_clears_counters() {
        let store = MemoryEphemeralStore::new();
        store.hit("attempts:+1555", 300).await.unwrap();
        store.hit("attempts:+1555", 300).await.unwrap();
        store.delete("attempts:+1555").await.unwrap();
        assert_eq!(store.hit("attempts:+1555", 300).await.unwrap(), 1);
    }
}
