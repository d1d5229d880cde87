use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};
use tripway_core::catalog::{
    Accommodation, Destination, DestinationInput, Faq, Hotel, ItineraryDay, NewHotel, NewPackage,
    Package, PackageImage, PackageItem,
};
use tripway_core::repository::{DestinationRepository, HotelRepository, PackageRepository};
use tripway_core::search::{
    contains_pattern, prefix_pattern, DestinationSearch, HotelSearch, DESTINATION_SEARCH_LIMIT,
    HOTEL_SEARCH_LIMIT,
};
use tripway_core::{CoreError, CoreResult};

use crate::database::{internal, map_db_error};

// ============================================================================
// Hotels
// ============================================================================

pub struct MySqlHotelRepository {
    pool: MySqlPool,
}

impl MySqlHotelRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct HotelRow {
    id: u64,
    name: String,
    location: String,
    description: Option<String>,
    price_range: String,
    price_per_night: f64,
    rating: f64,
    amenities: Option<String>,
    image_url: Option<String>,
}

impl From<HotelRow> for Hotel {
    fn from(row: HotelRow) -> Self {
        Hotel {
            id: row.id,
            name: row.name,
            location: row.location,
            description: row.description,
            price_range: row.price_range,
            price_per_night: row.price_per_night,
            rating: row.rating,
            amenities: row.amenities,
            image_url: row.image_url,
        }
    }
}

const HOTEL_COLUMNS: &str =
    "id, name, location, description, price_range, price_per_night, rating, amenities, image_url";

#[async_trait]
impl HotelRepository for MySqlHotelRepository {
    async fn list_hotels(&self) -> CoreResult<Vec<Hotel>> {
        let rows = sqlx::query_as::<_, HotelRow>(&format!(
            "SELECT {} FROM hotels ORDER BY rating DESC, id",
            HOTEL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        Ok(rows.into_iter().map(Hotel::from).collect())
    }

    async fn get_hotel(&self, id: u64) -> CoreResult<Option<Hotel>> {
        let row = sqlx::query_as::<_, HotelRow>(&format!("SELECT {} FROM hotels WHERE id = ?", HOTEL_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;

        Ok(row.map(Hotel::from))
    }

    async fn create_hotel(&self, hotel: NewHotel) -> CoreResult<Hotel> {
        let result = sqlx::query(
            r#"
            INSERT INTO hotels (name, location, description, price_range, price_per_night, rating, amenities, image_url)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&hotel.name)
        .bind(&hotel.location)
        .bind(&hotel.description)
        .bind(&hotel.price_range)
        .bind(hotel.price_per_night)
        .bind(hotel.rating)
        .bind(&hotel.amenities)
        .bind(&hotel.image_url)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("Hotel", e))?;

        Ok(Hotel {
            id: result.last_insert_id(),
            name: hotel.name,
            location: hotel.location,
            description: hotel.description,
            price_range: hotel.price_range,
            price_per_night: hotel.price_per_night,
            rating: hotel.rating,
            amenities: hotel.amenities,
            image_url: hotel.image_url,
        })
    }

    async fn search_hotels(&self, search: &HotelSearch) -> CoreResult<Vec<Hotel>> {
        let mut qb = hotel_search_query(search);

        let rows = qb
            .build_query_as::<HotelRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;

        Ok(rows.into_iter().map(Hotel::from).collect())
    }
}

/// Hotels matching every present filter, best rated first.
fn hotel_search_query(search: &HotelSearch) -> QueryBuilder<'static, MySql> {
    let mut qb: QueryBuilder<MySql> =
        QueryBuilder::new(format!("SELECT {} FROM hotels WHERE 1 = 1", HOTEL_COLUMNS));

    if let Some(location) = &search.location {
        qb.push(" AND location LIKE ").push_bind(contains_pattern(location));
    }
    if let Some(price_range) = &search.price_range {
        qb.push(" AND price_range LIKE ").push_bind(prefix_pattern(price_range));
    }
    if let Some(min_rating) = search.min_rating {
        qb.push(" AND rating >= ").push_bind(min_rating);
    }
    if let Some(name) = &search.name {
        qb.push(" AND name LIKE ").push_bind(contains_pattern(name));
    }
    qb.push(" ORDER BY rating DESC LIMIT ").push_bind(HOTEL_SEARCH_LIMIT as u64);
    qb
}

// ============================================================================
// Destinations
// ============================================================================

pub struct MySqlDestinationRepository {
    pool: MySqlPool,
}

impl MySqlDestinationRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DestinationRow {
    id: u64,
    name: String,
    country: String,
    description: Option<String>,
    category: Option<String>,
    rating: f64,
    image_url: Option<String>,
}

impl From<DestinationRow> for Destination {
    fn from(row: DestinationRow) -> Self {
        Destination {
            id: row.id,
            name: row.name,
            country: row.country,
            description: row.description,
            category: row.category,
            rating: row.rating,
            image_url: row.image_url,
        }
    }
}

const DESTINATION_COLUMNS: &str = "id, name, country, description, category, rating, image_url";

fn destination_from_input(id: u64, input: DestinationInput) -> Destination {
    Destination {
        id,
        name: input.name,
        country: input.country,
        description: input.description,
        category: input.category,
        rating: input.rating,
        image_url: input.image_url,
    }
}

#[async_trait]
impl DestinationRepository for MySqlDestinationRepository {
    async fn list_destinations(&self) -> CoreResult<Vec<Destination>> {
        let rows = sqlx::query_as::<_, DestinationRow>(&format!(
            "SELECT {} FROM destinations ORDER BY rating DESC, id",
            DESTINATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        Ok(rows.into_iter().map(Destination::from).collect())
    }

    async fn get_destination(&self, id: u64) -> CoreResult<Option<Destination>> {
        let row = sqlx::query_as::<_, DestinationRow>(&format!(
            "SELECT {} FROM destinations WHERE id = ?",
            DESTINATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        Ok(row.map(Destination::from))
    }

    async fn create_destination(&self, input: DestinationInput) -> CoreResult<Destination> {
        let result = sqlx::query(
            "INSERT INTO destinations (name, country, description, category, rating, image_url) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.country)
        .bind(&input.description)
        .bind(&input.category)
        .bind(input.rating)
        .bind(&input.image_url)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("Destination", e))?;

        Ok(destination_from_input(result.last_insert_id(), input))
    }

    async fn update_destination(&self, id: u64, input: DestinationInput) -> CoreResult<Option<Destination>> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        let exists = sqlx::query_scalar::<_, u64>("SELECT id FROM destinations WHERE id = ? FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(internal)?;
        if exists.is_none() {
            return Ok(None);
        }

        sqlx::query(
            "UPDATE destinations SET name = ?, country = ?, description = ?, category = ?, rating = ?, image_url = ? WHERE id = ?",
        )
        .bind(&input.name)
        .bind(&input.country)
        .bind(&input.description)
        .bind(&input.category)
        .bind(input.rating)
        .bind(&input.image_url)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Destination", e))?;

        tx.commit().await.map_err(internal)?;
        Ok(Some(destination_from_input(id, input)))
    }

    async fn delete_destination(&self, id: u64) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM destinations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;

        Ok(result.rows_affected() > 0)
    }

    async fn search_destinations(&self, search: &DestinationSearch) -> CoreResult<Vec<Destination>> {
        let mut qb = destination_search_query(search);

        let rows = qb
            .build_query_as::<DestinationRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;

        Ok(rows.into_iter().map(Destination::from).collect())
    }
}

fn destination_search_query(search: &DestinationSearch) -> QueryBuilder<'static, MySql> {
    let mut qb: QueryBuilder<MySql> = QueryBuilder::new(format!(
        "SELECT {} FROM destinations WHERE 1 = 1",
        DESTINATION_COLUMNS
    ));

    if let Some(query) = &search.query {
        let pattern = contains_pattern(query);
        qb.push(" AND (name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR description LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(country) = &search.country {
        qb.push(" AND country LIKE ").push_bind(contains_pattern(country));
    }
    if let Some(category) = &search.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    qb.push(" ORDER BY rating DESC LIMIT ").push_bind(DESTINATION_SEARCH_LIMIT as u64);
    qb
}

// ============================================================================
// Packages
// ============================================================================

pub struct MySqlPackageRepository {
    pool: MySqlPool,
}

impl MySqlPackageRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PackageRow {
    id: u64,
    destination_id: Option<u64>,
    title: String,
    description: Option<String>,
    duration_days: u32,
    price: f64,
    discounted_price: Option<f64>,
    rating: f64,
    image_url: Option<String>,
}

impl From<PackageRow> for Package {
    fn from(row: PackageRow) -> Self {
        Package {
            id: row.id,
            destination_id: row.destination_id,
            title: row.title,
            description: row.description,
            duration_days: row.duration_days,
            price: row.price,
            discounted_price: row.discounted_price,
            rating: row.rating,
            image_url: row.image_url,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PackageImageRow {
    id: u64,
    package_id: u64,
    image_url: String,
    caption: Option<String>,
}

#[derive(sqlx::FromRow)]
struct PackageItemRow {
    id: u64,
    package_id: u64,
    description: String,
}

#[derive(sqlx::FromRow)]
struct ItineraryRow {
    id: u64,
    package_id: u64,
    day_number: u32,
    title: String,
    description: Option<String>,
    activities: Option<String>,
}

#[derive(sqlx::FromRow)]
struct AccommodationRow {
    id: u64,
    package_id: u64,
    hotel_name: String,
    location: Option<String>,
    nights: u32,
    room_type: Option<String>,
}

#[derive(sqlx::FromRow)]
struct FaqRow {
    id: u64,
    package_id: u64,
    question: String,
    answer: String,
}

const PACKAGE_COLUMNS: &str =
    "id, destination_id, title, description, duration_days, price, discounted_price, rating, image_url";

impl MySqlPackageRepository {
    async fn items(&self, table: &str, package_id: u64) -> CoreResult<Vec<PackageItem>> {
        let rows = sqlx::query_as::<_, PackageItemRow>(&format!(
            "SELECT id, package_id, description FROM {} WHERE package_id = ? ORDER BY id",
            table
        ))
        .bind(package_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        Ok(rows
            .into_iter()
            .map(|r| PackageItem {
                id: r.id,
                package_id: r.package_id,
                description: r.description,
            })
            .collect())
    }
}

#[async_trait]
impl PackageRepository for MySqlPackageRepository {
    async fn list_packages(&self, destination_id: Option<u64>) -> CoreResult<Vec<Package>> {
        let rows = match destination_id {
            Some(destination_id) => sqlx::query_as::<_, PackageRow>(&format!(
                "SELECT {} FROM packages WHERE destination_id = ? ORDER BY rating DESC, id",
                PACKAGE_COLUMNS
            ))
            .bind(destination_id)
            .fetch_all(&self.pool)
            .await,
            None => sqlx::query_as::<_, PackageRow>(&format!(
                "SELECT {} FROM packages ORDER BY rating DESC, id",
                PACKAGE_COLUMNS
            ))
            .fetch_all(&self.pool)
            .await,
        }
        .map_err(internal)?;

        Ok(rows.into_iter().map(Package::from).collect())
    }

    async fn get_package(&self, id: u64) -> CoreResult<Option<Package>> {
        let row = sqlx::query_as::<_, PackageRow>(&format!(
            "SELECT {} FROM packages WHERE id = ?",
            PACKAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        Ok(row.map(Package::from))
    }

    async fn create_package(&self, package: NewPackage) -> CoreResult<Package> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        let result = sqlx::query(
            r#"
            INSERT INTO packages (destination_id, title, description, duration_days, price, discounted_price, rating, image_url)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(package.destination_id)
        .bind(&package.title)
        .bind(&package.description)
        .bind(package.duration_days)
        .bind(package.price)
        .bind(package.discounted_price)
        .bind(package.rating)
        .bind(&package.image_url)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Package", e))?;
        let package_id = result.last_insert_id();

        for image in &package.images {
            sqlx::query("INSERT INTO package_images (package_id, image_url, caption) VALUES (?, ?, ?)")
                .bind(package_id)
                .bind(&image.image_url)
                .bind(&image.caption)
                .execute(&mut *tx)
                .await
                .map_err(internal)?;
        }
        for (table, lines) in [
            ("package_inclusions", &package.inclusions),
            ("package_exclusions", &package.exclusions),
        ] {
            for line in lines {
                sqlx::query(&format!("INSERT INTO {} (package_id, description) VALUES (?, ?)", table))
                    .bind(package_id)
                    .bind(line)
                    .execute(&mut *tx)
                    .await
                    .map_err(internal)?;
            }
        }
        for day in &package.itinerary {
            sqlx::query(
                "INSERT INTO package_itinerary (package_id, day_number, title, description, activities) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(package_id)
            .bind(day.day_number)
            .bind(&day.title)
            .bind(&day.description)
            .bind(&day.activities)
            .execute(&mut *tx)
            .await
            .map_err(internal)?;
        }
        for stay in &package.accommodations {
            sqlx::query(
                "INSERT INTO package_accommodations (package_id, hotel_name, location, nights, room_type) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(package_id)
            .bind(&stay.hotel_name)
            .bind(&stay.location)
            .bind(stay.nights)
            .bind(&stay.room_type)
            .execute(&mut *tx)
            .await
            .map_err(internal)?;
        }
        for faq in &package.faqs {
            sqlx::query("INSERT INTO package_faqs (package_id, question, answer) VALUES (?, ?, ?)")
                .bind(package_id)
                .bind(&faq.question)
                .bind(&faq.answer)
                .execute(&mut *tx)
                .await
                .map_err(internal)?;
        }

        tx.commit().await.map_err(internal)?;

        self.get_package(package_id)
            .await?
            .ok_or_else(|| CoreError::Internal(format!("package {} vanished after insert", package_id)))
    }

    async fn package_images(&self, package_id: u64) -> CoreResult<Vec<PackageImage>> {
        let rows = sqlx::query_as::<_, PackageImageRow>(
            "SELECT id, package_id, image_url, caption FROM package_images WHERE package_id = ? ORDER BY id",
        )
        .bind(package_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        Ok(rows
            .into_iter()
            .map(|r| PackageImage {
                id: r.id,
                package_id: r.package_id,
                image_url: r.image_url,
                caption: r.caption,
            })
            .collect())
    }

    async fn package_inclusions(&self, package_id: u64) -> CoreResult<Vec<PackageItem>> {
        self.items("package_inclusions", package_id).await
    }

    async fn package_exclusions(&self, package_id: u64) -> CoreResult<Vec<PackageItem>> {
        self.items("package_exclusions", package_id).await
    }

    async fn package_itinerary(&self, package_id: u64) -> CoreResult<Vec<ItineraryDay>> {
        let rows = sqlx::query_as::<_, ItineraryRow>(
            "SELECT id, package_id, day_number, title, description, activities FROM package_itinerary WHERE package_id = ? ORDER BY day_number, id",
        )
        .bind(package_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        Ok(rows
            .into_iter()
            .map(|r| ItineraryDay {
                id: r.id,
                package_id: r.package_id,
                day_number: r.day_number,
                title: r.title,
                description: r.description,
                activities: r.activities,
            })
            .collect())
    }

    async fn package_accommodations(&self, package_id: u64) -> CoreResult<Vec<Accommodation>> {
        let rows = sqlx::query_as::<_, AccommodationRow>(
            "SELECT id, package_id, hotel_name, location, nights, room_type FROM package_accommodations WHERE package_id = ? ORDER BY id",
        )
        .bind(package_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        Ok(rows
            .into_iter()
            .map(|r| Accommodation {
                id: r.id,
                package_id: r.package_id,
                hotel_name: r.hotel_name,
                location: r.location,
                nights: r.nights,
                room_type: r.room_type,
            })
            .collect())
    }

    async fn package_faqs(&self, package_id: u64) -> CoreResult<Vec<Faq>> {
        let rows = sqlx::query_as::<_, FaqRow>(
            "SELECT id, package_id, question, answer FROM package_faqs WHERE package_id = ? ORDER BY id",
        )
        .bind(package_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        Ok(rows
            .into_iter()
            .map(|r| Faq {
                id: r.id,
                package_id: r.package_id,
                question: r.question,
                answer: r.answer,
            })
            .collect())
    }
}
