use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hotel {
    pub id: u64,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub price_range: String,
    pub price_per_night: f64,
    pub rating: f64,
    pub amenities: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewHotel {
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub price_range: String,
    pub price_per_night: f64,
    #[serde(default)]
    pub rating: f64,
    pub amenities: Option<String>,
    pub image_url: Option<String>,
}

impl NewHotel {
    pub fn validate(&self) -> CoreResult<()> {
        require_text("name", &self.name)?;
        require_text("location", &self.location)?;
        if self.price_range.is_empty() || !self.price_range.chars().all(|c| c == '$') {
            return Err(CoreError::Validation(
                "price_range must be one or more '$' characters".to_string(),
            ));
        }
        require_price("price_per_night", self.price_per_night)?;
        require_rating(self.rating)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Destination {
    pub id: u64,
    pub name: String,
    pub country: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub rating: f64,
    pub image_url: Option<String>,
}

/// Create and full-replace payload for destinations.
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationInput {
    pub name: String,
    pub country: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub rating: f64,
    pub image_url: Option<String>,
}

impl DestinationInput {
    pub fn validate(&self) -> CoreResult<()> {
        require_text("name", &self.name)?;
        require_text("country", &self.country)?;
        require_rating(self.rating)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Package {
    pub id: u64,
    pub destination_id: Option<u64>,
    pub title: String,
    pub description: Option<String>,
    pub duration_days: u32,
    pub price: f64,
    pub discounted_price: Option<f64>,
    pub rating: f64,
    pub image_url: Option<String>,
}

impl Package {
    /// The per-person price a booking is charged: the discount when one is set.
    pub fn unit_price(&self) -> f64 {
        self.discounted_price.unwrap_or(self.price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageImage {
    pub id: u64,
    pub package_id: u64,
    pub image_url: String,
    pub caption: Option<String>,
}

/// A line of an inclusion or exclusion list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageItem {
    pub id: u64,
    pub package_id: u64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryDay {
    pub id: u64,
    pub package_id: u64,
    pub day_number: u32,
    pub title: String,
    pub description: Option<String>,
    pub activities: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Accommodation {
    pub id: u64,
    pub package_id: u64,
    pub hotel_name: String,
    pub location: Option<String>,
    pub nights: u32,
    pub room_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Faq {
    pub id: u64,
    pub package_id: u64,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewItineraryDay {
    pub day_number: u32,
    pub title: String,
    pub description: Option<String>,
    pub activities: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccommodation {
    pub hotel_name: String,
    pub location: Option<String>,
    pub nights: u32,
    pub room_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFaq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPackageImage {
    pub image_url: String,
    pub caption: Option<String>,
}

/// A package with its child collections, inserted in one transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPackage {
    pub destination_id: Option<u64>,
    pub title: String,
    pub description: Option<String>,
    pub duration_days: u32,
    pub price: f64,
    pub discounted_price: Option<f64>,
    #[serde(default)]
    pub rating: f64,
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<NewPackageImage>,
    #[serde(default)]
    pub inclusions: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub itinerary: Vec<NewItineraryDay>,
    #[serde(default)]
    pub accommodations: Vec<NewAccommodation>,
    #[serde(default)]
    pub faqs: Vec<NewFaq>,
}

impl NewPackage {
    pub fn validate(&self) -> CoreResult<()> {
        require_text("title", &self.title)?;
        if self.duration_days == 0 {
            return Err(CoreError::Validation("duration_days must be at least 1".to_string()));
        }
        require_price("price", self.price)?;
        if let Some(discounted) = self.discounted_price {
            require_price("discounted_price", discounted)?;
            if discounted > self.price {
                return Err(CoreError::Validation(
                    "discounted_price must not exceed price".to_string(),
                ));
            }
        }
        require_rating(self.rating)
    }
}

/// Everything the package detail screen shows.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PackageDetails {
    pub package: Package,
    pub images: Vec<PackageImage>,
    pub inclusions: Vec<PackageItem>,
    pub exclusions: Vec<PackageItem>,
    pub itinerary: Vec<ItineraryDay>,
    pub accommodations: Vec<Accommodation>,
    pub faqs: Vec<Faq>,
}

fn require_text(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn require_price(field: &str, value: f64) -> CoreResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!("{} must be a non-negative number", field)));
    }
    Ok(())
}

fn require_rating(value: f64) -> CoreResult<()> {
    if !(0.0..=5.0).contains(&value) {
        return Err(CoreError::Validation("rating must be between 0 and 5".to_string()));
    }
    Ok(())
}
