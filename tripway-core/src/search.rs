use serde::Deserialize;

use crate::catalog::{Destination, Hotel};

pub const HOTEL_SEARCH_LIMIT: usize = 50;
pub const DESTINATION_SEARCH_LIMIT: usize = 10;

/// Query string of `GET /api/hotels/search`. Each present parameter narrows the result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotelSearch {
    pub location: Option<String>,
    #[serde(rename = "priceRange", alias = "price_range")]
    pub price_range: Option<String>,
    #[serde(rename = "minRating", alias = "rating")]
    pub min_rating: Option<f64>,
    pub name: Option<String>,
}

impl HotelSearch {
    /// Drops parameters that were sent empty, so `?location=` does not filter.
    pub fn normalized(self) -> Self {
        Self {
            location: non_blank(self.location),
            price_range: non_blank(self.price_range),
            min_rating: self.min_rating,
            name: non_blank(self.name),
        }
    }

    pub fn matches(&self, hotel: &Hotel) -> bool {
        self.location.as_deref().map_or(true, |l| contains_ci(&hotel.location, l))
            && self.price_range.as_deref().map_or(true, |p| hotel.price_range.starts_with(p))
            && self.min_rating.map_or(true, |r| hotel.rating >= r)
            && self.name.as_deref().map_or(true, |n| contains_ci(&hotel.name, n))
    }
}

/// Query string of `GET /api/destinations/search`. `query` matches name or description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DestinationSearch {
    #[serde(alias = "q")]
    pub query: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
}

impl DestinationSearch {
    pub fn normalized(self) -> Self {
        Self {
            query: non_blank(self.query),
            country: non_blank(self.country),
            category: non_blank(self.category),
        }
    }

    pub fn matches(&self, destination: &Destination) -> bool {
        let query_hit = self.query.as_deref().map_or(true, |q| {
            contains_ci(&destination.name, q)
                || destination
                    .description
                    .as_deref()
                    .is_some_and(|d| contains_ci(d, q))
        });
        query_hit
            && self.country.as_deref().map_or(true, |c| contains_ci(&destination.country, c))
            && self.category.as_deref().map_or(true, |c| {
                destination
                    .category
                    .as_deref()
                    .is_some_and(|dc| dc.eq_ignore_ascii_case(c))
            })
    }
}

/// Escapes LIKE metacharacters so user input only ever matches literally.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `%value%`
pub fn contains_pattern(value: &str) -> String {
    format!("%{}%", escape_like(value))
}

/// `value%`
pub fn prefix_pattern(value: &str) -> String {
    format!("{}%", escape_like(value))
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
