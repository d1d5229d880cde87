use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// A cancelled booking is terminal. Every other move, including a no-op, is allowed.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        !matches!(self, BookingStatus::Cancelled) || next == BookingStatus::Cancelled
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(CoreError::Validation(format!(
                "status must be one of confirmed, pending, cancelled (got '{}')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Unpaid => "unpaid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(PaymentStatus::Paid),
            "unpaid" => Ok(PaymentStatus::Unpaid),
            other => Err(CoreError::Validation(format!(
                "payment_status must be one of paid, unpaid (got '{}')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    #[default]
    Package,
    Hotel,
    Flight,
}

impl BookingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingType::Package => "package",
            BookingType::Hotel => "hotel",
            BookingType::Flight => "flight",
        }
    }
}

impl FromStr for BookingType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "package" => Ok(BookingType::Package),
            "hotel" => Ok(BookingType::Hotel),
            "flight" => Ok(BookingType::Flight),
            other => Err(CoreError::Validation(format!(
                "booking_type must be one of package, hotel, flight (got '{}')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: u64,
    pub booking_id: String,
    pub user_id: u64,
    pub booking_type: BookingType,
    pub package_id: Option<u64>,
    pub hotel_id: Option<u64>,
    pub flight_number: Option<String>,
    pub travel_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub children: u32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub contact_email: Option<String>,
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated booking ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub booking_id: String,
    pub user_id: u64,
    pub booking_type: BookingType,
    pub package_id: Option<u64>,
    pub hotel_id: Option<u64>,
    pub flight_number: Option<String>,
    pub travel_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub children: u32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub contact_email: Option<String>,
    pub special_requests: Option<String>,
}

/// Body of `POST /api/bookings`. Every field is optional at the wire level so that
/// missing ones can be reported together instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBookingRequest {
    pub booking_id: Option<String>,
    pub user_id: Option<u64>,
    pub booking_type: Option<String>,
    pub package_id: Option<u64>,
    pub hotel_id: Option<u64>,
    pub flight_number: Option<String>,
    pub travel_date: Option<String>,
    pub return_date: Option<String>,
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub total_price: Option<f64>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub contact_email: Option<String>,
    pub special_requests: Option<String>,
}

impl CreateBookingRequest {
    pub fn validate(self) -> CoreResult<NewBooking> {
        let booking_type = match self.booking_type.as_deref() {
            Some(t) => t.parse()?,
            None => BookingType::default(),
        };

        let mut missing = Vec::new();
        if self.user_id.is_none() {
            missing.push("user_id");
        }
        if is_blank(&self.travel_date) {
            missing.push("travel_date");
        }
        if self.adults.is_none() {
            missing.push("adults");
        }
        if self.total_price.is_none() {
            missing.push("total_price");
        }
        match booking_type {
            BookingType::Package if self.package_id.is_none() => missing.push("package_id"),
            BookingType::Hotel if self.hotel_id.is_none() => missing.push("hotel_id"),
            BookingType::Flight if is_blank(&self.flight_number) => missing.push("flight_number"),
            _ => {}
        }
        if !missing.is_empty() {
            return Err(CoreError::MissingFields(
                missing.into_iter().map(String::from).collect(),
            ));
        }

        let adults = self.adults.unwrap_or_default();
        if adults == 0 {
            return Err(CoreError::Validation("adults must be at least 1".to_string()));
        }
        let total_price = self.total_price.unwrap_or_default();
        if !total_price.is_finite() || total_price < 0.0 {
            return Err(CoreError::Validation("total_price must be a non-negative number".to_string()));
        }

        let travel_date = parse_date("travel_date", self.travel_date.as_deref().unwrap_or_default())?;
        let return_date = match self.return_date.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(s) => Some(parse_date("return_date", s)?),
            None => None,
        };
        if let Some(ret) = return_date {
            if ret < travel_date {
                return Err(CoreError::Validation("return_date must not precede travel_date".to_string()));
            }
        }

        let status = match self.status.as_deref() {
            Some(s) => s.parse()?,
            None => BookingStatus::Pending,
        };
        let payment_status = match self.payment_status.as_deref() {
            Some(s) => s.parse()?,
            None => PaymentStatus::Unpaid,
        };

        let booking_id = match self.booking_id.filter(|s| !s.trim().is_empty()) {
            Some(id) => id.trim().to_string(),
            None => crate::reference::generate_booking_id(Utc::now()),
        };

        Ok(NewBooking {
            booking_id,
            user_id: self.user_id.unwrap_or_default(),
            booking_type,
            package_id: self.package_id,
            hotel_id: self.hotel_id,
            flight_number: self.flight_number.map(|f| f.trim().to_string()),
            travel_date,
            return_date,
            adults,
            children: self.children.unwrap_or(0),
            total_price,
            status,
            payment_status,
            contact_email: self.contact_email.filter(|s| !s.trim().is_empty()),
            special_requests: self.special_requests,
        })
    }
}

/// Body of `PATCH /api/bookings/{booking_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

impl UpdateBookingStatusRequest {
    pub fn validate(self) -> CoreResult<BookingPatch> {
        if self.status.is_none() && self.payment_status.is_none() {
            return Err(CoreError::Validation(
                "at least one of status or payment_status is required".to_string(),
            ));
        }
        Ok(BookingPatch {
            status: self.status.as_deref().map(str::parse).transpose()?,
            payment_status: self.payment_status.as_deref().map(str::parse).transpose()?,
        })
    }
}

/// Columns to change on an existing booking. Absent fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BookingPatch {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl BookingPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_status.is_none()
    }

    /// Rejects moving a cancelled booking back to a live status.
    pub fn check_against(&self, current: BookingStatus) -> CoreResult<()> {
        match self.status {
            Some(next) if !current.can_transition_to(next) => Err(CoreError::Conflict(format!(
                "booking is {} and cannot become {}",
                current, next
            ))),
            _ => Ok(()),
        }
    }

    pub fn apply(&self, booking: &mut Booking) {
        if let Some(status) = self.status {
            booking.status = status;
        }
        if let Some(payment_status) = self.payment_status {
            booking.payment_status = payment_status;
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true)
}

fn parse_date(field: &str, value: &str) -> CoreResult<NaiveDate> {
    let value = value.trim();
    // Clients send either a plain date or a full ISO timestamp.
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| CoreError::Validation(format!("{} must be a YYYY-MM-DD date", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_request() -> CreateBookingRequest {
        CreateBookingRequest {
            booking_id: Some("BK1700000000000123".to_string()),
            user_id: Some(7),
            package_id: Some(3),
            travel_date: Some("2025-03-14".to_string()),
            adults: Some(2),
            children: Some(1),
            total_price: Some(3186.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_complete_request() {
        let booking = complete_request().validate().expect("valid request");
        assert_eq!(booking.booking_id, "BK1700000000000123");
        assert_eq!(booking.booking_type, BookingType::Package);
        assert_eq!(booking.travel_date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_validate_lists_every_missing_field() {
        let req = CreateBookingRequest {
            user_id: Some(1),
            ..Default::default()
        };
        match req.validate() {
            Err(CoreError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["travel_date", "adults", "total_price", "package_id"]);
            }
            other => panic!("expected missing fields, got {:?}", other),
        }
    }

    #[test]
    fn test_reference_depends_on_booking_type() {
        let mut req = complete_request();
        req.booking_type = Some("hotel".to_string());
        match req.validate() {
            Err(CoreError::MissingFields(fields)) => assert_eq!(fields, vec!["hotel_id"]),
            other => panic!("expected missing hotel_id, got {:?}", other),
        }
    }

    #[test]
    fn test_generates_booking_id_when_absent() {
        let mut req = complete_request();
        req.booking_id = None;
        let booking = req.validate().unwrap();
        assert!(booking.booking_id.starts_with("BK"));
    }

    #[test]
    fn test_accepts_iso_timestamp_dates() {
        let mut req = complete_request();
        req.travel_date = Some("2025-03-14T00:00:00.000Z".to_string());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_rejects_unknown_status() {
        let mut req = complete_request();
        req.status = Some("shipped".to_string());
        assert!(matches!(req.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_patch_requires_a_field() {
        let req = UpdateBookingStatusRequest::default();
        assert!(matches!(req.validate(), Err(CoreError::Validation(_))));

        let patch = UpdateBookingStatusRequest {
            status: Some("Confirmed".to_string()),
            payment_status: None,
        }
        .validate()
        .unwrap();
        assert_eq!(patch.status, Some(BookingStatus::Confirmed));
        assert_eq!(patch.payment_status, None);
    }

    #[test]
    fn test_cancelled_is_terminal() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Confirmed));

        let patch = BookingPatch {
            status: Some(BookingStatus::Confirmed),
            payment_status: None,
        };
        assert!(matches!(
            patch.check_against(BookingStatus::Cancelled),
            Err(CoreError::Conflict(_))
        ));
        assert!(patch.check_against(BookingStatus::Pending).is_ok());
    }
}
