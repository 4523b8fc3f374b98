use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::{BookingRequest, NewReservation, PriceQuote, ReservationStatus, RoomTypeId};
use crate::pricing::{parse_date, PricingCalculator, QuoteError};
use crate::text::{fold_diacritics, normalize_whitespace};

const MAX_NAME_LEN: usize = 120;
const MAX_EMAIL_LEN: usize = 254;
const MAX_PHONE_LEN: usize = 40;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9\-]+(\.[a-z0-9\-]+)*\.[a-z]{2,}$")
        .expect("email pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("field `{field}` exceeds {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
    #[error("invalid email address `{0}`")]
    InvalidEmail(String),
    #[error("room `{room_type}` hosts between 1 and {capacity} guests, got {guests}")]
    InvalidGuestCount {
        room_type: RoomTypeId,
        capacity: u32,
        guests: u32,
    },
    #[error(transparent)]
    Quote(#[from] QuoteError),
}

impl ReservationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::FieldTooLong { .. } => "field_too_long",
            Self::InvalidEmail(_) => "invalid_email",
            Self::InvalidGuestCount { .. } => "invalid_guest_count",
            Self::Quote(_) => "quote_rejected",
        }
    }
}

pub fn normalize_guest_name(raw: &str) -> String {
    normalize_whitespace(&fold_diacritics(raw))
}

pub fn normalize_email(raw: &str) -> String {
    fold_diacritics(raw.trim()).to_lowercase()
}

pub fn normalize_phone(raw: &str) -> String {
    raw.trim().to_string()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Validates, normalizes and prices a booking request.
///
/// Returns the record to persist together with the quote used to price it.
pub fn prepare_reservation(
    calculator: &PricingCalculator,
    request: &BookingRequest,
    now: DateTime<Utc>,
) -> Result<(NewReservation, PriceQuote), ReservationError> {
    let guest_name = required(&request.guest_name, "guest_name")?;
    let email = required(&request.email, "email")?;
    let phone = required(&request.phone, "phone")?;
    let room_type = required(&request.room_type, "room_type")?;
    let check_in = required(&request.check_in, "check_in")?;
    let check_out = required(&request.check_out, "check_out")?;
    let guests = request
        .guests
        .ok_or(ReservationError::MissingField("guests"))?;

    let guest_name = normalize_guest_name(guest_name);
    let email = normalize_email(email);
    let phone = normalize_phone(phone);
    limit("guest_name", &guest_name, MAX_NAME_LEN)?;
    limit("email", &email, MAX_EMAIL_LEN)?;
    limit("phone", &phone, MAX_PHONE_LEN)?;

    if !is_valid_email(&email) {
        return Err(ReservationError::InvalidEmail(email));
    }

    let room_type = RoomTypeId::parse(room_type)
        .ok_or_else(|| QuoteError::UnknownRoomType(room_type.to_string()))?;
    let room = calculator
        .catalog()
        .get(room_type)
        .ok_or_else(|| QuoteError::UnknownRoomType(room_type.as_code().to_string()))?;
    if guests == 0 || guests > room.capacity {
        return Err(ReservationError::InvalidGuestCount {
            room_type,
            capacity: room.capacity,
            guests,
        });
    }

    let check_in = parse_date(check_in)?;
    let check_out = parse_date(check_out)?;
    let quote = calculator.quote_dates(room_type, check_in, check_out)?;

    let reservation = NewReservation {
        guest_name,
        email,
        phone,
        room_type,
        check_in,
        check_out,
        guests,
        total_price: quote.total_price,
        status: ReservationStatus::Confirmed,
        created_at: now,
    };

    Ok((reservation, quote))
}

fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, ReservationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ReservationError::MissingField(field))
}

fn limit(field: &'static str, value: &str, max: usize) -> Result<(), ReservationError> {
    if value.chars().count() > max {
        return Err(ReservationError::FieldTooLong { field, max });
    }
    Ok(())
}
