use chrono::{Days, NaiveDate};
use thiserror::Error;

use crate::models::{PriceQuote, RoomCatalog, RoomTypeId};
use crate::season::SeasonCalendar;

/// Two years; longer spans are treated as input mistakes.
pub const MAX_NIGHTS: i64 = 730;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("unknown room type `{0}`")]
    UnknownRoomType(String),
    #[error("invalid date range {check_in} -> {check_out}: stay must be between 1 and {max} nights", max = MAX_NIGHTS)]
    InvalidDateRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
    #[error("malformed date `{0}`, expected YYYY-MM-DD")]
    MalformedDate(String),
}

impl QuoteError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownRoomType(_) => "unknown_room_type",
            Self::InvalidDateRange { .. } => "invalid_date_range",
            Self::MalformedDate(_) => "malformed_date",
        }
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, QuoteError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| QuoteError::MalformedDate(raw.to_string()))
}

#[derive(Debug, Clone)]
pub struct PricingCalculator {
    catalog: RoomCatalog,
    calendar: SeasonCalendar,
}

impl PricingCalculator {
    pub fn new(catalog: RoomCatalog) -> Self {
        Self::with_calendar(catalog, SeasonCalendar::default())
    }

    pub fn with_calendar(catalog: RoomCatalog, calendar: SeasonCalendar) -> Self {
        Self { catalog, calendar }
    }

    pub fn catalog(&self) -> &RoomCatalog {
        &self.catalog
    }

    pub fn calendar(&self) -> &SeasonCalendar {
        &self.calendar
    }

    /// Prices a stay from raw request values.
    pub fn quote(
        &self,
        room_type: &str,
        check_in: &str,
        check_out: &str,
    ) -> Result<PriceQuote, QuoteError> {
        let room_type = RoomTypeId::parse(room_type)
            .ok_or_else(|| QuoteError::UnknownRoomType(room_type.to_string()))?;
        let check_in = parse_date(check_in)?;
        let check_out = parse_date(check_out)?;

        self.quote_dates(room_type, check_in, check_out)
    }

    /// Sums the nightly rate of every night in `[check_in, check_out)`.
    pub fn quote_dates(
        &self,
        room_type: RoomTypeId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<PriceQuote, QuoteError> {
        let room = self
            .catalog
            .get(room_type)
            .ok_or_else(|| QuoteError::UnknownRoomType(room_type.as_code().to_string()))?;

        let nights = (check_out - check_in).num_days();
        if nights <= 0 || nights > MAX_NIGHTS {
            return Err(QuoteError::InvalidDateRange {
                check_in,
                check_out,
            });
        }

        let total_price = (0..nights as u64)
            .filter_map(|offset| check_in.checked_add_days(Days::new(offset)))
            .map(|night| room.rate_for(self.calendar.classify(night)))
            .sum::<u64>();

        Ok(PriceQuote {
            nights: nights as u32,
            total_price,
            average_nightly_price: total_price as f64 / nights as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> PricingCalculator {
        PricingCalculator::new(RoomCatalog::default())
    }

    #[test]
    fn two_summer_nights_in_matrimonial() {
        let quote = calculator()
            .quote("matrimonial", "2025-01-05", "2025-01-07")
            .unwrap();
        assert_eq!(quote.nights, 2);
        assert_eq!(quote.total_price, 70_000);
        assert_eq!(quote.average_nightly_price, 35_000.0);
    }

    #[test]
    fn three_winter_nights_in_doble() {
        let quote = calculator()
            .quote("doble", "2025-06-01", "2025-06-04")
            .unwrap();
        assert_eq!(quote.nights, 3);
        assert_eq!(quote.total_price, 84_000);
        assert_eq!(quote.average_nightly_price, 28_000.0);
    }

    #[test]
    fn holy_week_night_uses_high_rate() {
        let quote = calculator()
            .quote("triple_matrimonial", "2025-04-15", "2025-04-16")
            .unwrap();
        assert_eq!(quote.nights, 1);
        assert_eq!(quote.total_price, 45_000);
    }

    #[test]
    fn stay_crossing_season_boundary_mixes_rates() {
        // Nov 29, Nov 30 low; Dec 1 high.
        let quote = calculator()
            .quote("matrimonial", "2025-11-29", "2025-12-02")
            .unwrap();
        assert_eq!(quote.total_price, 25_000 * 2 + 35_000);
        assert!((quote.average_nightly_price - 85_000.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_or_reversed_stays_are_rejected() {
        let calc = calculator();
        let same = calc.quote("doble", "2025-06-01", "2025-06-01").unwrap_err();
        assert_eq!(same.kind(), "invalid_date_range");

        let reversed = calc.quote("doble", "2025-06-01", "2025-05-31").unwrap_err();
        assert!(matches!(reversed, QuoteError::InvalidDateRange { .. }));
    }

    #[test]
    fn stays_longer_than_the_cap_are_rejected() {
        let calc = calculator();
        assert!(calc.quote("doble", "2025-01-01", "2027-01-01").is_ok());
        let err = calc.quote("doble", "2025-01-01", "2027-01-03").unwrap_err();
        assert!(matches!(err, QuoteError::InvalidDateRange { .. }));
    }

    #[test]
    fn unknown_room_type_is_rejected() {
        let err = calculator()
            .quote("suite", "2025-06-01", "2025-06-02")
            .unwrap_err();
        assert_eq!(err, QuoteError::UnknownRoomType("suite".to_string()));
    }

    #[test]
    fn room_missing_from_catalog_is_unknown() {
        let catalog: RoomCatalog = RoomCatalog::from_json(
            r#"{"doble": {"name": "Doble", "capacity": 2, "low_season_rate": 10, "high_season_rate": 20, "description": ""}}"#,
        )
        .unwrap();
        let calc = PricingCalculator::new(catalog);
        assert!(calc.quote("doble", "2025-06-01", "2025-06-02").is_ok());
        assert_eq!(
            calc.quote("matrimonial", "2025-06-01", "2025-06-02")
                .unwrap_err()
                .kind(),
            "unknown_room_type"
        );
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let calc = calculator();
        for raw in ["2025/06/01", "2025-13-01", "tomorrow", "", "2025-02-30"] {
            let err = calc.quote("doble", raw, "2025-06-04").unwrap_err();
            assert_eq!(err, QuoteError::MalformedDate(raw.to_string()));
        }
    }

    #[test]
    fn nights_match_day_difference_and_quotes_are_repeatable() {
        let calc = calculator();
        let check_in = NaiveDate::from_ymd_opt(2024, 2, 20).unwrap();
        for span in [1_u64, 5, 17, 40, 365] {
            let check_out = check_in.checked_add_days(Days::new(span)).unwrap();
            let first = calc
                .quote_dates(RoomTypeId::Doble, check_in, check_out)
                .unwrap();
            let second = calc
                .quote_dates(RoomTypeId::Doble, check_in, check_out)
                .unwrap();
            assert_eq!(first.nights as i64, (check_out - check_in).num_days());
            assert_eq!(first, second);
        }
    }
}
