pub mod catalog;
pub mod gallery;
pub mod models;
pub mod pricing;
pub mod report;
pub mod reservation;
pub mod season;
pub mod text;

pub use catalog::{load_catalog, validate_catalog, CatalogError};
pub use gallery::detect_room_gallery;
pub use models::*;
pub use pricing::{parse_date, PricingCalculator, QuoteError, MAX_NIGHTS};
pub use report::{build_report, render_text, ReservationReport};
pub use reservation::{prepare_reservation, ReservationError};
pub use season::{classify, SeasonCalendar, SeasonRule};
