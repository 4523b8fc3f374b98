use chrono::{DateTime, Days, NaiveDate, Utc};
use hotel_core::text::fold_diacritics;
use hotel_core::{NewReservation, PricingCalculator, ReservationStatus, RoomTypeId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const DEMO_GUESTS: [&str; 8] = [
    "Juan Pérez",
    "María García",
    "Carlos López",
    "Ana Martínez",
    "Pedro Rodríguez",
    "Laura Fernández",
    "Diego Silva",
    "Sofía Torres",
];

const LOOKBACK_DAYS: u64 = 180;
const MAX_DEMO_NIGHTS: u64 = 7;

/// Generates `count` confirmed reservations with check-ins over the last
/// six months. The same seed always yields the same reservations.
pub fn demo_reservations(
    calculator: &PricingCalculator,
    count: usize,
    seed: u64,
    now: DateTime<Utc>,
) -> Vec<NewReservation> {
    let mut rng = StdRng::seed_from_u64(seed);
    let today = now.date_naive();
    let rooms = calculator.catalog().ids().collect::<Vec<_>>();
    if rooms.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let guest_name =
            fold_diacritics(DEMO_GUESTS.choose(&mut rng).copied().unwrap_or("Huesped"));
        let first_name = guest_name
            .split_whitespace()
            .next()
            .unwrap_or("huesped")
            .to_lowercase();
        let room_type = *rooms.choose(&mut rng).unwrap_or(&RoomTypeId::Matrimonial);
        let Some((check_in, check_out)) = demo_stay(&mut rng, today) else {
            continue;
        };
        let Ok(quote) = calculator.quote_dates(room_type, check_in, check_out) else {
            continue;
        };
        let capacity = calculator
            .catalog()
            .get(room_type)
            .map(|room| room.capacity)
            .unwrap_or(1);

        out.push(NewReservation {
            email: format!("{}@email.com", first_name),
            phone: format!("+54 9 3537 {}", rng.gen_range(100_000..=999_999)),
            guest_name,
            room_type,
            check_in,
            check_out,
            guests: rng.gen_range(1..=capacity.max(1)),
            total_price: quote.total_price,
            status: ReservationStatus::Confirmed,
            created_at: now,
        });
    }
    out
}

fn demo_stay(rng: &mut StdRng, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let check_in = today.checked_sub_days(Days::new(rng.gen_range(0..=LOOKBACK_DAYS)))?;
    let check_out = check_in.checked_add_days(Days::new(rng.gen_range(1..=MAX_DEMO_NIGHTS)))?;
    Some((check_in, check_out))
}
