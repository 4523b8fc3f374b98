use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::Datelike;
use serde::Serialize;

use crate::models::{Reservation, RoomTypeId};

/// Rooms in the building, used for the occupancy estimate.
pub const HOTEL_ROOM_COUNT: u32 = 29;
pub const OCCUPANCY_PERIOD_DAYS: u32 = 30;
const SHORT_STAY_NIGHTS: f64 = 2.0;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTotals {
    pub reservations: usize,
    pub revenue_total: u64,
    pub revenue_mean: f64,
    pub mean_stay_nights: f64,
    pub occupancy_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomTypeStats {
    pub room_type: RoomTypeId,
    pub reservations: usize,
    pub revenue_total: u64,
    pub revenue_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthStats {
    pub month: u32,
    pub reservations: usize,
    pub revenue_total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuestCountStats {
    pub guests: u32,
    pub reservations: usize,
    pub mean_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationReport {
    pub totals: ReportTotals,
    pub by_room_type: Vec<RoomTypeStats>,
    pub by_month: Vec<MonthStats>,
    pub by_guest_count: Vec<GuestCountStats>,
    pub most_profitable: Option<RoomTypeStats>,
    pub recommendations: Vec<String>,
}

pub fn build_report(reservations: &[Reservation]) -> ReservationReport {
    let count = reservations.len();
    let revenue_total = reservations.iter().map(|r| r.total_price).sum::<u64>();
    let booked_nights = reservations.iter().map(|r| r.nights().max(0)).sum::<i64>();

    let totals = ReportTotals {
        reservations: count,
        revenue_total,
        revenue_mean: mean(revenue_total as f64, count),
        mean_stay_nights: mean(booked_nights as f64, count),
        occupancy_percent: occupancy_percent(booked_nights),
    };

    let mut rooms: BTreeMap<RoomTypeId, (usize, u64)> = BTreeMap::new();
    let mut months: BTreeMap<u32, (usize, u64)> = BTreeMap::new();
    let mut guests: BTreeMap<u32, (usize, u64)> = BTreeMap::new();
    for reservation in reservations {
        bump(rooms.entry(reservation.room_type).or_default(), reservation.total_price);
        bump(months.entry(reservation.check_in.month()).or_default(), reservation.total_price);
        bump(guests.entry(reservation.guests).or_default(), reservation.total_price);
    }

    let by_room_type = rooms
        .into_iter()
        .map(|(room_type, (reservations, revenue_total))| RoomTypeStats {
            room_type,
            reservations,
            revenue_total,
            revenue_mean: mean(revenue_total as f64, reservations),
        })
        .collect::<Vec<_>>();

    let by_month = months
        .into_iter()
        .map(|(month, (reservations, revenue_total))| MonthStats {
            month,
            reservations,
            revenue_total,
        })
        .collect::<Vec<_>>();

    let by_guest_count = guests
        .into_iter()
        .map(|(guests, (reservations, revenue_total))| GuestCountStats {
            guests,
            reservations,
            mean_price: mean(revenue_total as f64, reservations),
        })
        .collect::<Vec<_>>();

    let most_profitable = first_max(&by_room_type, |stats| stats.revenue_total).cloned();
    let recommendations = recommendations(&totals, &by_room_type, &by_month);

    ReservationReport {
        totals,
        by_room_type,
        by_month,
        by_guest_count,
        most_profitable,
        recommendations,
    }
}

fn recommendations(
    totals: &ReportTotals,
    by_room_type: &[RoomTypeStats],
    by_month: &[MonthStats],
) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(popular) = first_max(by_room_type, |stats| stats.reservations) {
        out.push(format!(
            "Room type '{}' is the most booked; consider adding more of it.",
            popular.room_type
        ));
    }

    if let Some(peak) = first_max(by_month, |stats| stats.reservations) {
        out.push(format!(
            "{} has the highest demand; apply dynamic pricing during high season.",
            month_name(peak.month)
        ));
    }

    if totals.reservations > 0 && totals.mean_stay_nights < SHORT_STAY_NIGHTS {
        out.push(format!(
            "Average stay is short ({:.1} nights); offer discounted packages for longer stays.",
            totals.mean_stay_nights
        ));
    }

    if totals.reservations > 0 {
        out.push(format!(
            "Average booking value is ${:.2}; tune prices to demand and season.",
            totals.revenue_mean
        ));
    }

    out
}

pub fn render_text(report: &ReservationReport) -> String {
    let mut out = String::new();
    let rule = "-".repeat(70);

    let _ = writeln!(out, "{}", "=".repeat(70));
    let _ = writeln!(out, "RESERVATION REPORT");
    let _ = writeln!(out, "{}", "=".repeat(70));

    let totals = &report.totals;
    let _ = writeln!(out, "\nOVERVIEW\n{rule}");
    let _ = writeln!(out, "Reservations:        {}", totals.reservations);
    let _ = writeln!(out, "Total revenue:       ${}", totals.revenue_total);
    let _ = writeln!(out, "Average revenue:     ${:.2}", totals.revenue_mean);
    let _ = writeln!(out, "Average stay:        {:.1} nights", totals.mean_stay_nights);
    let _ = writeln!(out, "Occupancy:           {:.1}%", totals.occupancy_percent);

    let _ = writeln!(out, "\nBY ROOM TYPE\n{rule}");
    for stats in &report.by_room_type {
        let _ = writeln!(
            out,
            "{:<22} {:>6} bookings  ${:>12}  avg ${:>12.2}",
            stats.room_type.as_code(),
            stats.reservations,
            stats.revenue_total,
            stats.revenue_mean
        );
    }

    let _ = writeln!(out, "\nDEMAND BY MONTH\n{rule}");
    for stats in &report.by_month {
        let _ = writeln!(
            out,
            "{:<12} {:>6} bookings  ${:>12}",
            month_name(stats.month),
            stats.reservations,
            stats.revenue_total
        );
    }

    let _ = writeln!(out, "\nBY GUEST COUNT\n{rule}");
    for stats in &report.by_guest_count {
        let _ = writeln!(
            out,
            "{:<3} guests {:>6} bookings  avg ${:>12.2}",
            stats.guests, stats.reservations, stats.mean_price
        );
    }

    if let Some(best) = &report.most_profitable {
        let _ = writeln!(out, "\nMOST PROFITABLE ROOM TYPE\n{rule}");
        let _ = writeln!(out, "Type: {}", best.room_type);
        let _ = writeln!(out, "Total revenue: ${}", best.revenue_total);
    }

    let _ = writeln!(out, "\nRECOMMENDATIONS\n{rule}");
    if report.recommendations.is_empty() {
        let _ = writeln!(out, "No reservations recorded yet.");
    }
    for (index, line) in report.recommendations.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, line);
    }

    out
}

pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|index| MONTH_NAMES.get(index as usize))
        .copied()
        .unwrap_or("Unknown")
}

fn occupancy_percent(booked_nights: i64) -> f64 {
    let capacity = f64::from(HOTEL_ROOM_COUNT * OCCUPANCY_PERIOD_DAYS);
    (booked_nights as f64 / capacity * 100.0).min(100.0)
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn bump(slot: &mut (usize, u64), price: u64) {
    slot.0 += 1;
    slot.1 += price;
}

// Ties resolve to the earliest entry.
fn first_max<T, K: Ord>(items: &[T], key: impl Fn(&T) -> K) -> Option<&T> {
    let mut best: Option<(&T, K)> = None;
    for item in items {
        let value = key(item);
        match &best {
            Some((_, current)) if value <= *current => {}
            _ => best = Some((item, value)),
        }
    }
    best.map(|(item, _)| item)
}
