use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomTypeId {
    Matrimonial,
    Doble,
    TripleMatrimonial,
    TripleIndividual,
}

impl RoomTypeId {
    pub const ALL: [RoomTypeId; 4] = [
        Self::Matrimonial,
        Self::Doble,
        Self::TripleMatrimonial,
        Self::TripleIndividual,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "matrimonial" => Some(Self::Matrimonial),
            "doble" => Some(Self::Doble),
            "triple_matrimonial" => Some(Self::TripleMatrimonial),
            "triple_individual" => Some(Self::TripleIndividual),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Matrimonial => "matrimonial",
            Self::Doble => "doble",
            Self::TripleMatrimonial => "triple_matrimonial",
            Self::TripleIndividual => "triple_individual",
        }
    }
}

impl fmt::Display for RoomTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomType {
    pub name: String,
    pub capacity: u32,
    pub low_season_rate: u64,
    pub high_season_rate: u64,
    pub description: String,
}

impl RoomType {
    pub fn rate_for(&self, season: Season) -> u64 {
        match season {
            Season::High => self.high_season_rate,
            Season::Low => self.low_season_rate,
        }
    }
}

/// Room types offered by the hotel, keyed by identifier.
///
/// Loaded once at startup and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCatalog {
    rooms: BTreeMap<RoomTypeId, RoomType>,
}

impl RoomCatalog {
    pub fn new(rooms: BTreeMap<RoomTypeId, RoomType>) -> Self {
        Self { rooms }
    }

    pub fn get(&self, id: RoomTypeId) -> Option<&RoomType> {
        self.rooms.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = RoomTypeId> + '_ {
        self.rooms.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RoomTypeId, &RoomType)> {
        self.rooms.iter().map(|(id, room)| (*id, room))
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

impl Default for RoomCatalog {
    fn default() -> Self {
        let mut rooms = BTreeMap::new();
        rooms.insert(
            RoomTypeId::Matrimonial,
            room(
                "Habitación Matrimonial",
                2,
                25_000,
                35_000,
                "Cama matrimonial de 2 plazas, baño privado, TV, aire acondicionado y WiFi",
            ),
        );
        rooms.insert(
            RoomTypeId::Doble,
            room(
                "Habitación Doble",
                2,
                28_000,
                38_000,
                "Dos camas individuales, baño privado, TV, aire acondicionado y WiFi",
            ),
        );
        rooms.insert(
            RoomTypeId::TripleMatrimonial,
            room(
                "Habitación Triple (1 Matrimonial + 1 Simple)",
                3,
                32_000,
                45_000,
                "Habitación amplia con una cama matrimonial y una simple, baño privado, TV, aire acondicionado y WiFi",
            ),
        );
        rooms.insert(
            RoomTypeId::TripleIndividual,
            room(
                "Habitación Triple (3 Individuales)",
                3,
                32_000,
                45_000,
                "Tres camas individuales, baño privado, TV, aire acondicionado y WiFi",
            ),
        );

        Self { rooms }
    }
}

fn room(name: &str, capacity: u32, low: u64, high: u64, description: &str) -> RoomType {
    RoomType {
        name: name.to_string(),
        capacity,
        low_season_rate: low,
        high_season_rate: high,
        description: description.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub nights: u32,
    pub total_price: u64,
    pub average_nightly_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Confirmed,
}

impl ReservationStatus {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "confirmed" | "confirmada" => Some(Self::Confirmed),
            _ => None,
        }
    }
}

/// Raw booking request as submitted by a guest. Every field is optional so
/// missing ones can be reported by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    pub guest_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub room_type: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub guests: Option<u32>,
}

/// A validated, normalized and priced reservation waiting for an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReservation {
    pub guest_name: String,
    pub email: String,
    pub phone: String,
    pub room_type: RoomTypeId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub total_price: u64,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub guest_name: String,
    pub email: String,
    pub phone: String,
    pub room_type: RoomTypeId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub total_price: u64,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn from_new(id: i64, new: NewReservation) -> Self {
        Self {
            id,
            guest_name: new.guest_name,
            email: new.email,
            phone: new.phone,
            room_type: new.room_type,
            check_in: new.check_in,
            check_out: new.check_out,
            guests: new.guests,
            total_price: new.total_price,
            status: new.status,
            created_at: new.created_at,
        }
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    #[serde(alias = "bot", alias = "model")]
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInput {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub images: Vec<RoomTypeId>,
    pub timestamp: DateTime<Utc>,
}
