use crate::models::{RoomCatalog, RoomTypeId};
use crate::text::{contains_any, match_key};

const ROOM_TOPIC_WORDS: &[&str] = &[
    "habitacion",
    "cuarto",
    "tipo",
    "opciones",
    "mostrar",
    "ver",
    "fotos",
];

const ALL_ROOMS_WORDS: &[&str] = &["todas", "tipos", "opciones", "disponibles"];

/// Picks the room photos the front end should show for a guest message.
///
/// Only messages that talk about rooms get a gallery. A message asking for
/// every option without naming a room yields the whole catalog.
pub fn detect_room_gallery(message: &str, catalog: &RoomCatalog) -> Vec<RoomTypeId> {
    let text = match_key(message);
    if !contains_any(&text, ROOM_TOPIC_WORDS) {
        return Vec::new();
    }

    let mut rooms = Vec::new();
    let mentions_triple = text.contains("triple");

    if text.contains("matrimonial") && !mentions_triple {
        rooms.push(RoomTypeId::Matrimonial);
    }
    if text.contains("doble") {
        rooms.push(RoomTypeId::Doble);
    }
    if mentions_triple {
        if contains_any(&text, &["matrimonial", "simple"]) {
            rooms.push(RoomTypeId::TripleMatrimonial);
        }
        if contains_any(&text, &["individual", "tres camas"]) {
            rooms.push(RoomTypeId::TripleIndividual);
        }
    }

    if rooms.is_empty() && contains_any(&text, ALL_ROOMS_WORDS) {
        return catalog.ids().collect();
    }

    rooms.retain(|id| catalog.get(*id).is_some());
    rooms
}
