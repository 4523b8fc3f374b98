use std::fmt::Write as _;

use hotel_core::text::{contains_any, contains_word, match_key};
use hotel_core::RoomCatalog;

use crate::prompt::{HotelProfile, ASSISTANT_NAME};

/// Catalog-backed reply used when no remote model is configured or the
/// remote call fails.
pub fn offline_reply(message: &str, profile: &HotelProfile, catalog: &RoomCatalog) -> String {
    let text = match_key(message);
    let mut sections = Vec::new();

    if contains_any(&text, &["precio", "cuesta", "tarifa", "costo", "temporada", "barat"]) {
        sections.push(rates_section(catalog));
    } else if contains_any(&text, &["habitacion", "cuarto", "tipo", "opciones"]) {
        sections.push(rooms_section(catalog));
    }

    if contains_any(&text, &["check", "ingreso", "salida"])
        || (contains_word(&text, &["hora", "horas", "horario"]) && !text.contains("desayun"))
    {
        sections.push(format!(
            "El check-in es a partir de las {} y el check-out hasta las {}.",
            profile.check_in_time, profile.check_out_time
        ));
    }

    if text.contains("desayun") {
        let breakfast = profile
            .services
            .iter()
            .filter(|service| match_key(service).contains("desayun"))
            .cloned()
            .collect::<Vec<_>>();
        if !breakfast.is_empty() {
            sections.push(format!("{}.", breakfast.join(". ")));
        }
    }

    if contains_any(&text, &["reserv"]) {
        sections.push(
            "Para reservar necesito tu nombre, email, teléfono, tipo de habitación, \
fechas de check-in y check-out y cantidad de huéspedes."
                .to_string(),
        );
    }

    if contains_any(&text, &["pago", "pagar", "tarjeta", "efectivo"]) {
        sections.push(format!(
            "Aceptamos: {}.",
            profile.payment_methods.join(", ")
        ));
    }

    if contains_any(&text, &["direccion", "ubicad", "donde"]) {
        sections.push(format!(
            "Estamos en {} ({}).",
            profile.address, profile.location
        ));
    }

    if sections.is_empty() {
        return format!(
            "¡Hola! Soy {}, el asistente de {}. Puedo contarte sobre nuestras \
habitaciones, tarifas, servicios y ayudarte a reservar. ¿Qué necesitás?",
            ASSISTANT_NAME, profile.name
        );
    }

    sections.join("\n\n")
}

fn rooms_section(catalog: &RoomCatalog) -> String {
    let mut out = String::from("Estas son nuestras habitaciones:");
    for (_, room) in catalog.iter() {
        let _ = write!(
            out,
            "\n- {} (hasta {} personas): {}",
            room.name, room.capacity, room.description
        );
    }
    out
}

fn rates_section(catalog: &RoomCatalog) -> String {
    let mut out = String::from("Tarifas por noche (temporada baja / temporada alta):");
    for (_, room) in catalog.iter() {
        let _ = write!(
            out,
            "\n- {}: ${} / ${}",
            room.name, room.low_season_rate, room.high_season_rate
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(message: &str) -> String {
        offline_reply(message, &HotelProfile::default(), &RoomCatalog::default())
    }

    #[test]
    fn price_questions_list_both_rates() {
        let text = reply("¿Cuánto cuesta una habitación matrimonial?");
        assert!(text.contains("$25000 / $35000"));
        assert!(text.contains("Habitación Doble"));
    }

    #[test]
    fn schedule_questions_mention_check_times() {
        let text = reply("¿A qué hora es el check-in?");
        assert!(text.contains("14:00 hs"));
        assert!(text.contains("10:00 hs"));
    }

    #[test]
    fn breakfast_questions_get_breakfast_hours() {
        let text = reply("¿Qué horario tiene el desayuno?");
        assert!(text.contains("Desayuno buffet incluido (7:00 - 10:00 hs)"));
        assert!(!text.contains("check-in"));

        let text = reply("Ahora quiero saber si sirven desayuno");
        assert!(text.contains("buffet"));
        assert!(!text.contains("check-out"));
    }

    #[test]
    fn unrelated_messages_get_a_greeting() {
        assert!(reply("hola").starts_with("¡Hola! Soy BellBot"));
    }
}
