use std::fmt::Write as _;

use hotel_core::{ChatMessage, ChatRole, RoomCatalog};
use serde::{Deserialize, Serialize};

/// Number of earlier chat messages forwarded to the model.
pub const HISTORY_WINDOW: usize = 10;

pub const ASSISTANT_NAME: &str = "BellBot";
const USER_LABEL: &str = "Usuario";

/// Static facts about the hotel the assistant may quote to guests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelProfile {
    pub name: String,
    pub location: String,
    pub address: String,
    pub services: Vec<String>,
    pub check_in_time: String,
    pub check_out_time: String,
    pub policies: Vec<String>,
    pub seasons: Vec<String>,
    pub payment_methods: Vec<String>,
}

impl Default for HotelProfile {
    fn default() -> Self {
        Self {
            name: "Gran Hotel Bell Ville".to_string(),
            location: "Bell Ville, Córdoba, Argentina".to_string(),
            address: "Av. San Martín 123, Bell Ville".to_string(),
            services: strings(&[
                "WiFi gratuito en todas las áreas",
                "Desayuno buffet incluido (7:00 - 10:00 hs)",
                "Estacionamiento gratuito",
                "Servicio de limpieza diario",
                "Recepción 24 horas",
                "Piscina climatizada",
                "Gimnasio",
                "Sala de conferencias",
            ]),
            check_in_time: "14:00 hs".to_string(),
            check_out_time: "10:00 hs".to_string(),
            policies: strings(&[
                "Cancelación gratuita hasta 48 hs antes del check-in",
                "Se requiere tarjeta de crédito para garantizar la reserva",
                "No se permiten mascotas",
                "Niños menores de 5 años no pagan",
            ]),
            seasons: strings(&[
                "Temporada alta: diciembre a febrero, Semana Santa y feriados largos",
                "Temporada baja: resto del año",
            ]),
            payment_methods: strings(&[
                "Efectivo",
                "Tarjetas de débito y crédito (Visa, Mastercard, American Express)",
                "Transferencia bancaria",
            ]),
        }
    }
}

impl HotelProfile {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.name);
        let _ = writeln!(out, "Ubicación: {}", self.location);
        let _ = writeln!(out, "Dirección: {}", self.address);
        section(&mut out, "SERVICIOS", &self.services);
        section(
            &mut out,
            "HORARIOS",
            &[
                format!("Check-in: {}", self.check_in_time),
                format!("Check-out: {}", self.check_out_time),
            ],
        );
        section(&mut out, "POLÍTICAS", &self.policies);
        section(&mut out, "TEMPORADAS", &self.seasons);
        section(&mut out, "FORMAS DE PAGO", &self.payment_methods);
        out
    }
}

pub fn build_system_prompt(profile: &HotelProfile, catalog: &RoomCatalog) -> String {
    let catalog_json =
        serde_json::to_string_pretty(catalog).unwrap_or_else(|_| "{}".to_string());

    format!(
        "Sos {assistant}, el asistente virtual de {hotel} en {location}. \
Sos amable, profesional y eficiente.

INFORMACIÓN DEL HOTEL:
{info}
TIPOS DE HABITACIONES DISPONIBLES (tarifas por noche):
{catalog_json}

INSTRUCCIONES:
1. Saludá cordialmente y ofrecé ayuda.
2. Si preguntan por habitaciones, describí las opciones con sus características y precios.
3. Para reservar pedí: nombre, email, teléfono, tipo de habitación, fechas de check-in y check-out y cantidad de huéspedes.
4. Los precios dependen de la temporada de cada noche; verificá las fechas.
5. Respondé sobre servicios, políticas y ubicación.
6. Si no tenés la información, decilo con honestidad y ofrecé contactar a recepción.
7. Mantené un tono profesional y cercano.
8. Respondé siempre en español rioplatense.

SOBRE IMÁGENES:
- El sistema muestra fotos de las habitaciones automáticamente.
- No anuncies ni menciones imágenes o fotos; describí la habitación directamente.
",
        assistant = ASSISTANT_NAME,
        hotel = profile.name,
        location = profile.location,
        info = profile.render(),
    )
}

/// Renders the system prompt, the tail of the conversation and the new
/// message as one text block ending with the assistant's turn.
pub fn build_conversation_prompt(
    system_prompt: &str,
    history: &[ChatMessage],
    message: &str,
) -> String {
    let mut prompt = String::with_capacity(system_prompt.len() + 512);
    prompt.push_str(system_prompt);
    prompt.push_str("\n\nCONVERSACIÓN:\n");

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    for entry in &history[start..] {
        let label = match entry.role {
            ChatRole::User => USER_LABEL,
            ChatRole::Assistant => ASSISTANT_NAME,
        };
        let _ = writeln!(prompt, "{}: {}", label, entry.content);
    }

    let _ = write!(prompt, "{}: {}\n{}:", USER_LABEL, message, ASSISTANT_NAME);
    prompt
}

fn section(out: &mut String, title: &str, lines: &[String]) {
    let _ = writeln!(out, "\n{}:", title);
    for line in lines {
        let _ = writeln!(out, "- {}", line);
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
