use std::time::Duration;

use anyhow::{Context, Result};
use hotel_core::text::match_key;
use serde::Serialize;
use serde_json::json;

/// Questions paired with keywords a correct answer mentions at least once.
pub const CHAT_DATASET: &[(&str, &[&str])] = &[
    // hotel basics
    ("¿Cuál es la dirección del hotel?", &["San Martín", "123", "Bell Ville"]),
    ("¿Dónde está ubicado el hotel?", &["Bell Ville", "Córdoba", "Argentina"]),
    ("¿Tienen WiFi?", &["WiFi", "gratuito", "gratis"]),
    ("¿El WiFi es gratis?", &["gratuito", "gratis", "incluido"]),
    // schedules
    ("¿A qué hora es el check-in?", &["14:00", "14", "dos de la tarde"]),
    ("¿A qué hora es el check-out?", &["10:00", "10", "diez de la mañana"]),
    ("¿Qué horario tiene el desayuno?", &["7:00", "10:00", "buffet"]),
    // rooms
    ("¿Qué tipos de habitaciones tienen?", &["matrimonial", "doble", "triple"]),
    ("¿Tienen habitación matrimonial?", &["matrimonial", "cama matrimonial", "2 plazas"]),
    ("¿Tienen habitación doble?", &["doble", "dos camas", "individuales"]),
    ("¿Tienen habitación triple?", &["triple", "tres", "3"]),
    ("¿Cuántas personas caben en una habitación matrimonial?", &["2", "dos"]),
    // prices
    (
        "¿Cuánto cuesta una habitación matrimonial?",
        &["25000", "35000", "precio", "temporada"],
    ),
    ("¿Cuánto cuesta la habitación más barata?", &["matrimonial", "25000", "precio"]),
    (
        "¿Cuál es la diferencia entre temporada alta y baja?",
        &["temporada", "alta", "baja", "precio"],
    ),
    // services
    ("¿Tienen estacionamiento?", &["estacionamiento", "gratuito", "gratis"]),
    ("¿Tienen piscina?", &["piscina", "climatizada"]),
    ("¿Tienen gimnasio?", &["gimnasio"]),
    ("¿Sirven desayuno?", &["desayuno", "buffet", "incluido"]),
    ("¿Tienen recepción 24 horas?", &["24 horas", "recepción"]),
    // policies
    ("¿Cuál es la política de cancelación?", &["cancelación", "48", "horas"]),
    ("¿Permiten mascotas?", &["mascotas", "no"]),
    ("¿Los niños pagan?", &["niños", "5 años", "no pagan"]),
    ("¿Necesito tarjeta de crédito?", &["tarjeta", "crédito", "garantizar"]),
    // payment
    ("¿Qué formas de pago aceptan?", &["efectivo", "tarjeta", "crédito"]),
    (
        "¿Puedo pagar con tarjeta?",
        &["tarjeta", "débito", "crédito", "Visa", "Mastercard"],
    ),
    // booking
    ("¿Cómo hago una reserva?", &["reserva", "nombre", "email", "fechas"]),
    (
        "¿Qué información necesito para reservar?",
        &["nombre", "email", "teléfono", "fechas"],
    ),
    // general
    ("¿Tienen sala de conferencias?", &["sala", "conferencias"]),
    ("¿El hotel tiene aire acondicionado?", &["aire acondicionado", "todas"]),
    ("¿Las habitaciones tienen baño privado?", &["baño", "privado", "todas"]),
];

#[derive(Debug, Clone, Serialize)]
pub struct EvalCase {
    pub question: String,
    pub correct: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalSummary {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub cases: Vec<EvalCase>,
}

impl EvalSummary {
    fn from_cases(cases: Vec<EvalCase>) -> Self {
        let total = cases.len();
        let correct = cases.iter().filter(|case| case.correct).count();
        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 * 100.0 / total as f64
        };
        Self {
            total,
            correct,
            accuracy,
            cases,
        }
    }
}

/// Case- and accent-insensitive check that the reply mentions any keyword.
pub fn reply_matches(reply: &str, keywords: &[&str]) -> bool {
    let reply = match_key(reply);
    keywords
        .iter()
        .any(|keyword| reply.contains(&match_key(keyword)))
}

pub async fn run_chat_eval(api_url: &str) -> Result<EvalSummary> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed building http client")?;
    let url = format!("{}/v1/chat", api_url.trim_end_matches('/'));

    let mut cases = Vec::with_capacity(CHAT_DATASET.len());
    for (question, keywords) in CHAT_DATASET {
        let outcome = client
            .post(&url)
            .json(&json!({ "message": question, "history": [] }))
            .send()
            .await;

        let case = match outcome {
            Ok(response) if response.status().is_success() => {
                let body: serde_json::Value = response
                    .json()
                    .await
                    .context("chat reply was not valid json")?;
                let reply = body
                    .get("response")
                    .and_then(|value| value.as_str())
                    .unwrap_or_default();
                EvalCase {
                    question: question.to_string(),
                    correct: reply_matches(reply, keywords),
                    detail: reply.chars().take(150).collect(),
                }
            }
            Ok(response) => EvalCase {
                question: question.to_string(),
                correct: false,
                detail: format!("http status {}", response.status()),
            },
            Err(error) => EvalCase {
                question: question.to_string(),
                correct: false,
                detail: format!("request failed: {error}"),
            },
        };
        cases.push(case);
    }

    Ok(EvalSummary::from_cases(cases))
}
