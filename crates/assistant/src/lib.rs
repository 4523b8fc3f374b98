pub mod generator;
pub mod offline;
pub mod prompt;

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use hotel_core::{
    build_report, detect_room_gallery, prepare_reservation, BookingRequest, ChatInput, ChatReply,
    PriceQuote, PricingCalculator, QuoteError, Reservation, ReservationError, ReservationReport,
    RoomCatalog, RoomType, RoomTypeId,
};
use hotel_observability::AppMetrics;
use hotel_storage::ReservationRepository;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

pub use generator::{GeminiClient, GeminiConfig, TextGenerator};
pub use offline::offline_reply;
pub use prompt::{build_conversation_prompt, build_system_prompt, HotelProfile};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub room_type: String,
    pub check_in: String,
    pub check_out: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub reservation: Reservation,
    pub quote: PriceQuote,
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Rejected(#[from] ReservationError),
    #[error("failed to store reservation: {0:#}")]
    Storage(anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,
}

/// Front desk service: pricing, bookings and the chat gateway over one
/// shared catalog.
#[derive(Clone)]
pub struct BookingAssistant<S>
where
    S: ReservationRepository,
{
    calculator: Arc<PricingCalculator>,
    profile: HotelProfile,
    system_prompt: Arc<str>,
    generator: TextGenerator,
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
}

impl<S> BookingAssistant<S>
where
    S: ReservationRepository,
{
    pub fn new(
        catalog: RoomCatalog,
        profile: HotelProfile,
        generator: TextGenerator,
        store: Arc<S>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        let system_prompt = Arc::from(build_system_prompt(&profile, &catalog));
        Self {
            calculator: Arc::new(PricingCalculator::new(catalog)),
            profile,
            system_prompt,
            generator,
            store,
            metrics,
        }
    }

    pub fn catalog(&self) -> &RoomCatalog {
        self.calculator.catalog()
    }

    pub fn room(&self, room_type: &str) -> Option<(RoomTypeId, &RoomType)> {
        let id = RoomTypeId::parse(room_type)?;
        self.catalog().get(id).map(|room| (id, room))
    }

    pub fn profile(&self) -> &HotelProfile {
        &self.profile
    }

    pub fn generator(&self) -> &TextGenerator {
        &self.generator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn quote(&self, request: &QuoteRequest) -> Result<PriceQuote, QuoteError> {
        self.metrics.inc_quote();
        let result =
            self.calculator
                .quote(&request.room_type, &request.check_in, &request.check_out);
        if result.is_err() {
            self.metrics.inc_quote_rejected();
        }
        result
    }

    #[instrument(skip(self, request), fields(room_type = ?request.room_type))]
    pub async fn book(&self, request: BookingRequest) -> Result<BookingConfirmation, BookingError> {
        let (new_reservation, quote) =
            prepare_reservation(&self.calculator, &request, Utc::now()).inspect_err(|error| {
                if matches!(error, ReservationError::Quote(_)) {
                    self.metrics.inc_quote_rejected();
                }
            })?;

        let reservation = self
            .store
            .insert_reservation(new_reservation)
            .await
            .map_err(BookingError::Storage)?;
        self.metrics.inc_reservation();

        info!(
            reservation_id = reservation.id,
            room_type = %reservation.room_type,
            nights = quote.nights,
            total_price = reservation.total_price,
            "reservation confirmed"
        );

        Ok(BookingConfirmation { reservation, quote })
    }

    pub async fn recent_reservations(&self, limit: usize) -> Result<Vec<Reservation>> {
        self.store.recent_reservations(limit).await
    }

    pub async fn report(&self) -> Result<ReservationReport> {
        let reservations = self.store.all_reservations().await?;
        Ok(build_report(&reservations))
    }

    #[instrument(skip(self, input))]
    pub async fn handle_chat(&self, input: ChatInput) -> Result<ChatReply, ChatError> {
        self.metrics.inc_chat();

        let message = input.message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let prompt = build_conversation_prompt(&self.system_prompt, &input.history, message);
        let response = match self.generator.generate(&prompt).await {
            Ok(Some(text)) => text,
            Ok(None) => offline_reply(message, &self.profile, self.catalog()),
            Err(error) => {
                self.metrics.inc_chat_fallback();
                warn!(error = %format!("{error:#}"), generator = %self.generator.name(), "text generation failed, using offline reply");
                offline_reply(message, &self.profile, self.catalog())
            }
        };

        let images = detect_room_gallery(message, self.catalog());
        info!(
            generator = %self.generator.name(),
            history = input.history.len(),
            images = images.len(),
            "chat handled"
        );

        Ok(ChatReply {
            response,
            images,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotel_core::{ChatMessage, ChatRole};
    use hotel_storage::Store;

    fn assistant() -> BookingAssistant<Store> {
        BookingAssistant::new(
            RoomCatalog::default(),
            HotelProfile::default(),
            TextGenerator::Offline,
            Arc::new(Store::memory()),
            AppMetrics::shared(),
        )
    }

    fn booking() -> BookingRequest {
        BookingRequest {
            guest_name: Some("Sofía Torres".to_string()),
            email: Some("Sofia@Email.com".to_string()),
            phone: Some(" +54 9 3537 654321 ".to_string()),
            room_type: Some("triple_matrimonial".to_string()),
            check_in: Some("2025-04-15".to_string()),
            check_out: Some("2025-04-16".to_string()),
            guests: Some(3),
        }
    }

    #[test]
    fn quotes_count_rejections() {
        let metrics = AppMetrics::shared();
        let assistant = BookingAssistant::new(
            RoomCatalog::default(),
            HotelProfile::default(),
            TextGenerator::Offline,
            Arc::new(Store::memory()),
            metrics.clone(),
        );

        let ok = assistant.quote(&QuoteRequest {
            room_type: "doble".to_string(),
            check_in: "2025-06-01".to_string(),
            check_out: "2025-06-04".to_string(),
        });
        assert_eq!(ok.unwrap().total_price, 84_000);

        let rejected = assistant.quote(&QuoteRequest {
            room_type: "doble".to_string(),
            check_in: "2025-06-01".to_string(),
            check_out: "2025-06-01".to_string(),
        });
        assert!(rejected.is_err());

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.quotes_total, 2);
        assert_eq!(snapshot.quotes_rejected_total, 1);
    }

    #[tokio::test]
    async fn booking_persists_normalized_reservation() {
        let assistant = assistant();
        let confirmation = assistant.book(booking()).await.unwrap();

        assert_eq!(confirmation.reservation.id, 1);
        assert_eq!(confirmation.reservation.guest_name, "Sofia Torres");
        assert_eq!(confirmation.reservation.email, "sofia@email.com");
        assert_eq!(confirmation.reservation.total_price, 45_000);
        assert_eq!(confirmation.quote.nights, 1);

        let stored = assistant.recent_reservations(50).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].phone, "+54 9 3537 654321");

        let report = assistant.report().await.unwrap();
        assert_eq!(report.totals.revenue_total, 45_000);
    }

    #[tokio::test]
    async fn rejected_booking_is_not_stored() {
        let assistant = assistant();
        let mut request = booking();
        request.room_type = Some("suite".to_string());

        let err = assistant.book(request).await.unwrap_err();
        assert!(matches!(err, BookingError::Rejected(ReservationError::Quote(_))));
        assert!(assistant.recent_reservations(50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn offline_chat_answers_and_attaches_gallery() {
        let assistant = assistant();
        let reply = assistant
            .handle_chat(ChatInput {
                message: "Quiero ver la habitación doble".to_string(),
                history: vec![ChatMessage {
                    role: ChatRole::User,
                    content: "Hola".to_string(),
                }],
            })
            .await
            .unwrap();

        assert_eq!(reply.images, vec![RoomTypeId::Doble]);
        assert!(reply.response.contains("Habitación Doble"));
    }

    #[tokio::test]
    async fn blank_chat_message_is_rejected() {
        let err = assistant()
            .handle_chat(ChatInput {
                message: "   ".to_string(),
                history: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));
    }

    #[tokio::test]
    async fn failing_remote_model_falls_back_to_offline_reply() {
        let metrics = AppMetrics::shared();
        let mut config = GeminiConfig::new("test-key");
        config.endpoint = "http://127.0.0.1:9".to_string();
        let assistant = BookingAssistant::new(
            RoomCatalog::default(),
            HotelProfile::default(),
            TextGenerator::gemini(config).unwrap(),
            Arc::new(Store::memory()),
            metrics.clone(),
        );

        let reply = assistant
            .handle_chat(ChatInput {
                message: "¿Cuánto cuesta la habitación doble?".to_string(),
                history: Vec::new(),
            })
            .await
            .unwrap();

        assert!(reply.response.contains("$28000 / $38000"));
        assert_eq!(metrics.snapshot().chat_fallback_total, 1);
    }
}
