use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use hotel_core::{NewReservation, Reservation, ReservationStatus, RoomTypeId};
use parking_lot::RwLock;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

pub const DEFAULT_RECENT_LIMIT: usize = 50;

pub trait ReservationRepository: Send + Sync {
    async fn insert_reservation(&self, reservation: NewReservation) -> Result<Reservation>;
    /// Newest first by creation time.
    async fn recent_reservations(&self, limit: usize) -> Result<Vec<Reservation>>;
    async fn all_reservations(&self) -> Result<Vec<Reservation>>;
    async fn count_reservations(&self) -> Result<u64>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    reservations: Arc<RwLock<Vec<Reservation>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReservationRepository for MemoryStore {
    async fn insert_reservation(&self, reservation: NewReservation) -> Result<Reservation> {
        let mut guard = self.reservations.write();
        let id = guard.last().map(|last| last.id + 1).unwrap_or(1);
        let stored = Reservation::from_new(id, reservation);
        guard.push(stored.clone());
        Ok(stored)
    }

    async fn recent_reservations(&self, limit: usize) -> Result<Vec<Reservation>> {
        let mut items = self.reservations.read().clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        items.truncate(limit);
        Ok(items)
    }

    async fn all_reservations(&self) -> Result<Vec<Reservation>> {
        Ok(self.reservations.read().clone())
    }

    async fn count_reservations(&self) -> Result<u64> {
        Ok(self.reservations.read().len() as u64)
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        // An in-memory database only lives as long as its connection.
        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reservations (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              guest_name TEXT NOT NULL,
              email TEXT NOT NULL,
              phone TEXT NOT NULL,
              room_type TEXT NOT NULL,
              check_in TEXT NOT NULL,
              check_out TEXT NOT NULL,
              guests INTEGER NOT NULL,
              total_price INTEGER NOT NULL,
              status TEXT NOT NULL,
              created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed creating reservations table")?;

        Ok(())
    }
}

impl ReservationRepository for SqliteStore {
    async fn insert_reservation(&self, reservation: NewReservation) -> Result<Reservation> {
        let result = sqlx::query(
            r#"
            INSERT INTO reservations
              (guest_name, email, phone, room_type, check_in, check_out,
               guests, total_price, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&reservation.guest_name)
        .bind(&reservation.email)
        .bind(&reservation.phone)
        .bind(reservation.room_type.as_code())
        .bind(reservation.check_in.to_string())
        .bind(reservation.check_out.to_string())
        .bind(i64::from(reservation.guests))
        .bind(i64::try_from(reservation.total_price).context("total price out of range")?)
        .bind(reservation.status.as_code())
        .bind(reservation.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await
        .context("failed inserting reservation")?;

        Ok(Reservation::from_new(
            result.last_insert_rowid(),
            reservation,
        ))
    }

    async fn recent_reservations(&self, limit: usize) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(
            r#"
            SELECT id, guest_name, email, phone, room_type, check_in, check_out,
                   guests, total_price, status, created_at
            FROM reservations
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(reservation_from_row).collect()
    }

    async fn all_reservations(&self) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(
            r#"
            SELECT id, guest_name, email, phone, room_type, check_in, check_out,
                   guests, total_price, status, created_at
            FROM reservations
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(reservation_from_row).collect()
    }

    async fn count_reservations(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

fn reservation_from_row(row: &SqliteRow) -> Result<Reservation> {
    let id: i64 = row.get("id");
    let room_type: String = row.get("room_type");
    let status: String = row.get("status");
    let check_in: String = row.get("check_in");
    let check_out: String = row.get("check_out");
    let created_at: String = row.get("created_at");
    let guests: i64 = row.get("guests");
    let total_price: i64 = row.get("total_price");

    Ok(Reservation {
        id,
        guest_name: row.get("guest_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        room_type: RoomTypeId::parse(&room_type)
            .with_context(|| format!("reservation {id} has unknown room type {room_type}"))?,
        check_in: parse_stored_date(&check_in)
            .with_context(|| format!("reservation {id} has bad check_in {check_in}"))?,
        check_out: parse_stored_date(&check_out)
            .with_context(|| format!("reservation {id} has bad check_out {check_out}"))?,
        guests: u32::try_from(guests)
            .with_context(|| format!("reservation {id} has bad guests {guests}"))?,
        total_price: u64::try_from(total_price)
            .with_context(|| format!("reservation {id} has bad total_price {total_price}"))?,
        status: ReservationStatus::parse(&status)
            .with_context(|| format!("reservation {id} has unknown status {status}"))?,
        created_at: created_at
            .parse::<DateTime<Utc>>()
            .with_context(|| format!("reservation {id} has bad created_at {created_at}"))?,
    })
}

fn parse_stored_date(value: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value, "%Y-%m-%d")?)
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Store::Sqlite(_))
    }
}

impl ReservationRepository for Store {
    async fn insert_reservation(&self, reservation: NewReservation) -> Result<Reservation> {
        match self {
            Store::Memory(store) => store.insert_reservation(reservation).await,
            Store::Sqlite(store) => store.insert_reservation(reservation).await,
        }
    }

    async fn recent_reservations(&self, limit: usize) -> Result<Vec<Reservation>> {
        match self {
            Store::Memory(store) => store.recent_reservations(limit).await,
            Store::Sqlite(store) => store.recent_reservations(limit).await,
        }
    }

    async fn all_reservations(&self) -> Result<Vec<Reservation>> {
        match self {
            Store::Memory(store) => store.all_reservations().await,
            Store::Sqlite(store) => store.all_reservations().await,
        }
    }

    async fn count_reservations(&self) -> Result<u64> {
        match self {
            Store::Memory(store) => store.count_reservations().await,
            Store::Sqlite(store) => store.count_reservations().await,
        }
    }
}
