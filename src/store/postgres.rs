use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::RateStore;
use crate::currency::{Currency, CurrencyCode, RateMap, UpdateRecord};
use crate::error::{ExchangeError, ExchangeResult};

#[derive(Debug, FromRow)]
struct CurrencyRow {
    id: Uuid,
    code: String,
    name: String,
    rate: Decimal,
}

impl TryFrom<CurrencyRow> for Currency {
    type Error = ExchangeError;

    fn try_from(row: CurrencyRow) -> Result<Self, Self::Error> {
        let code = row
            .code
            .parse()
            .map_err(|e: ExchangeError| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Currency {
            id: row.id,
            code,
            name: row.name,
            rate: row.rate,
        })
    }
}

#[derive(Debug, FromRow)]
struct UpdateRecordRow {
    id: Uuid,
    last_update: DateTime<Utc>,
}

impl From<UpdateRecordRow> for UpdateRecord {
    fn from(row: UpdateRecordRow) -> Self {
        UpdateRecord {
            id: row.id,
            last_update: row.last_update,
        }
    }
}

/// Postgres-backed store. Every refresh runs in one transaction that is rolled
/// back when dropped before commit.
#[derive(Clone)]
pub struct PgRateStore {
    pool: PgPool,
}

impl PgRateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }
}

async fn append_record(
    tx: &mut Transaction<'_, Postgres>,
    at: DateTime<Utc>,
) -> ExchangeResult<()> {
    let record = UpdateRecord::new(at);

    sqlx::query("INSERT INTO update_records (id, last_update) VALUES ($1, $2)")
        .bind(record.id)
        .bind(record.last_update)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

fn map_unique_violation(err: sqlx::Error) -> ExchangeError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ExchangeError::Conflict(db.message().to_string())
        }
        _ => ExchangeError::Storage(err),
    }
}

#[async_trait]
impl RateStore for PgRateStore {
    async fn get_rate(&self, code: &CurrencyCode) -> ExchangeResult<Decimal> {
        sqlx::query_scalar::<_, Decimal>("SELECT rate FROM currencies WHERE code = $1")
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ExchangeError::NotFound(format!("currency {}", code)))
    }

    async fn currency(&self, code: &CurrencyCode) -> ExchangeResult<Currency> {
        sqlx::query_as::<_, CurrencyRow>(
            "SELECT id, code, name, rate FROM currencies WHERE code = $1",
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ExchangeError::NotFound(format!("currency {}", code)))?
        .try_into()
    }

    async fn list_currencies(&self) -> ExchangeResult<Vec<Currency>> {
        sqlx::query_as::<_, CurrencyRow>(
            "SELECT id, code, name, rate FROM currencies ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Currency::try_from)
        .collect()
    }

    async fn latest_record(&self) -> ExchangeResult<UpdateRecord> {
        let row = sqlx::query_as::<_, UpdateRecordRow>(
            r#"
            SELECT id, last_update
            FROM update_records
            ORDER BY last_update DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ExchangeError::NotFound("no rate update recorded".to_string()))?;

        Ok(row.into())
    }

    async fn is_seeded(&self) -> ExchangeResult<bool> {
        let seeded = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM update_records)")
            .fetch_one(&self.pool)
            .await?;

        Ok(seeded)
    }

    async fn seed(&self, currencies: &[Currency], at: DateTime<Utc>) -> ExchangeResult<()> {
        let ids: Vec<Uuid> = currencies.iter().map(|c| c.id).collect();
        let codes: Vec<String> = currencies.iter().map(|c| c.code.to_string()).collect();
        let names: Vec<String> = currencies.iter().map(|c| c.name.clone()).collect();
        let rates: Vec<Decimal> = currencies.iter().map(|c| c.rate).collect();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO currencies (id, code, name, rate)
            SELECT * FROM UNNEST($1::uuid[], $2::varchar[], $3::varchar[], $4::numeric[])
            "#,
        )
        .bind(&ids[..])
        .bind(&codes[..])
        .bind(&names[..])
        .bind(&rates[..])
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        append_record(&mut tx, at).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn apply_refresh(&self, rates: &RateMap, at: DateTime<Utc>) -> ExchangeResult<usize> {
        // BTreeMap order keeps row locks in code order across refreshes.
        let codes: Vec<String> = rates.keys().map(|c| c.to_string()).collect();
        let values: Vec<Decimal> = rates.values().copied().collect();

        let mut tx = self.pool.begin().await?;

        let seeded = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM currencies)")
            .fetch_one(&mut *tx)
            .await?;
        if !seeded {
            return Err(ExchangeError::NotFound("store not seeded".to_string()));
        }

        sqlx::query("SELECT code FROM currencies WHERE code = ANY($1) ORDER BY code FOR UPDATE")
            .bind(&codes[..])
            .fetch_all(&mut *tx)
            .await?;

        let updated = sqlx::query(
            r#"
            UPDATE currencies AS c
            SET rate = v.rate
            FROM UNNEST($1::varchar[], $2::numeric[]) AS v(code, rate)
            WHERE c.code = v.code
            "#,
        )
        .bind(&codes[..])
        .bind(&values[..])
        .execute(&mut *tx)
        .await?
        .rows_affected();

        append_record(&mut tx, at).await?;
        tx.commit().await?;

        debug!("committed {} rate updates at {}", updated, at);

        Ok(updated as usize)
    }
}
