use async_trait::async_trait;
use domain::ValidatedPurchase;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    PurchaseId, Result, StoreId,
    store::{PurchaseRepository, StoreOutcome},
};

/// PostgreSQL-backed purchase repository.
#[derive(Clone)]
pub struct PostgresPurchaseRepository {
    pool: PgPool,
}

impl PostgresPurchaseRepository {
    /// Creates a new PostgreSQL purchase repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_purchase(row: PgRow) -> Result<ValidatedPurchase> {
        let record: serde_json::Value = row.try_get("record")?;
        Ok(serde_json::from_value(record)?)
    }
}

#[async_trait]
impl PurchaseRepository for PostgresPurchaseRepository {
    async fn store(&self, purchase: &ValidatedPurchase) -> Result<StoreOutcome> {
        let record = serde_json::to_value(purchase)?;

        let result = sqlx::query(
            r#"
            INSERT INTO purchases (id, store_id, payment_means, currency, total_cents, discount_percent, amount_due_cents, time_of_purchase, record)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(purchase.id().as_uuid())
        .bind(purchase.store_id().as_uuid())
        .bind(purchase.payment_means().as_str())
        .bind(purchase.total().currency().code())
        .bind(purchase.total().cents())
        .bind(i16::from(purchase.discount().value()))
        .bind(purchase.amount_due().cents())
        .bind(purchase.time_of_purchase())
        .bind(record)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(purchase_id = %purchase.id(), "purchase already stored");
            return Ok(StoreOutcome::AlreadyStored);
        }

        metrics::counter!("purchases_stored_total").increment(1);
        Ok(StoreOutcome::Inserted)
    }

    async fn get(&self, id: PurchaseId) -> Result<Option<ValidatedPurchase>> {
        let row: Option<PgRow> = sqlx::query("SELECT record FROM purchases WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_purchase).transpose()
    }

    async fn list_for_store(&self, store_id: StoreId) -> Result<Vec<ValidatedPurchase>> {
        let rows = sqlx::query(
            r#"
            SELECT record
            FROM purchases
            WHERE store_id = $1
            ORDER BY time_of_purchase ASC
            "#,
        )
        .bind(store_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_purchase).collect()
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
            .fetch_one(&self.pool)
            .await?;

        Ok(usize::try_from(count).unwrap_or_default())
    }
}
