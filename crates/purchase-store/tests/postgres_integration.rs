//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p purchase-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use domain::{Currency, DiscountPercent, Money, Product, Purchase, ValidatedPurchase};
use purchase_store::{
    PostgresPurchaseRepository, PurchaseId, PurchaseRepository, StoreId, StoreOutcome,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_purchases_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh repository with its own pool and a cleared table
async fn get_test_repository() -> PostgresPurchaseRepository {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE purchases")
        .execute(&pool)
        .await
        .unwrap();

    PostgresPurchaseRepository::new(pool)
}

fn validated(store_id: StoreId) -> ValidatedPurchase {
    Purchase::card(
        store_id,
        vec![
            Product::new("LATTE", "Latte", Money::from_cents(300)),
            Product::new("SCONE", "Blueberry scone", Money::from_cents(300)),
        ],
        "tok_visa",
    )
    .validate_and_enrich(Currency::Usd)
    .unwrap()
}

#[tokio::test]
#[serial]
async fn store_and_load_purchase() {
    let repo = get_test_repository().await;
    let purchase = validated(StoreId::new());

    let outcome = repo.store(&purchase).await.unwrap();
    assert_eq!(outcome, StoreOutcome::Inserted);

    let loaded = repo.get(purchase.id()).await.unwrap().unwrap();
    assert_eq!(loaded.id(), purchase.id());
    assert_eq!(loaded.total(), Money::from_cents(600));
    assert_eq!(loaded.products(), purchase.products());
    assert_eq!(loaded.time_of_purchase(), purchase.time_of_purchase());
    assert_eq!(loaded.card_token(), None);
}

#[tokio::test]
#[serial]
async fn store_is_idempotent_on_id() {
    let repo = get_test_repository().await;
    let purchase = validated(StoreId::new());

    repo.store(&purchase).await.unwrap();
    let second = repo.store(&purchase).await.unwrap();

    assert_eq!(second, StoreOutcome::AlreadyStored);
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn discount_columns_are_persisted() {
    let repo = get_test_repository().await;
    let mut purchase = validated(StoreId::new());
    purchase.apply_discount(DiscountPercent::new(10).unwrap());

    repo.store(&purchase).await.unwrap();

    let (discount, amount_due): (i16, i64) = sqlx::query_as(
        "SELECT discount_percent, amount_due_cents FROM purchases WHERE id = $1",
    )
    .bind(purchase.id().as_uuid())
    .fetch_one(repo.pool())
    .await
    .unwrap();

    assert_eq!(discount, 10);
    assert_eq!(amount_due, 540);

    let loaded = repo.get(purchase.id()).await.unwrap().unwrap();
    assert_eq!(loaded.amount_due(), Money::from_cents(540));
}

#[tokio::test]
#[serial]
async fn get_unknown_id_returns_none() {
    let repo = get_test_repository().await;
    assert!(repo.get(PurchaseId::new()).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn list_for_store_returns_only_that_store() {
    let repo = get_test_repository().await;
    let store_a = StoreId::new();
    let store_b = StoreId::new();

    let first = validated(store_a);
    let second = validated(store_a);
    repo.store(&first).await.unwrap();
    repo.store(&second).await.unwrap();
    repo.store(&validated(store_b)).await.unwrap();

    let listed = repo.list_for_store(store_a).await.unwrap();
    assert_eq!(listed.len(), 2);
    let ids: Vec<PurchaseId> = listed.iter().map(|p| p.id()).collect();
    assert!(ids.contains(&first.id()));
    assert!(ids.contains(&second.id()));
}

#[tokio::test]
#[serial]
async fn run_migrations_is_repeatable() {
    let repo = get_test_repository().await;
    repo.run_migrations().await.unwrap();
    repo.run_migrations().await.unwrap();

    let purchase = validated(StoreId::new());
    repo.store(&purchase).await.unwrap();
    assert!(repo.get(purchase.id()).await.unwrap().is_some());
}
