//! Both adapters list the same users for the same stored data.
//!
//! Requires PostgreSQL and MongoDB: set TEST_DATABASE_URL and
//! TEST_MONGODB_URI and run with `cargo test -- --ignored`.

mod common;

use common::{get_test_database_url, get_test_mongodb_uri};
use mongodb::bson::{doc, Document};
use mongodb::Client;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use user_service::context::RequestContext;
use user_service::repository::{MongoUserRepository, PostgresUserRepository, UserRepository};

const SEED: &[(i64, &str)] = &[
    (12, "Lu"),
    (3, "Ann"),
    (7, "Gil"),
    (1, "Bo"),
    (11, "Kit"),
    (2, "Cy"),
    (9, "Ida"),
    (5, "Eve"),
    (4, "Dee"),
    (10, "Jo"),
    (8, "Hal"),
    (6, "Fay"),
];

#[tokio::test]
#[ignore = "Requires PostgreSQL and MongoDB (TEST_DATABASE_URL, TEST_MONGODB_URI)"]
async fn postgres_and_mongo_list_identically() {
    let suffix = std::process::id();

    // PostgreSQL
    let schema = format!("equivalence_{}", suffix);
    let base_url = get_test_database_url();
    let admin = PgPoolOptions::new()
        .max_connections(1)
        .connect(&base_url)
        .await
        .expect("Failed to connect to TEST_DATABASE_URL");
    sqlx::query(&format!("CREATE SCHEMA {}", schema))
        .execute(&admin)
        .await
        .expect("Failed to create schema");
    let options = PgConnectOptions::from_str(&base_url)
        .expect("Invalid TEST_DATABASE_URL")
        .options([("search_path", schema.as_str())]);
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await
        .expect("Failed to connect with schema search_path");
    sqlx::query("CREATE TABLE users (id BIGSERIAL PRIMARY KEY, name TEXT NOT NULL)")
        .execute(&pool)
        .await
        .expect("Failed to create users table");
    for (id, name) in SEED {
        sqlx::query("INSERT INTO users (id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(name)
            .execute(&pool)
            .await
            .expect("Failed to seed user");
    }
    let postgres = PostgresUserRepository::new(pool);

    // MongoDB
    let client = Client::with_uri_str(get_test_mongodb_uri())
        .await
        .expect("Failed to create MongoDB client");
    let db_name = format!("equivalence_{}", suffix);
    let docs: Vec<Document> = SEED
        .iter()
        .map(|(id, name)| doc! { "id": *id, "name": *name })
        .collect();
    client
        .database(&db_name)
        .collection::<Document>("users")
        .insert_many(docs, None)
        .await
        .expect("Failed to seed users");
    let mongo = MongoUserRepository::new(client.clone(), &db_name, "users");

    let ctx = RequestContext::background();
    let from_postgres = postgres.list(&ctx).await.unwrap();
    let from_mongo = mongo.list(&ctx).await.unwrap();

    assert_eq!(from_postgres.len(), 10);
    assert_eq!(from_postgres, from_mongo);
    assert_eq!(from_postgres.first().map(|u| u.name.as_str()), Some("Bo"));

    postgres.close().await;
    sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", schema))
        .execute(&admin)
        .await
        .ok();
    admin.close().await;
    client.database(&db_name).drop(None).await.ok();
}
