//! Seed script to add sample categories and instruments.
//!
//! Run: `cargo run --bin seed`
//!
//! Wipes the catalog tables and repopulates them with the sample data
//! used for local development. Ensure DATABASE_URL is set (a `.env`
//! file works).

use serde_json::json;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use vega_catalog::{config::Config, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    // Start from a clean catalog
    sqlx::query("DELETE FROM instruments").execute(&pool).await?;
    sqlx::query("DELETE FROM categories").execute(&pool).await?;

    let categories = [
        (
            "Oscilloscopes",
            "High precision oscilloscopes for lab and field use",
            "https://via.placeholder.com/600x400?text=Oscilloscopes",
        ),
        (
            "Multimeters",
            "Digital multimeters with wide-range measurement",
            "https://via.placeholder.com/600x400?text=Multimeters",
        ),
        (
            "Power Supplies",
            "Bench power supplies with fine control",
            "https://via.placeholder.com/600x400?text=Power+Supplies",
        ),
    ];

    let mut category_ids = Vec::new();
    for (name, description, image) in categories {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO categories (name, description, image) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(description)
        .bind(image)
        .fetch_one(&pool)
        .await?;
        category_ids.push(id);
    }

    let instruments = [
        (
            "VegaScope 3000",
            category_ids[0],
            "300MHz, 4-channel oscilloscope with advanced triggering.",
            json!([
                {"key": "Bandwidth", "value": "300 MHz"},
                {"key": "Channels", "value": "4"},
                {"key": "Sample Rate", "value": "2 GS/s"}
            ]),
            "https://via.placeholder.com/800x500?text=VegaScope+3000",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            true,
        ),
        (
            "Vega DMM Pro",
            category_ids[1],
            "True RMS multimeter with auto-ranging and temperature sensor.",
            json!([
                {"key": "DC Voltage", "value": "1000 V"},
                {"key": "Resistance", "value": "60 MΩ"}
            ]),
            "https://via.placeholder.com/800x500?text=Vega+DMM+Pro",
            "",
            true,
        ),
        (
            "Vega PSU 500",
            category_ids[2],
            "500W programmable bench power supply with OVP and OCP.",
            json!([
                {"key": "Max Power", "value": "500 W"},
                {"key": "Voltage", "value": "0-60 V"}
            ]),
            "https://via.placeholder.com/800x500?text=Vega+PSU+500",
            "",
            false,
        ),
    ];

    for (name, category_id, description, specifications, image, video_url, in_stock) in instruments
    {
        sqlx::query(
            r#"
            INSERT INTO instruments
                (name, category_id, description, specifications, image, video_url, in_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(name)
        .bind(category_id)
        .bind(description)
        .bind(specifications)
        .bind(image)
        .bind(video_url)
        .bind(in_stock)
        .execute(&pool)
        .await?;
    }

    tracing::info!("Seed complete");
    Ok(())
}
