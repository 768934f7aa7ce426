use sqlx::{PgPool, Row};

/// Creates a connection pool from the `DATABASE_URL` environment variable.
pub async fn create_connection_pool() -> Result<PgPool, sqlx::Error> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| {
        sqlx::Error::Configuration("DATABASE_URL environment variable not set".into())
    })?;

    PgPool::connect(&database_url).await
}

/// Probes the connection by round-tripping a trivial query, so a
/// misconfigured database surfaces at startup instead of on the first
/// request.
pub async fn test_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    let row = sqlx::query("SELECT 1 as probe").fetch_one(pool).await?;
    let probe: i32 = row.get("probe");

    log::info!("✅ Database connection successful (probe = {})", probe);
    Ok(())
}
