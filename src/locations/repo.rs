use sqlx::{FromRow, PgPool};

use crate::locations::dto::{LocationEntry, LocationRow};

/// Insert or overwrite a driver's current position. One row per driver,
/// stamped with the database clock.
pub async fn upsert(db: &PgPool, driver_id: i32, lat: f64, lng: f64) -> sqlx::Result<LocationRow> {
    sqlx::query_as::<_, LocationRow>(
        r#"
        INSERT INTO driver_locations (driver_id, lat, lng, updated_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (driver_id) DO UPDATE
            SET lat = EXCLUDED.lat,
                lng = EXCLUDED.lng,
                updated_at = EXCLUDED.updated_at
        RETURNING driver_id, lat, lng, updated_at
        "#,
    )
    .bind(driver_id)
    .bind(lat)
    .bind(lng)
    .fetch_one(db)
    .await
}

/// Feed row: a stored position plus the public driver metadata that
/// rides along with it.
#[derive(Debug, FromRow)]
pub struct FeedRow {
    pub driver_id: i32,
    pub lat: f64,
    pub lng: f64,
    pub updated_at_ms: i64,
    pub name: Option<String>,
    pub plate: Option<String>,
    pub current_route: Option<String>,
}

impl From<FeedRow> for LocationEntry {
    fn from(row: FeedRow) -> Self {
        LocationEntry {
            lat: row.lat,
            lng: row.lng,
            updated_at: row.updated_at_ms,
            name: row.name,
            plate: row.plate,
            current_route: row.current_route,
        }
    }
}

/// Every stored position, with the timestamp converted to epoch
/// milliseconds on the database side.
pub async fn list(db: &PgPool) -> sqlx::Result<Vec<FeedRow>> {
    sqlx::query_as::<_, FeedRow>(
        r#"
        SELECT dl.driver_id, dl.lat, dl.lng,
               (EXTRACT(EPOCH FROM dl.updated_at) * 1000)::bigint AS updated_at_ms,
               d.name, d.plate, d.current_route
        FROM driver_locations dl
        JOIN drivers d ON d.id = dl.driver_id
        "#,
    )
    .fetch_all(db)
    .await
}
