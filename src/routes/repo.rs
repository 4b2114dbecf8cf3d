use sqlx::{types::Json, FromRow, PgPool};

use crate::{geo::LatLng, routes::dto::RouteInfo};

#[derive(Debug, FromRow)]
struct RouteRow {
    id: i32,
    driver_id: Option<i32>,
    name: String,
    color: Option<String>,
    waypoints: Json<Vec<LatLng>>,
}

impl From<RouteRow> for RouteInfo {
    fn from(row: RouteRow) -> Self {
        RouteInfo {
            id: row.id,
            driver_id: row.driver_id,
            name: row.name,
            color: row.color,
            waypoints: row.waypoints.0,
        }
    }
}

/// Routes newest first, optionally narrowed to an exact name.
pub async fn list(db: &PgPool, name: Option<&str>) -> sqlx::Result<Vec<RouteInfo>> {
    let rows = match name {
        Some(name) => {
            sqlx::query_as::<_, RouteRow>(
                r#"
                SELECT id, driver_id, route_name AS name, color, waypoints
                FROM driver_routes
                WHERE route_name = $1
                ORDER BY id DESC
                "#,
            )
            .bind(name)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, RouteRow>(
                r#"
                SELECT id, driver_id, route_name AS name, color, waypoints
                FROM driver_routes
                ORDER BY id DESC
                "#,
            )
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows.into_iter().map(RouteInfo::from).collect())
}

/// Find one route by id.
pub async fn find_by_id(db: &PgPool, id: i32) -> sqlx::Result<Option<RouteInfo>> {
    let row = sqlx::query_as::<_, RouteRow>(
        r#"
        SELECT id, driver_id, route_name AS name, color, waypoints
        FROM driver_routes
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(RouteInfo::from))
}
