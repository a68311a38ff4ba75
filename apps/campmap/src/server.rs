#![cfg(feature = "ssr")]

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_prometheus::PrometheusMetricLayer;
use leptos::prelude::*;
use leptos_axum::{generate_route_list, LeptosRoutes};
use serde::Deserialize;
use serde_json::Value;
use shared::{NewSpot, Spot, SubmitOutcome};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{shell, App};

pub mod state {
    use super::*;

    pub const DEFAULT_BOUNDARIES_URL: &str = "https://apps.fs.usda.gov/arcx/rest/services/EDW/EDW_NFSBoundaries_01/MapServer/0/query?where=STATE='CO'&outFields=*&f=geojson";
    pub const DEFAULT_ROADS_URL: &str = "https://apps.fs.usda.gov/arcx/rest/services/EDW/EDW_RoadBasic_01/MapServer/0/query?where=ADMIN_ST='CO'&outFields=*&f=geojson";

    #[derive(Clone)]
    pub struct AppState {
        pub db: SqlitePool,
        pub upstream: reqwest::Client,
        pub sources: GeoSources,
    }

    /// Upstream GeoJSON endpoints, overridable through the environment.
    #[derive(Clone)]
    pub struct GeoSources {
        pub boundaries_url: String,
        pub roads_url: String,
    }

    impl GeoSources {
        pub fn from_env() -> Self {
            Self {
                boundaries_url: std::env::var("FOREST_BOUNDARIES_URL")
                    .unwrap_or_else(|_| DEFAULT_BOUNDARIES_URL.to_string()),
                roads_url: std::env::var("FOREST_ROADS_URL")
                    .unwrap_or_else(|_| DEFAULT_ROADS_URL.to_string()),
            }
        }
    }
}

pub mod services {
    use super::*;

    pub mod spots {
        use super::*;

        pub async fn ensure_schema(db: &SqlitePool) -> anyhow::Result<()> {
            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS camping_spots (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    location TEXT NOT NULL,
                    state TEXT,
                    description TEXT,
                    latitude REAL,
                    longitude REAL
                )
                "#,
            )
            .execute(db)
            .await?;
            Ok(())
        }

        /// Seeds the sample spots the first time the app runs against an
        /// empty database.
        pub async fn seed_if_empty(db: &SqlitePool) -> anyhow::Result<()> {
            let row = sqlx::query("SELECT COUNT(*) AS n FROM camping_spots")
                .fetch_one(db)
                .await?;
            if row.get::<i64, _>("n") > 0 {
                return Ok(());
            }
            for spot in sample_spots() {
                insert(db, &spot).await?;
            }
            tracing::info!("seeded sample camping spots");
            Ok(())
        }

        fn sample_spots() -> Vec<NewSpot> {
            vec![
                NewSpot {
                    name: "Bear Creek".into(),
                    location: "Near Guanella Pass".into(),
                    state: "CO".into(),
                    description: Some(
                        "Free dispersed camping near forest roads. Great views of the mountains."
                            .into(),
                    ),
                    latitude: Some(39.6),
                    longitude: Some(-105.3),
                },
                NewSpot {
                    name: "Sierra Pines".into(),
                    location: "Stanislaus National Forest".into(),
                    state: "CA".into(),
                    description: Some(
                        "Near stream, shady area. Pet-friendly camping with hiking trails nearby."
                            .into(),
                    ),
                    latitude: Some(38.0),
                    longitude: Some(-120.3),
                },
                NewSpot {
                    name: "Red Rock Canyon".into(),
                    location: "Moab Area".into(),
                    state: "UT".into(),
                    description: Some(
                        "Stunning red rock formations. Popular with rock climbers and hikers."
                            .into(),
                    ),
                    latitude: Some(38.7),
                    longitude: Some(-109.6),
                },
                NewSpot {
                    name: "Lost Lake".into(),
                    location: "Roosevelt National Forest".into(),
                    state: "CO".into(),
                    description: Some(
                        "Peaceful lake camping with fishing opportunities. 4WD recommended."
                            .into(),
                    ),
                    latitude: Some(40.1),
                    longitude: Some(-105.8),
                },
            ]
        }

        pub async fn list(
            db: &SqlitePool,
            state_filter: Option<&str>,
        ) -> anyhow::Result<Vec<Spot>> {
            let rows = match state_filter {
                Some(code) => {
                    sqlx::query(
                        "SELECT id, name, location, state, description, latitude, longitude \
                         FROM camping_spots WHERE state = ? ORDER BY id",
                    )
                    .bind(code)
                    .fetch_all(db)
                    .await?
                }
                None => {
                    sqlx::query(
                        "SELECT id, name, location, state, description, latitude, longitude \
                         FROM camping_spots ORDER BY id",
                    )
                    .fetch_all(db)
                    .await?
                }
            };

            Ok(rows
                .into_iter()
                .map(|row| Spot {
                    id: row.get::<Option<i64>, _>("id"),
                    name: row.get::<String, _>("name"),
                    location: row.get::<String, _>("location"),
                    state: row.get::<Option<String>, _>("state"),
                    description: row.get::<Option<String>, _>("description"),
                    latitude: row.get::<Option<f64>, _>("latitude"),
                    longitude: row.get::<Option<f64>, _>("longitude"),
                })
                .collect())
        }

        pub async fn insert(db: &SqlitePool, spot: &NewSpot) -> anyhow::Result<SubmitOutcome> {
            let result = sqlx::query(
                "INSERT INTO camping_spots(name, location, state, description, latitude, longitude) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&spot.name)
            .bind(&spot.location)
            .bind(&spot.state)
            .bind(spot.description.as_deref())
            .bind(spot.latitude)
            .bind(spot.longitude)
            .execute(db)
            .await;

            match result {
                Ok(done) => Ok(SubmitOutcome::accepted(done.last_insert_rowid())),
                Err(sqlx::Error::Database(db_err))
                    if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation =>
                {
                    Ok(SubmitOutcome::rejected("duplicate name"))
                }
                Err(err) => Err(err.into()),
            }
        }

        /// Mandatory-field check mirroring the client's. The server stays
        /// the source of truth for submissions from any client.
        pub fn missing_field(spot: &NewSpot) -> Option<&'static str> {
            if spot.name.trim().is_empty() {
                return Some("name");
            }
            if spot.location.trim().is_empty() {
                return Some("location");
            }
            if spot.state.trim().is_empty() {
                return Some("state");
            }
            None
        }
    }

    pub mod geo {
        use super::*;

        /// Proxies one upstream FeatureCollection. Either the whole decoded
        /// body comes back or an error does, never a partial payload.
        pub async fn fetch_collection(
            client: &reqwest::Client,
            url: &str,
        ) -> anyhow::Result<Value> {
            let response = client.get(url).send().await?.error_for_status()?;
            Ok(response.json().await?)
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpotsQuery {
    state: Option<String>,
}

async fn list_spots(
    State(app): State<Arc<state::AppState>>,
    Query(query): Query<SpotsQuery>,
) -> impl IntoResponse {
    let filter = query.state.as_deref().filter(|code| !code.is_empty());
    match services::spots::list(&app.db, filter).await {
        Ok(spots) => Json(spots).into_response(),
        Err(err) => {
            tracing::error!(?err, "camping spot query failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn create_spot(
    State(app): State<Arc<state::AppState>>,
    Json(body): Json<NewSpot>,
) -> impl IntoResponse {
    if let Some(field) = services::spots::missing_field(&body) {
        return Json(SubmitOutcome::rejected(format!("{field} is required")));
    }
    match services::spots::insert(&app.db, &body).await {
        Ok(outcome) => Json(outcome),
        Err(err) => {
            tracing::error!(?err, "camping spot insert failed");
            Json(SubmitOutcome::rejected("internal error"))
        }
    }
}

async fn forest_boundaries(State(app): State<Arc<state::AppState>>) -> impl IntoResponse {
    match services::geo::fetch_collection(&app.upstream, &app.sources.boundaries_url).await {
        Ok(collection) => Json(collection).into_response(),
        Err(err) => {
            tracing::error!(?err, "forest boundary upstream failed");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

async fn forest_roads(State(app): State<Arc<state::AppState>>) -> impl IntoResponse {
    match services::geo::fetch_collection(&app.upstream, &app.sources.roads_url).await {
        Ok(collection) => Json(collection).into_response(),
        Err(err) => {
            tracing::error!(?err, "forest road upstream failed");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("info"))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://camping.db?mode=rwc".into());
    let db = SqlitePool::connect(&database_url).await?;
    services::spots::ensure_schema(&db).await?;
    services::spots::seed_if_empty(&db).await?;

    let upstream = reqwest::Client::builder()
        .timeout(Duration::from_secs(20))
        .build()?;

    let app_state = Arc::new(state::AppState {
        db,
        upstream,
        sources: state::GeoSources::from_env(),
    });

    let conf = get_configuration(None)?;
    let leptos_options = conf.leptos_options;
    let addr = leptos_options.site_addr;
    let routes = generate_route_list(App);

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let api = Router::new()
        .route("/api/camping_spots", get(list_spots).post(create_spot))
        .route("/api/forest_boundaries", get(forest_boundaries))
        .route("/api/forest_roads", get(forest_roads))
        .route("/health", get(health))
        .with_state(app_state);

    let app = Router::new()
        .leptos_routes(&leptos_options, routes, {
            let leptos_options = leptos_options.clone();
            move || shell(leptos_options.clone())
        })
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptos_options)
        .merge(api)
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(prometheus_layer)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!(%addr, "campmap server started");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlx::sqlite::SqlitePoolOptions;

    // One connection, or every pool checkout would see its own ":memory:".
    async fn test_db() -> SqlitePool {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        services::spots::ensure_schema(&db).await.unwrap();
        db
    }

    fn new_spot(name: &str, state: &str) -> NewSpot {
        NewSpot {
            name: name.into(),
            location: "Forest A".into(),
            state: state.into(),
            description: None,
            latitude: Some(39.1),
            longitude: Some(-105.3),
        }
    }

    #[tokio::test]
    async fn seed_populates_an_empty_database_once() {
        let db = test_db().await;
        services::spots::seed_if_empty(&db).await.unwrap();
        services::spots::seed_if_empty(&db).await.unwrap();

        let all = services::spots::list(&db, None).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].name, "Bear Creek");
    }

    #[tokio::test]
    async fn list_filters_by_state_in_id_order() {
        let db = test_db().await;
        services::spots::seed_if_empty(&db).await.unwrap();

        let colorado = services::spots::list(&db, Some("CO")).await.unwrap();
        let names: Vec<&str> = colorado.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Bear Creek", "Lost Lake"]);

        let empty = services::spots::list(&db, Some("ZZ")).await.unwrap();
        assert_eq!(empty, vec![]);
    }

    #[tokio::test]
    async fn inserted_spot_round_trips_with_its_id() {
        let db = test_db().await;

        let outcome = services::spots::insert(&db, &new_spot("Pine Ridge", "CO"))
            .await
            .unwrap();
        assert!(outcome.success);
        let id = outcome.id.unwrap();

        let all = services::spots::list(&db, None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, Some(id));
        assert_eq!(all[0].coordinates(), Some((39.1, -105.3)));
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_with_reason() {
        let db = test_db().await;
        let spot = new_spot("Pine Ridge", "CO");

        let first = services::spots::insert(&db, &spot).await.unwrap();
        assert!(first.success);

        let second = services::spots::insert(&db, &spot).await.unwrap();
        assert_eq!(second, SubmitOutcome::rejected("duplicate name"));
    }

    #[test]
    fn blank_mandatory_fields_are_named() {
        let mut spot = new_spot("Pine Ridge", "CO");
        assert_eq!(services::spots::missing_field(&spot), None);

        spot.name = "  ".into();
        assert_eq!(services::spots::missing_field(&spot), Some("name"));

        spot.name = "Pine Ridge".into();
        spot.state = String::new();
        assert_eq!(services::spots::missing_field(&spot), Some("state"));
    }
}
