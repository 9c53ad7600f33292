//! Health checks
//!
//! Liveness never touches the database; readiness pings it; the aggregate
//! report is cached for a few seconds so probes cannot flood the pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use tt_db::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

struct CachedHealth {
    report: HealthReport,
    cached_at: Instant,
}

pub struct HealthChecker {
    cache_duration: Duration,
    start_time: Instant,
    cache: RwLock<Option<CachedHealth>>,
    database: Option<Database>,
}

impl HealthChecker {
    /// `None` means the server runs on in-memory stores
    pub fn new(database: Option<Database>) -> Self {
        Self {
            cache_duration: Duration::from_secs(10),
            start_time: Instant::now(),
            cache: RwLock::new(None),
            database,
        }
    }

    pub fn with_cache_duration(mut self, duration: Duration) -> Self {
        self.cache_duration = duration;
        self
    }

    /// Cached aggregate report
    pub async fn report(&self) -> HealthReport {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.cached_at.elapsed() < self.cache_duration {
                    debug!("Returning cached health report");
                    return cached.report.clone();
                }
            }
        }

        let storage = self.check_storage().await;
        let report = HealthReport {
            status: storage.status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components: vec![storage],
            timestamp: chrono::Utc::now(),
        };

        *self.cache.write().await = Some(CachedHealth {
            report: report.clone(),
            cached_at: Instant::now(),
        });
        report
    }

    async fn check_storage(&self) -> ComponentHealth {
        let start = Instant::now();
        let Some(db) = &self.database else {
            return ComponentHealth {
                name: "storage".to_string(),
                status: HealthStatus::Degraded,
                message: Some("Running on in-memory stores".to_string()),
                response_time_ms: 0,
                details: None,
            };
        };

        let (status, message) = match db.ping().await {
            Ok(()) => (HealthStatus::Healthy, "Connected".to_string()),
            Err(err) => {
                warn!(error = %err, "Database ping failed");
                (HealthStatus::Unhealthy, "Database unreachable".to_string())
            }
        };
        let pool = db.pool();

        ComponentHealth {
            name: "database".to_string(),
            status,
            message: Some(message),
            response_time_ms: start.elapsed().as_millis() as u64,
            details: Some(serde_json::json!({
                "type": "postgresql",
                "pool_size": pool.size(),
                "idle_connections": pool.num_idle(),
            })),
        }
    }

    /// Uncached readiness probe
    pub async fn ready(&self) -> bool {
        match &self.database {
            Some(db) => db.ping().await.is_ok(),
            None => true,
        }
    }
}

/// GET /health
pub async fn health(State(checker): State<Arc<HealthChecker>>) -> (StatusCode, Json<HealthReport>) {
    let report = checker.report().await;
    (report.http_status(), Json(report))
}

/// GET /health/live
pub async fn liveness() -> &'static str {
    "OK"
}

/// GET /health/ready
pub async fn readiness(State(checker): State<Arc<HealthChecker>>) -> (StatusCode, &'static str) {
    if checker.ready().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Database unreachable")
    }
}
