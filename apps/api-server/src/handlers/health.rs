//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub timestamp: String,
}

/// GET /api/v1/health
///
/// Reports 503 when the configured database does not answer a ping.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let (healthy, storage) = storage_status(&state).await;

    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        storage,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[cfg(feature = "postgres")]
async fn storage_status(state: &AppState) -> (bool, &'static str) {
    let Some(db) = &state.db else {
        return (true, "memory");
    };

    match db.ping().await {
        Ok(()) => (true, "postgres"),
        Err(e) => {
            tracing::warn!("Database ping failed: {}", e);
            (false, "postgres")
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn storage_status(_state: &AppState) -> (bool, &'static str) {
    (true, "memory")
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test, web};
    use serde_json::Value;

    use crate::config::AppConfig;
    use crate::handlers::configure_routes;
    use crate::state::AppState;

    #[actix_web::test]
    async fn in_memory_state_is_healthy() {
        let state = web::Data::new(AppState::in_memory(&AppConfig::default()));
        let app =
            test::init_service(App::new().app_data(state).configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
    }
}
