use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde_json::json;
use sqlx::MySqlPool;

/// Database liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable", body = Object, example = json!({
            "status": "ok",
            "database": "connected",
            "timestamp": "2024-01-01T09:00:00Z"
        })),
        (status = 503, description = "Database unreachable", body = Object, example = json!({
            "status": "degraded",
            "database": "unreachable",
            "timestamp": "2024-01-01T09:00:00Z",
            "error": "pool timed out while waiting for an open connection"
        }))
    ),
    tag = "Health"
)]
pub async fn health(pool: web::Data<MySqlPool>) -> impl Responder {
    let probe = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool.get_ref())
        .await;

    match probe {
        Ok(_) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "database": "connected",
            "timestamp": Utc::now().to_rfc3339(),
        })),
        Err(e) => {
            tracing::error!(error = %e, "Health check could not reach the database");
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "degraded",
                "database": "unreachable",
                "timestamp": Utc::now().to_rfc3339(),
                "error": e.to_string(),
            }))
        }
    }
}
