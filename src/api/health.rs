use axum::Json;

pub async fn home() -> &'static str {
    "Cohort report service. GET /cohort-report to build the report."
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

pub async fn ready() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ready"}))
}
