/// Liveness probe.
pub async fn health_check() -> &'static str {
    "Catalog Service is healthy"
}
