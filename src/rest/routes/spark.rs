// rest/routes/spark.rs — the generate-spark endpoint.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::auth::BearerToken;
use crate::error::SparkError;
use crate::{spark, AppContext};

#[derive(Deserialize)]
pub struct GenerateSparkRequest {
    /// Free text; the client sends suggestion keys like "doubt", "stuck",
    /// "boost" but any non-empty string is accepted.
    #[serde(default)]
    pub mood: Option<String>,
}

/// POST /generate-spark
///
/// The `BearerToken` extractor runs before the body is read, so a request
/// without a credential is rejected 401 before anything else happens.
pub async fn generate_spark(
    State(ctx): State<Arc<AppContext>>,
    BearerToken(token): BearerToken,
    Json(body): Json<GenerateSparkRequest>,
) -> Result<Json<Value>, SparkError> {
    let mood = body.mood.unwrap_or_default();

    let message = spark::generate_spark(
        ctx.repository.as_ref(),
        ctx.provider.as_ref(),
        &token,
        &mood,
    )
    .await
    .map_err(|e| {
        warn!(status = e.status().as_u16(), "spark request failed: {e}");
        e
    })?;

    Ok(Json(json!({ "message": message })))
}
