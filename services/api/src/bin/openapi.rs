//! services/api/src/bin/openapi.rs
//!
//! Dumps the Didactic OpenAPI document. Usage: `openapi [OUTPUT]`, default `openapi.json`.

use api_lib::{error::ApiError, web::rest::ApiDoc};
use std::path::PathBuf;
use utoipa::OpenApi;

fn main() -> Result<(), ApiError> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let document = ApiDoc::openapi()
        .to_pretty_json()
        .map_err(|e| ApiError::Internal(format!("Failed to serialize OpenAPI document: {}", e)))?;
    std::fs::write(&output, &document)?;

    println!(
        "Wrote {} paths to {}",
        ApiDoc::openapi().paths.paths.len(),
        output.display()
    );
    Ok(())
}
