//! Local preview server for the generated output tree.

use std::path::Path;

use axum::Router;
use tower_http::services::ServeDir;
use tracing::info;

use crate::error::Result;

/// Serve `output_dir` as plain static files. Only useful for checking the
/// generated links locally; deployment is a plain file copy.
pub async fn serve(output_dir: &Path, port: u16) -> Result<()> {
    let app = Router::new().fallback_service(ServeDir::new(output_dir));
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("serving {} on http://127.0.0.1:{}", output_dir.display(), port);
    axum::serve(listener, app).await?;
    Ok(())
}
