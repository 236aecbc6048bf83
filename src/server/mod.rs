use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::explorer::Explorer;

pub mod routes;

/// Server state
pub struct AppState {
    pub explorer: Explorer,
}

/// All API routes, with the static landing page as fallback
pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/search/companies", get(routes::search_companies))
        .route("/api/company/{ticker}", get(routes::get_company))
        .route("/api/company/{ticker}/filings", get(routes::get_company_filings))
        .route("/api/company/{ticker}/financials", get(routes::get_company_financials))
        .route("/api/filing/{accession_no}", get(routes::get_filing))
        .route("/api/filing/{accession_no}/attachments", get(routes::get_filing_attachments))
        .route("/api/filing/{accession_no}/attachment/{filename}", get(routes::download_attachment))
        .route("/api/filing/{accession_no}/attachment/{filename}/view", get(routes::view_attachment))
        .route("/api/recent-filings", get(routes::get_recent_filings))
        .route("/api/form-types", get(routes::get_form_types))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, explorer: Explorer, static_dir: &Path) -> anyhow::Result<()> {
    let state = Arc::new(AppState { explorer });
    let app = router(state, static_dir);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
