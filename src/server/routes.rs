use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::explorer::AttachmentContent;
use crate::record::{self, AttachmentLink, CompanyRecord, FilingDetail, FilingRecord, FormType, Financials};
use crate::server::AppState;
use crate::Error;

const DEFAULT_FILINGS_LIMIT: usize = 20;
const DEFAULT_RECENT_LIMIT: usize = 50;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct FilingsParams {
    pub form: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// `NotFound` → 404, `InvalidInput` → 400, everything else → 500
fn error_response(err: Error) -> ApiError {
    let status = match &err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("{err}");
    }
    (status, Json(ErrorResponse { error: err.to_string() }))
}

/// Malformed query strings get the same JSON body as every other 400
fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| error_response(Error::InvalidInput(rejection.body_text())))
}

pub async fn search_companies(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<CompanyRecord>>, ApiError> {
    let query = query_params(params)?.q.unwrap_or_default();
    let companies = state.explorer.search_companies(&query).await.map_err(error_response)?;
    Ok(Json(companies))
}

pub async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<CompanyRecord>, ApiError> {
    let company = state.explorer.company(&ticker).await.map_err(error_response)?;
    Ok(Json(company))
}

pub async fn get_company_filings(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    params: Result<Query<FilingsParams>, QueryRejection>,
) -> Result<Json<Vec<FilingRecord>>, ApiError> {
    let params = query_params(params)?;
    let limit = params.limit.unwrap_or(DEFAULT_FILINGS_LIMIT);
    let filings = state
        .explorer
        .list_filings(&ticker, params.form.as_deref(), limit)
        .await
        .map_err(error_response)?;
    Ok(Json(filings))
}

pub async fn get_company_financials(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<Financials>, ApiError> {
    let financials = state.explorer.financials(&ticker).await.map_err(error_response)?;
    Ok(Json(financials))
}

pub async fn get_filing(
    State(state): State<Arc<AppState>>,
    Path(accession_no): Path<String>,
) -> Result<Json<FilingDetail>, ApiError> {
    let filing = state.explorer.filing(&accession_no).await.map_err(error_response)?;
    Ok(Json(filing))
}

pub async fn get_recent_filings(
    State(state): State<Arc<AppState>>,
    params: Result<Query<FilingsParams>, QueryRejection>,
) -> Result<Json<Vec<FilingRecord>>, ApiError> {
    let params = query_params(params)?;
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let filings = state
        .explorer
        .recent_filings(params.form.as_deref(), limit)
        .await
        .map_err(error_response)?;
    Ok(Json(filings))
}

pub async fn get_form_types() -> Json<&'static [FormType]> {
    Json(record::form_types())
}

pub async fn get_filing_attachments(
    State(state): State<Arc<AppState>>,
    Path(accession_no): Path<String>,
) -> Result<Json<Vec<AttachmentLink>>, ApiError> {
    let attachments = state.explorer.attachments(&accession_no).await.map_err(error_response)?;
    Ok(Json(attachments))
}

fn attachment_response(content: AttachmentContent, disposition: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, content.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content.bytes,
    )
}

pub async fn download_attachment(
    State(state): State<Arc<AppState>>,
    Path((accession_no, filename)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let content = state
        .explorer
        .download_attachment(&accession_no, &filename)
        .await
        .map_err(error_response)?;
    let disposition = format!("attachment; filename={}", content.filename);
    Ok(attachment_response(content, disposition))
}

pub async fn view_attachment(
    State(state): State<Arc<AppState>>,
    Path((accession_no, filename)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let content = state
        .explorer
        .view_attachment(&accession_no, &filename)
        .await
        .map_err(error_response)?;
    Ok(attachment_response(content, "inline".to_string()))
}
