use axum::http::StatusCode;
use serde::Deserialize;

pub mod central_programs;
pub mod health;
pub mod sankey;

pub type ApiError = (StatusCode, String);

// Common error mapper
pub fn internal_error<E: std::fmt::Display>(e: E) -> ApiError {
    tracing::error!(error = %e, "report query failed");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {e}"))
}

/// Query string shared by the report routes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQ {
    pub year: Option<i32>,
    pub min_spend: Option<f64>,
    pub group_by: Option<String>,
}

impl ReportQ {
    pub fn year_or(&self, latest_year: i32) -> i32 {
        self.year.unwrap_or(latest_year)
    }
}
