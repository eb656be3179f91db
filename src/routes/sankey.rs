// src/routes/sankey.rs

use axum::{extract::{Query, State}, Json};
use sqlx::query_as;

use crate::{
    models::{SankeyGraph, SankeyLink, SankeyNode},
    queries,
    sankey::{build_district_sankey, ResourceGrouping},
    AppState,
};
use super::{internal_error, ApiError, ReportQ};

const DEFAULT_DISTRICT_MIN_SPEND: f64 = 100_000.0;

/// GET /api/sankey
pub async fn district_sankey(
    State(state): State<AppState>,
    Query(q): Query<ReportQ>,
) -> Result<Json<SankeyGraph>, ApiError> {
    let year = q.year_or(state.latest_year);
    let min_spend = q.min_spend.unwrap_or(DEFAULT_DISTRICT_MIN_SPEND);
    let grouping = ResourceGrouping::from_param(q.group_by.as_deref());

    let nodes = query_as::<_, SankeyNode>(queries::DISTRICT_SANKEY_NODES)
        .bind(year)
        .fetch_all(&state.pool).await.map_err(internal_error)?;

    let links = query_as::<_, SankeyLink>(&queries::district_sankey_links(grouping))
        .bind(year)
        .bind(min_spend)
        .fetch_all(&state.pool).await.map_err(internal_error)?;

    Ok(Json(build_district_sankey(grouping, nodes, links)))
}
