// src/routes/central_programs.rs

use axum::{extract::{Query, State}, Json};
use sqlx::query_as;

use crate::{
    models::{
        BargainingUnitRow, CentralProgram, Overview, OverviewRow, ProgramRow, ProgramSankey,
        ProgramSankeyLinkRow, ResourceSpend, SankeyNodeRow, StaffRoleRow, TimeSeriesRow,
    },
    queries, reshape,
    sankey::{build_program_sankey, ResourceGrouping},
    AppState,
};
use super::{internal_error, ApiError, ReportQ};

const DEFAULT_PROGRAM_MIN_SPEND: f64 = 0.0;

/// GET /api/central-programs
pub async fn list_programs(
    State(state): State<AppState>,
    Query(q): Query<ReportQ>,
) -> Result<Json<Vec<CentralProgram>>, ApiError> {
    let year = q.year_or(state.latest_year);

    let programs = query_as::<_, ProgramRow>(queries::CENTRAL_PROGRAMS)
        .bind(year)
        .fetch_all(&state.pool).await.map_err(internal_error)?;

    let roles = query_as::<_, StaffRoleRow>(queries::STAFF_ROLES)
        .bind(year)
        .fetch_all(&state.pool).await.map_err(internal_error)?;

    let units = query_as::<_, BargainingUnitRow>(queries::STAFF_BARGAINING_UNITS)
        .bind(year)
        .fetch_all(&state.pool).await.map_err(internal_error)?;

    let series = query_as::<_, TimeSeriesRow>(queries::PROGRAM_TIME_SERIES)
        .fetch_all(&state.pool).await.map_err(internal_error)?;

    tracing::debug!(year, programs = programs.len(), "central programs loaded");
    Ok(Json(reshape::build_programs(year, programs, roles, units, series)))
}

/// GET /api/central-programs/resources
pub async fn list_resources(
    State(state): State<AppState>,
    Query(q): Query<ReportQ>,
) -> Result<Json<Vec<ResourceSpend>>, ApiError> {
    let rows = query_as::<_, ResourceSpend>(queries::CENTRAL_RESOURCES)
        .bind(q.year_or(state.latest_year))
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

/// GET /api/central-programs/sankey
pub async fn program_sankey(
    State(state): State<AppState>,
    Query(q): Query<ReportQ>,
) -> Result<Json<Vec<ProgramSankey>>, ApiError> {
    let year = q.year_or(state.latest_year);
    let min_spend = q.min_spend.unwrap_or(DEFAULT_PROGRAM_MIN_SPEND);
    let grouping = ResourceGrouping::from_param(q.group_by.as_deref());

    let nodes = query_as::<_, SankeyNodeRow>(&queries::program_sankey_nodes())
        .bind(year)
        .bind(min_spend)
        .fetch_all(&state.pool).await.map_err(internal_error)?;

    let links = query_as::<_, ProgramSankeyLinkRow>(&queries::program_sankey_links(grouping))
        .bind(year)
        .bind(min_spend)
        .fetch_all(&state.pool).await.map_err(internal_error)?;

    Ok(Json(build_program_sankey(grouping, nodes, links)))
}

/// GET /api/central-programs/overview
pub async fn overview(
    State(state): State<AppState>,
    Query(q): Query<ReportQ>,
) -> Result<Json<Vec<Overview>>, ApiError> {
    let year = q.year_or(state.latest_year);
    let rows = query_as::<_, OverviewRow>(queries::CENTRAL_OVERVIEW)
        .fetch_all(&state.pool).await.map_err(internal_error)?;

    if !rows.iter().any(|r| r.year == year) {
        tracing::warn!(year, "no overview row for requested year");
    }
    Ok(Json(vec![reshape::build_overview(year, rows)]))
}
