// src/models/mod.rs

use serde::Serialize;
use sqlx::FromRow;

// ───────────────────────────────────────
// Central programs
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProgramRow {
    pub code: i32,                        // site code
    pub name: Option<String>,
    pub category: Option<String>,
    pub spending: f64,
    pub budget: Option<f64>,
    pub year: i32,
    pub eoy_total_fte: Option<f64>,
    pub eoy_total_positions: Option<i32>,
    pub remaining_budget_percent: Option<f64>, // NULL when budget is 0
}

#[derive(Debug, Clone, FromRow)]
pub struct StaffRoleRow {
    pub site_code: i32,
    pub role_description: Option<String>,
    pub eoy_total_positions_for_role: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffRole {
    pub role_description: Option<String>,
    pub eoy_total_positions_for_role: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct BargainingUnitRow {
    pub site_code: i32,
    pub abbreviation: Option<String>,
    pub bargaining_unit_name: Option<String>,
    pub eoy_total_positions_for_bu: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BargainingUnitCount {
    pub abbreviation: Option<String>,
    pub bargaining_unit_name: Option<String>,
    pub eoy_total_positions_for_bu: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct TimeSeriesRow {
    pub site_code: i32,
    pub year: i32,
    pub eoy_total_positions: i32,
    pub eoy_total_fte: Option<f64>,
    pub spending: Option<f64>,
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub year: i32,
    pub eoy_total_fte: Option<f64>,
    pub eoy_total_positions: i32,
    pub spending: Option<f64>,
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearOverYearChange {
    pub previous_year: i32,
    pub eoy_total_fte: Option<f64>,
    pub eoy_total_positions: Option<i32>,
    pub spending: Option<f64>,
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramHistory {
    pub time_series: Vec<TimeSeriesPoint>,
    pub change_from_previous_year: Option<YearOverYearChange>,
}

/// One entry of `GET /api/central-programs`.
#[derive(Debug, Clone, Serialize)]
pub struct CentralProgram {
    #[serde(flatten)]
    pub program: ProgramRow,
    pub staff_roles: Vec<StaffRole>,
    pub staff_bargaining_units: Vec<BargainingUnitCount>,
    // absent (not null) when the site has no time series
    #[serde(flatten)]
    pub history: Option<ProgramHistory>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResourceSpend {
    pub code: Option<i32>,                // resource code
    pub name: Option<String>,
    pub category: Option<String>,
    pub spending: Option<f64>,
    pub budget: Option<f64>,
    pub year: i32,
}

// ───────────────────────────────────────
// Overview (central vs. district-wide)
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct OverviewRow {
    pub year: i32,
    pub eoy_total_positions: i32,
    pub eoy_total_fte: Option<f64>,
    pub spending: Option<f64>,
    pub budget: Option<f64>,
    pub all_ousd_spending: Option<f64>,
    pub all_ousd_budget: Option<f64>,
    pub all_ousd_eoy_total_fte: Option<f64>,
    pub all_ousd_eoy_total_positions: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewChange {
    pub eoy_total_positions: i32,
    pub eoy_total_fte: Option<f64>,
    pub spending: Option<f64>,
    pub budget: Option<f64>,
    pub all_ousd_spending: Option<f64>,
    pub all_ousd_budget: Option<f64>,
    pub all_ousd_eoy_total_fte: Option<f64>,
    pub all_ousd_eoy_total_positions: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    #[serde(flatten)]
    pub current: Option<OverviewRow>,
    pub time_series: Vec<OverviewRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_from_previous_year: Option<OverviewChange>,
}

// ───────────────────────────────────────
// Sankey graphs
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SankeyNode {
    pub id: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,                     // resource | site | object_category | resource_type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    pub subnodes: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SankeyNodeRow {
    pub site_code: i32,
    pub id: Option<String>,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub total: f64,
    pub subnodes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SankeyLink {
    pub value: f64,
    pub source: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProgramSankeyLinkRow {
    pub site_code: i32,
    pub value: f64,
    pub source: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramSankey {
    pub site_code: i32,
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SankeyGraph {
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}
