// src/reshape.rs

use std::collections::HashMap;

use crate::models::{
    BargainingUnitCount, BargainingUnitRow, CentralProgram, Overview, OverviewChange, OverviewRow,
    ProgramHistory, ProgramRow, StaffRole, StaffRoleRow, TimeSeriesPoint, TimeSeriesRow,
    YearOverYearChange,
};

/// A flat query row that carries a site code next to its payload.
pub trait SiteKeyed {
    type Value;
    fn split_site(self) -> (i32, Self::Value);
}

impl SiteKeyed for StaffRoleRow {
    type Value = StaffRole;
    fn split_site(self) -> (i32, StaffRole) {
        (
            self.site_code,
            StaffRole {
                role_description: self.role_description,
                eoy_total_positions_for_role: self.eoy_total_positions_for_role,
            },
        )
    }
}

impl SiteKeyed for BargainingUnitRow {
    type Value = BargainingUnitCount;
    fn split_site(self) -> (i32, BargainingUnitCount) {
        (
            self.site_code,
            BargainingUnitCount {
                abbreviation: self.abbreviation,
                bargaining_unit_name: self.bargaining_unit_name,
                eoy_total_positions_for_bu: self.eoy_total_positions_for_bu,
            },
        )
    }
}

impl SiteKeyed for TimeSeriesRow {
    type Value = TimeSeriesPoint;
    fn split_site(self) -> (i32, TimeSeriesPoint) {
        (
            self.site_code,
            TimeSeriesPoint {
                year: self.year,
                eoy_total_fte: self.eoy_total_fte,
                eoy_total_positions: self.eoy_total_positions,
                spending: self.spending,
                budget: self.budget,
            },
        )
    }
}

/// Groups rows by site code, keeping each group in query order.
pub fn group_by_site<R, I>(rows: I) -> HashMap<i32, Vec<R::Value>>
where
    R: SiteKeyed,
    I: IntoIterator<Item = R>,
{
    let mut grouped: HashMap<i32, Vec<R::Value>> = HashMap::new();
    for row in rows {
        let (code, value) = row.split_site();
        grouped.entry(code).or_default().push(value);
    }
    grouped
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn delta(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    Some(round2(current? - previous?))
}

pub fn change_from_previous_year(
    year: i32,
    program: &ProgramRow,
    series: &[TimeSeriesPoint],
) -> Option<YearOverYearChange> {
    let previous_year = year - 1;
    let prev = series.iter().find(|p| p.year == previous_year)?;
    Some(YearOverYearChange {
        previous_year,
        eoy_total_fte: delta(program.eoy_total_fte, prev.eoy_total_fte),
        eoy_total_positions: program.eoy_total_positions.map(|n| n - prev.eoy_total_positions),
        spending: delta(Some(program.spending), prev.spending),
        budget: delta(program.budget, prev.budget),
    })
}

/// Attaches staff roles, bargaining units and history to each program.
pub fn build_programs(
    year: i32,
    programs: Vec<ProgramRow>,
    roles: Vec<StaffRoleRow>,
    bargaining_units: Vec<BargainingUnitRow>,
    series: Vec<TimeSeriesRow>,
) -> Vec<CentralProgram> {
    let roles = group_by_site(roles);
    let units = group_by_site(bargaining_units);
    let series = group_by_site(series);

    programs
        .into_iter()
        .map(|program| {
            let code = program.code;
            let history = series.get(&code).map(|points| ProgramHistory {
                change_from_previous_year: change_from_previous_year(year, &program, points),
                time_series: points.clone(),
            });
            CentralProgram {
                staff_roles: roles.get(&code).cloned().unwrap_or_default(),
                staff_bargaining_units: units.get(&code).cloned().unwrap_or_default(),
                program,
                history,
            }
        })
        .collect()
}

fn overview_change(current: &OverviewRow, prev: &OverviewRow) -> OverviewChange {
    OverviewChange {
        eoy_total_positions: current.eoy_total_positions - prev.eoy_total_positions,
        eoy_total_fte: delta(current.eoy_total_fte, prev.eoy_total_fte),
        spending: delta(current.spending, prev.spending),
        budget: delta(current.budget, prev.budget),
        all_ousd_spending: delta(current.all_ousd_spending, prev.all_ousd_spending),
        all_ousd_budget: delta(current.all_ousd_budget, prev.all_ousd_budget),
        all_ousd_eoy_total_fte: delta(current.all_ousd_eoy_total_fte, prev.all_ousd_eoy_total_fte),
        all_ousd_eoy_total_positions: current.all_ousd_eoy_total_positions
            - prev.all_ousd_eoy_total_positions,
    }
}

pub fn build_overview(year: i32, rows: Vec<OverviewRow>) -> Overview {
    let current = rows.iter().find(|r| r.year == year).cloned();
    let change_from_previous_year = current.as_ref().and_then(|cur| {
        rows.iter()
            .find(|r| r.year == year - 1)
            .map(|prev| overview_change(cur, prev))
    });
    Overview { current, time_series: rows, change_from_previous_year }
}
