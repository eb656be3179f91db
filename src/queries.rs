// src/queries.rs
//
// SQL for every report. Bind order is always `$1 = year`, `$2 = minSpend`.
// Central programs are sites with code >= 900. Site 998 (budget plug for
// interim) is left out of the single-year reports and Sankey graphs but still
// counts in the multi-year time series and overview; 996 (site contingency) is
// left out of the program listing only.

use crate::sankey::ResourceGrouping;

/// Object code ranges mapped to object categories. First match wins; codes
/// outside every range fall back to `objects.short`.
pub const OBJECT_CATEGORIES: &[(u32, u32, &str)] = &[
    (1000, 1999, "Certificated Salaries"),
    (2000, 2999, "Classified Salaries"),
    (3000, 3999, "Employee Benefits"),
    (4000, 4999, "Supplies"),
    (5000, 5999, "Consultants and Services"),
    (6000, 6999, "Capital Expenses"),
    (7100, 7199, "Tuition"),
    (7200, 7299, "Interagency Transfers Out"),
    (7300, 7399, "Transfers of Indirect Costs"),
    (7430, 7439, "Debt Repayment"),
    (7600, 7699, "Other Financing"),
    (8010, 8099, "LCFF Sources"),
    (8100, 8299, "Federal Revenue"),
    (8300, 8599, "Other State Revenue"),
    (8600, 8799, "Other Local Revenue"),
    (8900, 8999, "Other Financing Sources"),
];

pub const CENTRAL_PROGRAMS: &str = r#"
    SELECT p.code, p.name, p.category, p.spending, p.budget, p.year,
           staff.sum_fte AS eoy_total_fte,
           staff.eoy_total_positions,
           ROUND(((1 - p.spending / NULLIF(p.budget, 0)) * 100)::numeric, 1)::float8
               AS remaining_budget_percent
    FROM (
        SELECT e.site_code::int AS code, s.description AS name, s.category,
               SUM(e.ytd_actual)::float8 AS spending,
               SUM(e.budget)::float8 AS budget,
               e.year::int AS year
        FROM expenditures e
        LEFT JOIN sites s ON e.site_code = s.code
        WHERE e.site_code >= 900
          AND e.site_code NOT IN (996, 998)
          AND e.year = $1
        GROUP BY e.site_code, s.description, e.year, s.category
        HAVING SUM(e.ytd_actual) > 0
    ) p
    LEFT JOIN (
        SELECT st.site_code::int AS site_code,
               SUM(st.fte)::float8 AS sum_fte,
               CAST(COUNT(DISTINCT m.position_id) AS INT) AS eoy_total_positions
        FROM (SELECT position_id, MAX(assignment_id) AS max_assignment
              FROM staffing
              WHERE year = $1
              GROUP BY position_id) m
        JOIN staffing st
          ON st.position_id = m.position_id AND st.assignment_id = m.max_assignment
        GROUP BY st.site_code
    ) staff ON p.code = staff.site_code
    ORDER BY p.name
"#;

pub const STAFF_ROLES: &str = r#"
    SELECT st.site_code::int AS site_code,
           COALESCE(jc.display, jc.description) AS role_description,
           CAST(COUNT(DISTINCT m.position_id) AS INT) AS eoy_total_positions_for_role
    FROM (SELECT position_id, MAX(assignment_id) AS max_assignment
          FROM staffing
          WHERE year = $1
          GROUP BY position_id) m
    JOIN staffing st
      ON st.position_id = m.position_id AND st.assignment_id = m.max_assignment
    JOIN job_classes jc ON TRIM(st.job_class_id) = jc.job_class_id
    WHERE st.site_code >= 900
      AND st.year = $1
    GROUP BY st.site_code, jc.description, jc.display
    ORDER BY st.site_code
"#;

pub const STAFF_BARGAINING_UNITS: &str = r#"
    SELECT st.site_code::int AS site_code,
           bu.abbreviation,
           bu.description AS bargaining_unit_name,
           CAST(COUNT(DISTINCT m.position_id) AS INT) AS eoy_total_positions_for_bu
    FROM (SELECT position_id, MAX(assignment_id) AS max_assignment
          FROM staffing
          WHERE year = $1
          GROUP BY position_id) m
    LEFT JOIN staffing st
      ON st.position_id = m.position_id AND st.assignment_id = m.max_assignment
    LEFT JOIN bargaining_units bu ON TRIM(st.bargaining_unit_id) = bu.bargaining_unit
    WHERE st.site_code >= 900
      AND st.year = $1
    GROUP BY st.site_code, bu.abbreviation, bu.description
    ORDER BY st.site_code
"#;

/// Every year on record, not just the requested one.
pub const PROGRAM_TIME_SERIES: &str = r#"
    WITH spending AS (
        SELECT e.site_code, e.year,
               SUM(e.ytd_actual) AS spending,
               SUM(e.budget) AS budget
        FROM expenditures e
        WHERE e.site_code >= 900
        GROUP BY e.site_code, e.year
    ),
    eoy AS (
        SELECT position_id, year, MAX(assignment_id) AS max_assignment
        FROM staffing
        GROUP BY position_id, year
    ),
    staff_totals AS (
        SELECT st.site_code, eoy.year,
               SUM(st.fte) AS sum_fte,
               CAST(COUNT(DISTINCT eoy.position_id) AS INT) AS eoy_total_positions
        FROM eoy
        JOIN staffing st
          ON st.position_id = eoy.position_id AND st.assignment_id = eoy.max_assignment
        WHERE st.site_code >= 900
        GROUP BY st.site_code, eoy.year
    )
    SELECT t.site_code::int AS site_code,
           t.year::int AS year,
           t.eoy_total_positions,
           t.sum_fte::float8 AS eoy_total_fte,
           sp.spending::float8 AS spending,
           sp.budget::float8 AS budget
    FROM staff_totals t
    JOIN spending sp ON sp.year = t.year AND sp.site_code = t.site_code
    ORDER BY t.site_code, t.year
"#;

pub const CENTRAL_RESOURCES: &str = r#"
    SELECT e.resource_code::int AS code,
           r.description AS name,
           r.category,
           SUM(e.ytd_actual)::float8 AS spending,
           SUM(e.budget)::float8 AS budget,
           e.year::int AS year
    FROM expenditures e
    LEFT JOIN resources r ON e.resource_code = r.code
    WHERE e.site_code >= 900
      AND e.site_code != 998
      AND e.year = $1
    GROUP BY e.resource_code, r.description, e.year, r.category
    ORDER BY e.resource_code
"#;

/// Central totals next to district-wide ("all OUSD") totals, one row per year.
pub const CENTRAL_OVERVIEW: &str = r#"
    WITH spending AS (
        SELECT e.year, SUM(e.ytd_actual) AS spending, SUM(e.budget) AS budget
        FROM expenditures e
        WHERE e.site_code >= 900
        GROUP BY e.year
    ),
    eoy AS (
        SELECT position_id, year, MAX(assignment_id) AS max_assignment
        FROM staffing
        GROUP BY position_id, year
    ),
    staff AS (
        SELECT eoy.year,
               SUM(st.fte) AS sum_fte,
               CAST(COUNT(DISTINCT eoy.position_id) AS INT) AS eoy_total_positions
        FROM eoy
        JOIN staffing st
          ON st.position_id = eoy.position_id AND st.assignment_id = eoy.max_assignment
        WHERE st.site_code >= 900
        GROUP BY eoy.year
    ),
    all_spending AS (
        SELECT e.year, SUM(e.ytd_actual) AS spending, SUM(e.budget) AS budget
        FROM expenditures e
        GROUP BY e.year
    ),
    all_staff AS (
        SELECT eoy.year,
               SUM(st.fte) AS sum_fte,
               CAST(COUNT(DISTINCT eoy.position_id) AS INT) AS eoy_total_positions
        FROM eoy
        JOIN staffing st
          ON st.position_id = eoy.position_id AND st.assignment_id = eoy.max_assignment
        GROUP BY eoy.year
    )
    SELECT st.year::int AS year,
           st.eoy_total_positions,
           st.sum_fte::float8 AS eoy_total_fte,
           sp.spending::float8 AS spending,
           sp.budget::float8 AS budget,
           aos.spending::float8 AS all_ousd_spending,
           aos.budget::float8 AS all_ousd_budget,
           ast.sum_fte::float8 AS all_ousd_eoy_total_fte,
           ast.eoy_total_positions AS all_ousd_eoy_total_positions
    FROM staff st
    JOIN spending sp ON sp.year = st.year
    JOIN all_spending aos ON aos.year = st.year
    JOIN all_staff ast ON ast.year = st.year
    ORDER BY st.year
"#;

/// District-wide nodes ignore `minSpend`; only `$1` is bound.
pub const DISTRICT_SANKEY_NODES: &str = r#"
    SELECT r.category AS id, 'resource' AS type,
           SUM(e.ytd_actual)::float8 AS total,
           string_agg(DISTINCT r.description, ', ') AS subnodes
    FROM expenditures e
    LEFT JOIN resources r ON r.code = e.resource_code
    WHERE e.year = $1
      AND e.site_code >= 900
      AND e.site_code != 998
    GROUP BY r.category
    HAVING SUM(e.ytd_actual) > 0

    UNION ALL

    SELECT s.category AS id, 'site' AS type,
           SUM(e.ytd_actual)::float8 AS total,
           string_agg(DISTINCT s.description, ', ') AS subnodes
    FROM expenditures e
    LEFT JOIN sites s ON s.code = e.site_code
    WHERE e.year = $1
      AND e.site_code >= 900
      AND e.site_code != 998
    GROUP BY s.category
    HAVING SUM(e.ytd_actual) > 0
"#;

pub fn object_category_case() -> String {
    let mut sql = String::from("CASE");
    for (low, high, label) in OBJECT_CATEGORIES {
        sql.push_str(&format!(" WHEN o.code BETWEEN {low} AND {high} THEN '{label}'"));
    }
    sql.push_str(" ELSE o.short END");
    sql
}

pub fn program_sankey_nodes() -> String {
    let object_category = object_category_case();
    format!(
        r#"
    SELECT r.category AS id, 'resource' AS type,
           e.site_code::int AS site_code,
           SUM(e.ytd_actual)::float8 AS total,
           string_agg(DISTINCT r.description, ', ') AS subnodes
    FROM expenditures e
    LEFT JOIN resources r ON r.code = e.resource_code
    WHERE e.year = $1
      AND e.site_code >= 900
      AND e.site_code != 998
    GROUP BY r.category, e.site_code
    HAVING SUM(e.ytd_actual)::float8 > $2

    UNION ALL

    SELECT {object_category} AS id, 'object_category' AS type,
           e.site_code::int AS site_code,
           SUM(e.ytd_actual)::float8 AS total,
           string_agg(DISTINCT o.short, ', ') AS subnodes
    FROM expenditures e
    LEFT JOIN objects o ON o.code = e.object_code
    WHERE e.year = $1
      AND e.site_code >= 900
      AND e.site_code != 998
    GROUP BY e.site_code, {object_category}
    HAVING SUM(e.ytd_actual)::float8 > $2
    ORDER BY site_code, total
"#
    )
}

pub fn program_sankey_links(grouping: ResourceGrouping) -> String {
    let object_category = object_category_case();
    let col = grouping.column();
    let mut sql = format!(
        r#"
    SELECT e.site_code::int AS site_code,
           SUM(e.ytd_actual)::float8 AS value,
           r.{col} AS source,
           {object_category} AS target
    FROM expenditures e
    LEFT JOIN resources r ON e.resource_code = r.code
    LEFT JOIN objects o ON o.code = e.object_code
    WHERE e.year = $1
      AND e.site_code >= 900
      AND e.site_code != 998
    GROUP BY r.{col}, e.site_code, {object_category}
    HAVING SUM(e.ytd_actual)::float8 > $2
"#
    );
    if grouping == ResourceGrouping::Restricted {
        sql.push_str(
            r#"
    UNION ALL

    SELECT e.site_code::int AS site_code,
           SUM(e.ytd_actual)::float8 AS value,
           r.category AS source,
           r.type AS target
    FROM expenditures e
    LEFT JOIN resources r ON e.resource_code = r.code
    WHERE e.year = $1
      AND e.site_code >= 900
      AND e.site_code != 998
    GROUP BY r.category, r.type, e.site_code
    HAVING SUM(e.ytd_actual)::float8 > $2
"#,
        );
    }
    sql
}

pub fn district_sankey_links(grouping: ResourceGrouping) -> String {
    let col = grouping.column();
    let mut sql = format!(
        r#"
    SELECT SUM(e.ytd_actual)::float8 AS value,
           r.{col} AS source,
           s.category AS target
    FROM expenditures e
    LEFT JOIN sites s ON e.site_code = s.code
    LEFT JOIN resources r ON e.resource_code = r.code
    WHERE e.year = $1
      AND e.site_code >= 900
      AND e.site_code != 998
    GROUP BY s.category, r.{col}
    HAVING SUM(e.ytd_actual)::float8 >= $2
"#
    );
    if grouping == ResourceGrouping::Restricted {
        sql.push_str(
            r#"
    UNION ALL

    SELECT SUM(e.ytd_actual)::float8 AS value,
           r.category AS source,
           r.type AS target
    FROM expenditures e
    LEFT JOIN resources r ON e.resource_code = r.code
    WHERE e.year = $1
      AND e.site_code >= 900
      AND e.site_code != 998
    GROUP BY r.category, r.type
    HAVING SUM(e.ytd_actual)::float8 >= $2
"#,
        );
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_lists_ranges_in_order_and_falls_back_to_short() {
        let case = object_category_case();
        assert!(case.starts_with("CASE WHEN o.code BETWEEN 1000 AND 1999 THEN 'Certificated Salaries'"));
        assert!(case.ends_with("ELSE o.short END"));
        let supplies = case.find("'Supplies'").unwrap();
        let tuition = case.find("'Tuition'").unwrap();
        assert!(supplies < tuition);
        assert_eq!(case.matches(" WHEN ").count(), OBJECT_CATEGORIES.len());
    }

    #[test]
    fn object_ranges_do_not_overlap() {
        for pair in OBJECT_CATEGORIES.windows(2) {
            assert!(pair[0].1 < pair[1].0, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn links_use_grouping_column() {
        let by_category = program_sankey_links(ResourceGrouping::Category);
        assert!(by_category.contains("r.category AS source"));
        assert!(!by_category.contains("UNION ALL"));

        let restricted = program_sankey_links(ResourceGrouping::Restricted);
        assert!(restricted.contains("r.type AS source"));
        assert!(restricted.contains("UNION ALL"));
        assert!(restricted.contains("r.type AS target"));
    }

    #[test]
    fn district_links_are_inclusive_of_min_spend() {
        let sql = district_sankey_links(ResourceGrouping::Category);
        assert!(sql.contains(">= $2"));
        assert!(sql.contains("s.category AS target"));
        assert_eq!(
            district_sankey_links(ResourceGrouping::Restricted).matches("UNION ALL").count(),
            1
        );
    }

    #[test]
    fn program_nodes_filter_on_min_spend() {
        let sql = program_sankey_nodes();
        assert_eq!(sql.matches("> $2").count(), 2);
        assert!(sql.contains("'object_category' AS type"));
    }

    #[test]
    fn user_input_is_only_ever_bound() {
        for sql in [CENTRAL_PROGRAMS, STAFF_ROLES, STAFF_BARGAINING_UNITS, CENTRAL_RESOURCES] {
            assert!(sql.contains("$1"));
            assert!(!sql.contains("$2"));
        }
        assert!(!PROGRAM_TIME_SERIES.contains('$'));
        assert!(!CENTRAL_OVERVIEW.contains('$'));
        assert!(CENTRAL_PROGRAMS.contains("NOT IN (996, 998)"));
    }
}
