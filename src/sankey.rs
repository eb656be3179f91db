// src/sankey.rs

use std::collections::BTreeMap;

use crate::models::{
    ProgramSankey, ProgramSankeyLinkRow, SankeyGraph, SankeyLink, SankeyNode, SankeyNodeRow,
};

/// How funding resources are bucketed on the source side of a Sankey graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceGrouping {
    /// `resources.category`
    Category,
    /// `resources.type` (Restricted / Unrestricted), with category → type links added.
    Restricted,
}

impl ResourceGrouping {
    pub fn from_param(group_by: Option<&str>) -> Self {
        match group_by {
            Some("restricted") => Self::Restricted,
            _ => Self::Category,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Restricted => "type",
        }
    }
}

pub fn resource_type_nodes() -> Vec<SankeyNode> {
    ["Restricted", "Unrestricted"]
        .into_iter()
        .map(|id| SankeyNode {
            id: Some(id.to_string()),
            kind: "resource_type".to_string(),
            total: None,
            subnodes: Some(String::new()),
        })
        .collect()
}

fn blank_program(grouping: ResourceGrouping, site_code: i32) -> ProgramSankey {
    let nodes = match grouping {
        ResourceGrouping::Restricted => resource_type_nodes(),
        ResourceGrouping::Category => Vec::new(),
    };
    ProgramSankey { site_code, nodes, links: Vec::new() }
}

/// One graph per central site, ordered by site code.
pub fn build_program_sankey(
    grouping: ResourceGrouping,
    nodes: Vec<SankeyNodeRow>,
    links: Vec<ProgramSankeyLinkRow>,
) -> Vec<ProgramSankey> {
    let mut by_site: BTreeMap<i32, ProgramSankey> = BTreeMap::new();

    for row in nodes {
        by_site
            .entry(row.site_code)
            .or_insert_with(|| blank_program(grouping, row.site_code))
            .nodes
            .push(SankeyNode {
                id: row.id,
                kind: row.kind,
                total: Some(row.total),
                subnodes: row.subnodes,
            });
    }

    for row in links {
        by_site
            .entry(row.site_code)
            .or_insert_with(|| blank_program(grouping, row.site_code))
            .links
            .push(SankeyLink { value: row.value, source: row.source, target: row.target });
    }

    by_site.into_values().collect()
}

pub fn build_district_sankey(
    grouping: ResourceGrouping,
    mut nodes: Vec<SankeyNode>,
    links: Vec<SankeyLink>,
) -> SankeyGraph {
    if grouping == ResourceGrouping::Restricted {
        nodes.extend(resource_type_nodes());
    }
    SankeyGraph { nodes, links }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(site_code: i32, id: &str, kind: &str, total: f64) -> SankeyNodeRow {
        SankeyNodeRow {
            site_code,
            id: Some(id.into()),
            kind: kind.into(),
            total,
            subnodes: Some(format!("{id} detail")),
        }
    }

    fn link(site_code: i32, source: &str, target: &str, value: f64) -> ProgramSankeyLinkRow {
        ProgramSankeyLinkRow {
            site_code,
            value,
            source: Some(source.into()),
            target: Some(target.into()),
        }
    }

    #[test]
    fn group_by_param() {
        assert_eq!(ResourceGrouping::from_param(Some("restricted")), ResourceGrouping::Restricted);
        assert_eq!(ResourceGrouping::from_param(Some("Restricted")), ResourceGrouping::Category);
        assert_eq!(ResourceGrouping::from_param(Some("site")), ResourceGrouping::Category);
        assert_eq!(ResourceGrouping::from_param(None), ResourceGrouping::Category);
        assert_eq!(ResourceGrouping::Restricted.column(), "type");
    }

    #[test]
    fn programs_are_grouped_and_sorted_by_site() {
        let graphs = build_program_sankey(
            ResourceGrouping::Category,
            vec![
                node(950, "General Purpose", "resource", 10.0),
                node(910, "Supplies", "object_category", 5.0),
                node(950, "Supplies", "object_category", 7.0),
            ],
            vec![
                link(950, "General Purpose", "Supplies", 7.0),
                link(910, "Title I", "Supplies", 5.0),
            ],
        );

        let codes: Vec<i32> = graphs.iter().map(|g| g.site_code).collect();
        assert_eq!(codes, vec![910, 950]);
        assert_eq!(graphs[1].nodes.len(), 2);
        assert_eq!(graphs[1].nodes[0].id.as_deref(), Some("General Purpose"));
        assert_eq!(graphs[0].links.len(), 1);
        assert_eq!(graphs[0].links[0].source.as_deref(), Some("Title I"));
    }

    #[test]
    fn restricted_grouping_seeds_resource_type_nodes() {
        let graphs = build_program_sankey(
            ResourceGrouping::Restricted,
            vec![node(920, "Restricted", "resource", 3.0)],
            vec![],
        );
        let ids: Vec<_> = graphs[0].nodes.iter().map(|n| n.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["Restricted", "Unrestricted", "Restricted"]);
        assert_eq!(graphs[0].nodes[0].kind, "resource_type");
    }

    #[test]
    fn links_without_nodes_still_get_a_site() {
        let graphs = build_program_sankey(
            ResourceGrouping::Category,
            vec![],
            vec![link(930, "Lottery", "Supplies", 1.5)],
        );
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].site_code, 930);
        assert!(graphs[0].nodes.is_empty());
    }

    #[test]
    fn resource_type_nodes_have_no_total() {
        let graph = build_district_sankey(ResourceGrouping::Restricted, vec![], vec![]);
        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(
            value["nodes"],
            json!([
                { "id": "Restricted", "type": "resource_type", "subnodes": "" },
                { "id": "Unrestricted", "type": "resource_type", "subnodes": "" }
            ])
        );
        assert_eq!(value["links"], json!([]));
    }

    #[test]
    fn district_graph_keeps_query_nodes_first() {
        let nodes = vec![SankeyNode {
            id: Some("Central".into()),
            kind: "site".into(),
            total: Some(42.0),
            subnodes: Some("Facilities".into()),
        }];
        let graph = build_district_sankey(ResourceGrouping::Category, nodes.clone(), vec![]);
        assert_eq!(graph.nodes, nodes);

        let graph = build_district_sankey(ResourceGrouping::Restricted, nodes, vec![]);
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.nodes[0].kind, "site");
    }
}
