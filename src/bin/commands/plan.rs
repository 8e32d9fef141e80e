// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! `reedcore plan` - find the cheapest join order for a query spec.
//!
//! The query spec is declarative TOML (parsing SQL is not this tool's
//! business):
//!
//! ```toml
//! database = "test"
//! relations = ["T0", "T1", "T2"]
//! joins = [["T0", "T1"], ["T1", "T2"]]
//! ```

use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;

use reedcore::error::ReedError;

use reedcore::planner::{
    CoutCostFunction, DpSubEnumerator, InjectionCardinalityEstimator, Optimizer, PlanTable,
    QueryGraph, Subproblem,
};

#[derive(Debug, Deserialize)]
struct QuerySpec {
    database: String,
    relations: Vec<String>,
    #[serde(default)]
    joins: Vec<(String, String)>,
}

fn load_query_spec(path: &Path) -> anyhow::Result<QuerySpec> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read query spec {}", path.display()))?;
    Ok(toml::from_str(&input)?)
}

fn build_graph(spec: &QuerySpec) -> anyhow::Result<QueryGraph> {
    let mut graph = QueryGraph::new(spec.relations.clone())?;
    for (a, b) in &spec.joins {
        let a_id = graph.source_id(a).ok_or_else(|| ReedError::UnknownRelation {
            name: a.clone(),
        })?;
        let b_id = graph.source_id(b).ok_or_else(|| ReedError::UnknownRelation {
            name: b.clone(),
        })?;
        graph.add_join(a_id, b_id)?;
    }
    Ok(graph)
}

pub fn run(query: &Path, cardinalities: &Path, format: &str) -> anyhow::Result<()> {
    let spec = load_query_spec(query)?;
    let graph = build_graph(&spec)?;
    let estimator = InjectionCardinalityEstimator::from_file(&spec.database, cardinalities)?;

    let optimizer = Optimizer::new(DpSubEnumerator, CoutCostFunction);
    let table = optimizer.optimize(&graph, &estimator);

    let Some(final_entry) = table.final_entry() else {
        bail!("query graph is empty or not connected; no complete plan exists");
    };
    let expression = table
        .plan_expression(&graph, graph.all_sources())
        .expect("final entry implies a complete plan");

    match format {
        "table" => {
            println!("plan: {}", expression);
            println!("cost: {}", final_entry.cost);
            println!("cardinality: {}", final_entry.model.cardinality);
            print!("{}", format_entries(&graph, &table));
        }
        "json" => {
            let report = serde_json::json!({
                "plan": expression,
                "cost": final_entry.cost,
                "cardinality": final_entry.model.cardinality,
                "entries": entries_json(&graph, &table),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        other => bail!("unknown format '{}' (expected table or json)", other),
    }
    Ok(())
}

/// Table entries sorted by subset size, then bitset value.
fn sorted_subsets(table: &PlanTable) -> Vec<Subproblem> {
    let mut subsets: Vec<Subproblem> = table.subproblems().collect();
    subsets.sort_by_key(|s| (s.size(), s.bits()));
    subsets
}

fn subset_names(graph: &QueryGraph, s: Subproblem) -> String {
    let names: Vec<String> = graph.relation_names(s).into_iter().collect();
    names.join(",")
}

fn format_entries(graph: &QueryGraph, table: &PlanTable) -> String {
    let width = graph.num_sources();
    let mut output = String::new();
    for s in sorted_subsets(table) {
        let entry = table.entry(s).expect("subset was filtered on presence");
        output.push_str(&format!(
            "  {} {{{}}}: cardinality {}, cost {}, via {}\n",
            s.to_bit_string(width),
            subset_names(graph, s),
            entry.model.cardinality,
            entry.cost,
            table
                .plan_expression(graph, s)
                .expect("every entry renders"),
        ));
    }
    output
}

fn entries_json(graph: &QueryGraph, table: &PlanTable) -> Vec<serde_json::Value> {
    let width = graph.num_sources();
    sorted_subsets(table)
        .into_iter()
        .map(|s| {
            let entry = table.entry(s).expect("subset was filtered on presence");
            serde_json::json!({
                "subproblem": s.to_bit_string(width),
                "relations": graph.relation_names(s),
                "cardinality": entry.model.cardinality,
                "cost": entry.cost,
                "plan": table.plan_expression(graph, s),
            })
        })
        .collect()
}
