// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! `reedcore layout` - compute and print a physical layout report.

use std::path::Path;

use anyhow::{bail, Context};

use reedcore::error::ReedError;
use reedcore::layout::{
    DataLayout, LayoutFactory, NaiveRowLayoutFactory, OptimizedRowLayoutFactory, PaxLayoutFactory,
};
use reedcore::schema::{load_table_def, TableDef};

pub fn run(schema: &Path, layout_name: &str, format: &str) -> anyhow::Result<()> {
    let table = load_table_def(schema)
        .with_context(|| format!("cannot load table definition {}", schema.display()))?;

    let factory: Box<dyn LayoutFactory> = match layout_name {
        "row_naive" => Box::new(NaiveRowLayoutFactory),
        "row_optimized" => Box::new(OptimizedRowLayoutFactory),
        "pax4k" => Box::new(PaxLayoutFactory::new()),
        other => {
            return Err(ReedError::UnknownLayout {
                name: other.to_string(),
            })
            .context("expected row_naive, row_optimized, or pax4k");
        }
    };

    let types = table.data_types();
    let layout = factory.make(&types, 0);
    layout
        .validate(&types)
        .context("constructed layout failed validation")?;

    match format {
        "table" => print!("{}", format_table(&table, factory.name(), &layout)),
        "json" => println!("{}", format_json(&table, factory.name(), &layout)?),
        other => bail!("unknown format '{}' (expected table or json)", other),
    }
    Ok(())
}

/// Column name for a leaf index: the declared name, or the synthetic
/// NULL bitmap past the last attribute.
fn column_name(table: &TableDef, index: usize) -> String {
    if index < table.columns.len() {
        table.columns[index].name.clone()
    } else {
        "<null bitmap>".to_string()
    }
}

fn format_table(table: &TableDef, layout_name: &str, layout: &DataLayout) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "table {} | layout {} | stride {} bits | {} tuple(s) per node\n",
        table.name,
        layout_name,
        layout.stride_in_bits(),
        layout.child().num_tuples()
    ));

    let mut rows = Vec::new();
    for child in layout.child().children() {
        if let Some(leaf) = child.as_leaf() {
            rows.push((
                column_name(table, leaf.index()),
                leaf.data_type().to_string(),
                leaf.index().to_string(),
                child.offset_in_bits.to_string(),
                child.stride_in_bits.to_string(),
            ));
        }
    }

    let headers = ["column", "type", "index", "offset", "stride"];
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        let cells = [&row.0, &row.1, &row.2, &row.3, &row.4];
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(cell.len());
        }
    }

    let border = {
        let mut b = String::from("+");
        for w in &widths {
            b.push_str(&"-".repeat(w + 2));
            b.push('+');
        }
        b.push('\n');
        b
    };

    output.push_str(&border);
    output.push('|');
    for (w, h) in widths.iter().zip(headers) {
        output.push_str(&format!(" {:<width$} |", h, width = w));
    }
    output.push('\n');
    output.push_str(&border);
    for row in &rows {
        let cells = [&row.0, &row.1, &row.2, &row.3, &row.4];
        output.push('|');
        for (w, cell) in widths.iter().zip(cells) {
            output.push_str(&format!(" {:<width$} |", cell, width = w));
        }
        output.push('\n');
    }
    output.push_str(&border);
    output
}

fn format_json(
    table: &TableDef,
    layout_name: &str,
    layout: &DataLayout,
) -> anyhow::Result<String> {
    let leaves: Vec<serde_json::Value> = layout
        .child()
        .children()
        .filter_map(|child| {
            child.as_leaf().map(|leaf| {
                serde_json::json!({
                    "column": column_name(table, leaf.index()),
                    "type": leaf.data_type().to_string(),
                    "index": leaf.index(),
                    "offset_in_bits": child.offset_in_bits,
                    "stride_in_bits": child.stride_in_bits,
                })
            })
        })
        .collect();

    let report = serde_json::json!({
        "table": table.name,
        "layout": layout_name,
        "stride_in_bits": layout.stride_in_bits(),
        "num_tuples": layout.child().num_tuples(),
        "leaves": leaves,
    });
    Ok(serde_json::to_string_pretty(&report)?)
}
