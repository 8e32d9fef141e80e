// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! TOML loader for table definitions.
//!
//! A table definition names the table and its typed columns:
//!
//! ```toml
//! name = "packages"
//!
//! [[columns]]
//! name = "id"
//! type = "int(4)"
//!
//! [[columns]]
//! name = "pkg_name"
//! type = "char(32)"
//! ```
//!
//! The loader validates the definition on the way in: the table needs at
//! least one column, column names must be unique, and every type string
//! must parse to a known [`DataType`].

use std::path::Path;

use serde::Deserialize;

use crate::error::{ReedError, ReedResult};
use crate::schema::types::DataType;

/// Raw TOML shape of a table definition, before validation.
#[derive(Debug, Deserialize)]
struct TableFile {
    name: String,
    #[serde(default)]
    columns: Vec<ColumnFile>,
}

#[derive(Debug, Deserialize)]
struct ColumnFile {
    name: String,
    #[serde(rename = "type")]
    col_type: String,
}

/// A validated column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name
    pub name: String,

    /// Physical type of the column
    pub data_type: DataType,
}

/// A validated table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    /// Table name
    pub name: String,

    /// Column definitions in declaration order
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    /// Parse and validate a table definition from TOML text.
    pub fn from_toml(input: &str) -> ReedResult<Self> {
        let raw: TableFile =
            toml::from_str(input).map_err(|e| ReedError::DeserializationError {
                reason: e.to_string(),
            })?;

        if raw.name.trim().is_empty() {
            return Err(ReedError::InvalidSchema {
                reason: "table name must not be empty".to_string(),
            });
        }
        if raw.columns.is_empty() {
            return Err(ReedError::InvalidSchema {
                reason: format!("table '{}' has no columns", raw.name),
            });
        }

        let mut columns = Vec::with_capacity(raw.columns.len());
        for col in &raw.columns {
            if columns
                .iter()
                .any(|c: &ColumnDef| c.name == col.name)
            {
                return Err(ReedError::InvalidSchema {
                    reason: format!("duplicate column '{}'", col.name),
                });
            }
            let data_type: DataType = col.col_type.parse()?;
            columns.push(ColumnDef {
                name: col.name.clone(),
                data_type,
            });
        }

        Ok(TableDef {
            name: raw.name,
            columns,
        })
    }

    /// The column types in declaration order.
    pub fn data_types(&self) -> Vec<DataType> {
        self.columns.iter().map(|c| c.data_type).collect()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Load a table definition from a TOML file.
///
/// ## Input
/// - `path`: Path to the table definition file
///
/// ## Output
/// - `Ok(TableDef)`: Parsed and validated definition
/// - `Err(ReedError)`: I/O error, TOML error, or validation failure
pub fn load_table_def<P: AsRef<Path>>(path: P) -> ReedResult<TableDef> {
    let input = std::fs::read_to_string(&path).map_err(|e| ReedError::IoError {
        operation: "load_table_def".to_string(),
        reason: format!("{}: {}", path.as_ref().display(), e),
    })?;
    TableDef::from_toml(&input)
}
