// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Error types for ReedCore operations.
//!
//! Provides structured error handling with detailed context for debugging.
//! The storage, index, and planner cores are pure and infallible; errors
//! arise at the edges, when schemas, query specs, or cardinality files are
//! read, or when a constructed layout fails validation.

use std::fmt;

/// Standard Result type for all ReedCore operations.
pub type ReedResult<T> = Result<T, ReedError>;

/// Error types for ReedCore operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReedError {
    /// I/O error during file operations.
    IoError { operation: String, reason: String },

    /// Unknown column type in a schema definition.
    UnknownType { name: String },

    /// Invalid schema format.
    InvalidSchema { reason: String },

    /// A layout violated one of its structural invariants.
    InvalidLayout { reason: String },

    /// Unknown layout factory name.
    UnknownLayout { name: String },

    /// Unknown relation name in a query spec or cardinality file.
    UnknownRelation { name: String },

    /// Invalid query graph description.
    InvalidQueryGraph { reason: String },

    /// Deserialisation error (TOML or JSON input).
    DeserializationError { reason: String },
}

impl fmt::Display for ReedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReedError::IoError { operation, reason } => {
                write!(f, "I/O error during {}: {}", operation, reason)
            }
            ReedError::UnknownType { name } => {
                write!(f, "Unknown column type: {}", name)
            }
            ReedError::InvalidSchema { reason } => {
                write!(f, "Invalid schema: {}", reason)
            }
            ReedError::InvalidLayout { reason } => {
                write!(f, "Invalid layout: {}", reason)
            }
            ReedError::UnknownLayout { name } => {
                write!(f, "Unknown layout: {}", name)
            }
            ReedError::UnknownRelation { name } => {
                write!(f, "Unknown relation: {}", name)
            }
            ReedError::InvalidQueryGraph { reason } => {
                write!(f, "Invalid query graph: {}", reason)
            }
            ReedError::DeserializationError { reason } => {
                write!(f, "Deserialisation error: {}", reason)
            }
        }
    }
}

impl std::error::Error for ReedError {}
