//! memorial - search the testimonies of Tony's memorial book.
//!
//! This library loads a fixed corpus of testimonies, builds a weighted fuzzy
//! search index over it, and associates magazine photographs with
//! testimonies through their filenames.
//!
//! # Modules
//!
//! - [`commands`] - High-level operations shared by the CLI and MCP server
//! - [`corpus`] - Testimony records and corpus loading
//! - [`search`] - Fuzzy index, filters and result ordering
//! - [`highlight`] - Match highlighting and preview truncation
//! - [`stats`] - Filter options, counts, featured entries, pagination
//! - [`images`] - Filename-convention image lookup
//! - [`storage`] - Corpus sources
//! - [`config`] - Configuration loading
//! - [`cli`] - Command-line interface definitions

pub mod cli;
pub mod commands;
pub mod config;
pub mod corpus;
pub mod highlight;
pub mod images;
pub mod search;
pub mod stats;
pub mod storage;

#[cfg(feature = "mcp")]
pub mod mcp;
