//! Core library for glreport
//!
//! This crate implements the **Functional Core** of the glreport application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The glreport project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`glreport_core`** (this crate): Issue model, filtering, aggregation and report tree, with zero I/O
//! - **`glreport`**: GitLab provider, exporters and CLI (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no clock reads
//! - **Deterministic**: Time-dependent rules use the reference instant of the collection
//! - **Testable**: Can be tested with simple fixture data, no mocking required
//!
//! # Module Organization
//!
//! - [`issue`]: Normalized issue record and the user/group/project entities
//! - [`filter`]: Declarative per-field filters
//! - [`issues`]: The [`Issues`](issues::Issues) collection with `filter` and `group_by`
//! - [`report`]: Report → Section → Group → Column tree
//! - [`dump`]: Plain export tree produced by a loaded report
//! - [`config`]: Report configuration model and validation
//! - [`gitlab`]: Transformations for GitLab REST v4 payloads
//! - [`summary`]: Per-group and per-project figures
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use glreport_core::config::ReportConfig;
//! use glreport_core::issues::Issues;
//! use glreport_core::report::Report;
//!
//! let config = ReportConfig::from_json(text)?;
//! let mut report = Report::new(&config);
//!
//! // Issues come from the shell's provider
//! report.load(&Issues::new(issues, chrono::Utc::now()));
//!
//! let dump = report.dump()?;
//! assert_eq!(dump.sections.len(), config.sections.len());
//! ```

pub mod config;
pub mod dump;
pub mod filter;
pub mod gitlab;
pub mod issue;
pub mod issues;
pub mod report;
pub mod summary;
