//! `syllabus_core` selects and prunes the documents of a modular course.
//!
//! Documents declare the identifiers they provide, require and mention in a
//! `.. meta::` block. A nested YAML unit configuration picks the leaf
//! documents of one course and the levels and scenarios each one is taught
//! at. From those two inputs the library computes the selection tags for the
//! renderer and the smallest set of documents the course actually needs.
//!
//! ## Processing Pipeline
//!
//! ```text
//! syllabus.toml + course.yaml
//!   → Unit loader (validates the whole tree, fatal errors abort here)
//!   → Flattener (resolves default/all lists, emits tags and leaf documents)
//! *.rst documents
//!   → Extractor (metadata fields, roles, glossary terms, options, toctrees)
//!   → Provider registry (identifier → owning document)
//!   → Dependency graph (required and mentioned edges)
//!   → Closure resolver (required first, then mentioned)
//!   → Pruner (unused documents, filtered navigation, rebuild bookkeeping)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Loading `syllabus.toml`: level and scenario vocabularies, exclude patterns and the default course.
//! - [`unit`]: Parsing and validating nested unit configuration files.
//! - [`project`]: Document discovery and the [`plan_course`] pipeline.
//! - [`state`]: The persisted state of the previous build.
//!
//! ## Key Types
//!
//! - [`Identifier`]: A normalized `kind:value` token such as `term:lidar`.
//! - [`Document`]: A discovered document with its declared tokens.
//! - [`DependencyGraph`]: Required and mentioned edges between documents.
//! - [`Closure`]: The selected, required and mentioned documents.
//! - [`CoursePlan`]: Everything a renderer needs to build one course.
//! - [`CourseDiagnostic`]: A recoverable problem, reported as a warning.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use syllabus_core::PlanOptions;
//! use syllabus_core::plan_course;
//!
//! let options = PlanOptions {
//! 	course: Some("course.yaml".into()),
//! 	..PlanOptions::default()
//! };
//! let plan = plan_course(Path::new("."), &options).unwrap();
//!
//! for tag in &plan.tags {
//! 	println!("-t {tag}");
//! }
//! ```

pub use config::*;
pub use diagnostic::*;
pub use document::*;
pub use error::*;
pub use extract::UNIT_DURATION;
pub use extract::UNIT_INTERACTION;
pub use extract::UNIT_MENTIONS;
pub use extract::UNIT_PROVIDES;
pub use extract::UNIT_REQUIRES;
pub use extract::UNIT_TYPE;
pub use flatten::*;
pub use graph::*;
pub use identifier::*;
pub use project::*;
pub use pruner::*;
pub use registry::*;
pub use resolver::*;
pub use state::BuildState;
pub use state::Fingerprint;
pub use unit::*;

pub mod config;
mod diagnostic;
mod document;
#[allow(unused_assignments)]
mod error;
pub(crate) mod extract;
mod flatten;
mod graph;
mod identifier;
pub(crate) mod lexer;
pub mod project;
mod pruner;
mod registry;
mod resolver;
pub mod state;
pub mod unit;

#[cfg(test)]
mod __fixtures;
