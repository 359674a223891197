//! Core of querygen: turn generated native query source into a running,
//! dynamically loaded module.
//!
//! This crate provides:
//! - Source generation with in-place formatting
//! - Build tool invocation with exit-status and timeout reporting
//! - Loading of built artifacts through the bridge module table
//! - Bridge and query header templates
//! - The pipeline tying the three stages together

pub mod artifact;
pub mod build;
pub mod config;
pub mod error;
pub mod execute;
pub mod generate;
pub mod paths;
pub mod pipeline;
pub mod process;
pub mod template;
pub mod toolchain;

pub use artifact::ArtifactName;
pub use build::BuildInvoker;
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use execute::{DylibExecutor, ExecutionReport, Executor};
pub use generate::{Formatter, SourceGenerator};
pub use paths::EngineDirs;
pub use pipeline::{Pipeline, PipelineCallback, PipelineReport, Stage};
pub use template::{bridge_source, query_header, ElementType, FetchMode, QueryShape};
