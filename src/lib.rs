//! scaffolder materializes project trees from template trees.
//! Template expressions are expanded in path names and file contents, and in merge
//! mode freshly rendered files are reconciled with the ones already on disk.

/// Tree walk orchestrating rendering, writing and pruning
pub mod builder;

/// Command-line interface module for the scaffolder binary
pub mod cli;

/// Template configuration and build context loading
/// Supports JSON and YAML formats (scaffolder.json, scaffolder.yml, scaffolder.yaml)
pub mod config;

/// Error types and handling
pub mod error;

/// Shell command execution inside generated projects
pub mod executor;

/// Output filesystem abstraction
pub mod fs;

/// File and directory ignore patterns
pub mod ignore;

pub mod logger;

/// Module name extraction from project manifests
pub mod manifest;

/// Merge functions, their registry and the write policy
pub mod merge;

pub mod platform;

/// Template engine abstraction and the MiniJinja implementation
pub mod renderer;

pub mod report;

/// Per-segment expansion of templated paths
pub mod rewrite;

/// Read-only template trees on disk or in memory
pub mod source;

/// Tool self-update through module proxies
pub mod update;

pub use builder::Builder;
pub use error::{Error, Result};
