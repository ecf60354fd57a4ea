//! Version management layer for dependency staleness checking
//!
//! This module provides the core functionality for looking up latest versions,
//! evaluating declared ranges against them, and caching the resulting reports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Registry  │────▶│   Checker   │────▶│    Cache    │
//! │  (latest)   │     │  (evaluate) │     │  (reports)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │
//!        ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐
//! │  Registries │     │   Matcher   │
//! │ (http, cli) │     │ (npm range) │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: Concurrent in-memory report cache
//! - [`checker`]: Turns declarations and latest versions into a report
//! - [`matcher`]: Range satisfaction trait and registry-specific implementations
//! - [`registry`]: Registry trait for looking up latest versions
//! - [`registries`]: Concrete registry implementations (npm HTTP, npm CLI)
//! - [`error`]: Error type for registry lookups
//! - [`semver`]: Shared semver utilities
//! - [`types`]: Report types like `StalenessReport`

pub mod cache;
pub mod checker;
pub mod error;
pub mod matcher;
pub mod matchers;
pub mod registries;
pub mod registry;
pub mod semver;
pub mod types;
