//! # lql-eval
//!
//! Routing evaluator for parsed LQL rule sets.
//!
//! This crate consumes the [`RuleSet`](lql_parser::RuleSet) produced by
//! [`lql_parser`] and tests individual log events against it, deciding which
//! routing sinks an event should be forwarded to.
//!
//! ## Architecture
//!
//! - **Extraction** ([`LogEvent::extract`]): dotted-path walk into the
//!   event's metadata tree, fanning out element-wise through lists of maps
//!   (existential semantics).
//! - **Dispatch** ([`matcher`]): typed operator evaluation. Total — type
//!   mismatches fail the predicate, never error.
//! - **Regex cache** ([`regex_cache`]): `~` patterns compile lazily into a
//!   bounded process-wide concurrent cache shared by all routes.
//! - **Routing** ([`Router`]): a registry of `(sink, rule set)` pairs;
//!   `route` answers which sinks match an event.
//!
//! Evaluation is CPU-bound and synchronous; rules and events are read-only,
//! so any number of threads may call [`matches`] concurrently.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use lql_eval::{LogEvent, Router};
//! use lql_parser::{Schema, parse};
//! use serde_json::json;
//!
//! let schema = Schema::from_metadata_sample(&json!({
//!     "level": "error",
//!     "users": {"source_count": 3},
//! }));
//!
//! let mut router = Router::new();
//! router.add_route("alerts", parse("metadata.level:error", &schema).unwrap()).unwrap();
//! router.add_route("busy", parse("metadata.users.source_count:>=100", &schema).unwrap()).unwrap();
//!
//! let event = LogEvent::new("disk failure", Utc::now())
//!     .with_metadata(json!({"level": "error", "users": {"source_count": 3}}));
//! assert_eq!(router.route(&event), vec!["alerts"]);
//! ```

pub mod error;
pub mod event;
pub mod matcher;
pub mod regex_cache;
pub mod router;

// Re-export the most commonly used types and functions at crate root
pub use error::{EvalError, Result};
pub use event::{FieldCandidate, LogEvent};
pub use matcher::filter_matches;
pub use router::{Route, Router, matches};
