//! # lql-parser
//!
//! Parser for LQL, a compact query language over structured log events.
//!
//! A query is a whitespace-separated list of terms. This crate turns the text
//! into a typed, schema-validated [`RuleSet`] of filter predicates and an
//! optional chart directive:
//!
//! - **Free text**: `user sign up`, `"exact phrase"` — regex filters on
//!   `event_message`
//! - **Field filters**: `metadata.user.id:4`, `metadata.request.url:~sources$`,
//!   `metadata.count:>=50`, `metadata.count:50..200`
//! - **Timestamps**: `timestamp:>2020-01-17T14:35:00Z`,
//!   `timestamp:2020-01-01..2020-02-01`
//! - **Negation**: a leading `-` on any term
//! - **Charts**: `chart:metadata.some.metric`
//!
//! Parsing is schema-aware: every `metadata.*` path is resolved against a
//! supplied [`Schema`] at parse time, so downstream consumers see fully typed
//! values (integers as integers, timestamps as dates/datetimes).
//!
//! ## Architecture
//!
//! - **PEG grammar** ([`pest`]) for term recognition, with explicit
//!   whitespace so values never split across spaces
//! - **Schema-driven coercion** of raw values to their resolved types
//! - **Canonical ordering** of the produced filters, so two equivalent
//!   queries yield byte-identical rule sets
//!
//! ## Quick Start
//!
//! ```rust
//! use lql_parser::{FieldType, Operator, Schema, parse};
//!
//! let schema = Schema::builder()
//!     .field("metadata.users.source_count", FieldType::Integer)
//!     .build();
//!
//! let rules = parse("error metadata.users.source_count:50..200", &schema).unwrap();
//!
//! // The range expanded into two filters; the word became a message filter.
//! assert_eq!(rules.search.len(), 3);
//! assert_eq!(rules.search[0].operator, Operator::Regex);
//! assert_eq!(rules.search[1].operator, Operator::Gte);
//! assert_eq!(rules.search[2].operator, Operator::Lte);
//! ```
//!
//! ## Schema inference
//!
//! ```rust
//! use lql_parser::{FieldType, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::from_metadata_sample(&json!({
//!     "request": {"url": "/api", "status": 200}
//! }));
//! assert_eq!(schema.resolve("metadata.request.status"), Some(&FieldType::Integer));
//! ```

pub mod ast;
pub mod error;
pub mod parser;
pub mod schema;
pub mod value;

// Re-export the most commonly used types and functions at crate root
pub use ast::{ChartRule, ChartValueType, FilterModifiers, FilterRule, Operator, RuleSet};
pub use error::{LqlParserError, Result};
pub use parser::parse;
pub use schema::{EVENT_MESSAGE, FieldType, Schema, SchemaBuilder, TIMESTAMP};
pub use value::LqlValue;
