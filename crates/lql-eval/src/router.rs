//! Rule-set matching and source-to-source route dispatch.
//!
//! [`matches`] is the core contract: one event against one rule set. The
//! [`Router`] holds a set of `(sink, rule set)` routes and answers which
//! sinks an incoming event should be forwarded to; forwarding itself is the
//! caller's concern.

use regex::Regex;
use tracing::{debug, trace};

use lql_parser::{LqlValue, Operator, RuleSet};

use crate::error::Result;
use crate::event::LogEvent;
use crate::matcher::filter_matches;

/// Test an event against a rule set.
///
/// Filters conjoin: every filter must hold. An empty filter list matches
/// every event. Chart directives play no part in matching.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use lql_eval::{LogEvent, matches};
/// use lql_parser::{Schema, parse};
/// use serde_json::json;
///
/// let schema = Schema::from_metadata_sample(&json!({"request": {"url": "/api"}}));
/// let rules = parse("\"count: \\d\\d\\d\" m.request.url:~\"sources$\"", &schema).unwrap();
///
/// let event = LogEvent::new("info count: 113", Utc::now())
///     .with_metadata(json!({"request": {"url": "/api/user/4/sources"}}));
/// assert!(matches(&event, &rules));
/// ```
pub fn matches(event: &LogEvent, rules: &RuleSet) -> bool {
    rules.search.iter().all(|f| filter_matches(event, f))
}

/// One registered route: events matching `rules` go to `sink`.
#[derive(Debug, Clone)]
pub struct Route {
    pub sink: String,
    pub rules: RuleSet,
}

/// Registry of routing rules for one ingest pipeline.
///
/// Routes are checked independently; an event may match any number of sinks.
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Create a new empty router.
    pub fn new() -> Self {
        Router { routes: Vec::new() }
    }

    /// Register a route.
    ///
    /// Regex filters are re-validated here: rule sets straight from the
    /// parser are always valid, but rule sets loaded from external storage
    /// may not be.
    pub fn add_route(&mut self, sink: impl Into<String>, rules: RuleSet) -> Result<()> {
        for f in &rules.search {
            if f.operator == Operator::Regex
                && let LqlValue::String(pattern) = &f.value
            {
                Regex::new(pattern)?;
            }
        }
        let sink = sink.into();
        debug!(sink = %sink, filters = rules.search.len(), "route registered");
        self.routes.push(Route { sink, rules });
        Ok(())
    }

    /// The sinks whose rule sets match this event, in registration order.
    pub fn route(&self, event: &LogEvent) -> Vec<&str> {
        let sinks: Vec<&str> = self
            .routes
            .iter()
            .filter(|r| matches(event, &r.rules))
            .map(|r| r.sink.as_str())
            .collect();
        trace!(matched = sinks.len(), "event routed");
        sinks
    }

    /// Number of registered routes.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Access the registered routes.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
