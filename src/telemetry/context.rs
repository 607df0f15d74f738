use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const TRACE_ID_KEY: &str = "x-trace-id";
pub const SPAN_ID_KEY: &str = "x-span-id";
pub const PARENT_SPAN_ID_KEY: &str = "x-parent-span-id";

/// Opaque trace carrier propagated with every call.
///
/// Entries other than the three span keys are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceContext(pub HashMap<String, String>);

impl TraceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_carrier(carrier: HashMap<String, String>) -> Self {
        Self(carrier)
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.0.get(TRACE_ID_KEY).map(String::as_str)
    }

    pub fn span_id(&self) -> Option<&str> {
        self.0.get(SPAN_ID_KEY).map(String::as_str)
    }

    /// Derives the carrier for a child span: copies every entry, keeps (or
    /// starts) the trace id, and records the current span as the parent.
    pub fn child(&self) -> Self {
        let mut carrier = self.0.clone();

        carrier
            .entry(TRACE_ID_KEY.to_string())
            .or_insert_with(|| uuid::Uuid::new_v4().to_string());

        match self.span_id() {
            Some(parent) => {
                carrier.insert(PARENT_SPAN_ID_KEY.to_string(), parent.to_string());
            }
            None => {
                carrier.remove(PARENT_SPAN_ID_KEY);
            }
        }
        carrier.insert(SPAN_ID_KEY.to_string(), uuid::Uuid::new_v4().to_string());

        Self(carrier)
    }
}

impl From<HashMap<String, String>> for TraceContext {
    fn from(carrier: HashMap<String, String>) -> Self {
        Self(carrier)
    }
}
