//! Operation diagnostics.
//!
//! [`Diagnostics`] is an opaque, shared trace describing how one operation was
//! executed. It is cheap to clone and is only rendered to text when formatted.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

/// One node of a diagnostics trace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticsTrace {
    name: String,
    elapsed_ms: f64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    data: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<DiagnosticsTrace>,
}

impl DiagnosticsTrace {
    /// Create a trace node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Record how long this step took.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        self
    }

    /// Attach a key/value datum.
    pub fn with_datum(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Attach a child step.
    pub fn with_child(mut self, child: DiagnosticsTrace) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f64(self.elapsed_ms / 1000.0)
    }

    pub fn datum(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn children(&self) -> &[DiagnosticsTrace] {
        &self.children
    }
}

/// Shared handle to an operation's diagnostics trace.
///
/// Formatting with `{}` renders the trace as JSON; nothing is rendered until
/// then.
#[derive(Clone, Default)]
pub struct Diagnostics {
    trace: Arc<DiagnosticsTrace>,
}

impl Diagnostics {
    /// Wrap a trace.
    pub fn new(trace: DiagnosticsTrace) -> Self {
        Self {
            trace: Arc::new(trace),
        }
    }

    /// The root of the trace.
    pub fn trace(&self) -> &DiagnosticsTrace {
        &self.trace
    }

    /// Returns true if both handles point at the same trace.
    pub fn ptr_eq(&self, other: &Diagnostics) -> bool {
        Arc::ptr_eq(&self.trace, &other.trace)
    }
}

impl From<DiagnosticsTrace> for Diagnostics {
    fn from(trace: DiagnosticsTrace) -> Self {
        Self::new(trace)
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Diagnostics").field(&self.trace.name).finish()
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = serde_json::to_string(&*self.trace).map_err(|_| std::fmt::Error)?;
        f.write_str(&rendered)
    }
}
