//! Execution trace: the ordered, structured log of one putaway decision.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Funnel stage that produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Phase {
    /// Initialization and FULL/locked filtering.
    Setup,
    /// Hard constraints.
    Constraints,
    /// Preferences.
    Preferences,
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Setup => 0,
            Phase::Constraints => 1,
            Phase::Preferences => 2,
        }
    }
}

impl TryFrom<u8> for Phase {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Phase::Setup),
            1 => Ok(Phase::Constraints),
            2 => Ok(Phase::Preferences),
            other => Err(format!("unknown phase {other}")),
        }
    }
}

/// Entry classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Info,
    Filter,
    Attempt,
    Success,
    Fail,
    Skip,
}

/// One trace entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEntry {
    pub phase: Phase,
    #[serde(rename = "type")]
    pub kind: TraceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    pub message: String,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl TraceEntry {
    /// Creates an entry without rule attribution.
    pub fn new(phase: Phase, kind: TraceKind, message: impl Into<String>) -> Self {
        Self {
            phase,
            kind,
            rule_id: None,
            rule_name: None,
            priority: None,
            message: message.into(),
            details: Map::new(),
        }
    }

    /// Attributes the entry to a rule.
    pub fn for_rule(mut self, id: &str, name: &str) -> Self {
        self.rule_id = Some(id.to_string());
        self.rule_name = Some(name.to_string());
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Adds a structured detail.
    pub fn detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Ordered list of trace entries for one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionTrace {
    entries: Vec<TraceEntry>,
}

impl ExecutionTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one phase, in order.
    pub fn in_phase(&self, phase: Phase) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter().filter(move |e| e.phase == phase)
    }

    /// Entries attributed to a rule, in order.
    pub fn for_rule<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a TraceEntry> {
        self.entries
            .iter()
            .filter(move |e| e.rule_id.as_deref() == Some(rule_id))
    }

    /// Last entry, if any.
    pub fn last(&self) -> Option<&TraceEntry> {
        self.entries.last()
    }
}

impl<'a> IntoIterator for &'a ExecutionTrace {
    type Item = &'a TraceEntry;
    type IntoIter = std::slice::Iter<'a, TraceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
