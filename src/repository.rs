//! Rule set persistence.
//!
//! The engine never reaches for stored rules itself: callers load a
//! [`RuleSet`] snapshot from a [`RuleSetRepository`] and pass it in.
//! Saving validates the snapshot first and stamps `last_modified`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::RuleSet;
use crate::validation::validate_rule_set;

/// Load/save access to the last-saved rule set snapshot.
pub trait RuleSetRepository: Send + Sync {
    /// Returns the last-saved snapshot, or an empty rule set if none exists.
    fn load(&self) -> Result<RuleSet>;

    /// Validates and stores a snapshot, replacing the previous one.
    fn save(&self, rules: &RuleSet) -> Result<()>;
}

// Validates and returns the copy to persist.
fn prepare(rules: &RuleSet) -> Result<RuleSet> {
    validate_rule_set(rules).map_err(Error::InvalidRuleSet)?;
    let mut stamped = rules.clone();
    stamped.last_modified = Some(Utc::now());
    Ok(stamped)
}

/// Repository held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRuleSetRepository {
    rules: RwLock<RuleSet>,
}

impl InMemoryRuleSetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing snapshot without validating it.
    pub fn with_rules(rules: RuleSet) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }
}

impl RuleSetRepository for InMemoryRuleSetRepository {
    fn load(&self) -> Result<RuleSet> {
        Ok(self.rules.read().clone())
    }

    fn save(&self, rules: &RuleSet) -> Result<()> {
        let stamped = prepare(rules)?;
        *self.rules.write() = stamped;
        Ok(())
    }
}

/// Repository backed by a single pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRuleSetRepository {
    path: PathBuf,
}

impl JsonFileRuleSetRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RuleSetRepository for JsonFileRuleSetRepository {
    fn load(&self) -> Result<RuleSet> {
        if !self.path.exists() {
            info!(
                target: "putaway::repository",
                path = %self.path.display(),
                "No saved rule set, starting empty"
            );
            return Ok(RuleSet::new());
        }

        let text = fs::read_to_string(&self.path)?;
        let rules: RuleSet = serde_json::from_str(&text)?;
        info!(
            target: "putaway::repository",
            path = %self.path.display(),
            constraints = rules.constraints.len(),
            preferences = rules.preferences.len(),
            "Rule set loaded"
        );
        Ok(rules)
    }

    fn save(&self, rules: &RuleSet) -> Result<()> {
        let stamped = prepare(rules)?;
        let text = serde_json::to_string_pretty(&stamped)?;
        fs::write(&self.path, text)?;
        info!(
            target: "putaway::repository",
            path = %self.path.display(),
            constraints = stamped.constraints.len(),
            preferences = stamped.preferences.len(),
            "Rule set saved"
        );
        Ok(())
    }
}
