//! Rule set snapshot and editing operations.
//!
//! Preference priorities always form the dense sequence `1..=N` matching
//! list order. Every editing operation that adds, removes or moves a
//! preference renumbers the list to keep it that way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Constraint, Preference};
use crate::error::{Error, Result};

/// Direction for a single-step preference move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// All configured rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    /// Constraints in evaluation order.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// Preferences in priority order.
    #[serde(default)]
    pub preferences: Vec<Preference>,
    /// When the snapshot was last saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from existing lists, taken as-is.
    pub fn from_parts(constraints: Vec<Constraint>, preferences: Vec<Preference>) -> Self {
        Self {
            constraints,
            preferences,
            last_modified: None,
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Appends a preference, keeping its configured priority.
    pub fn with_preference(mut self, preference: Preference) -> Self {
        self.preferences.push(preference);
        self
    }

    pub fn constraint(&self, id: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.id == id)
    }

    pub fn preference(&self, id: &str) -> Option<&Preference> {
        self.preferences.iter().find(|p| p.id == id)
    }

    /// Whether a rule of either kind with this ID exists and is enabled.
    pub fn is_rule_enabled(&self, id: &str) -> bool {
        self.constraint(id)
            .map(|c| c.enabled)
            .or_else(|| self.preference(id).map(|p| p.enabled))
            .unwrap_or(false)
    }

    /// Adds a constraint under a freshly generated ID. Returns the ID.
    pub fn add_constraint(&mut self, mut constraint: Constraint) -> String {
        let now = Utc::now();
        constraint.id = generate_id();
        constraint.created_at = Some(now);
        constraint.updated_at = Some(now);
        let id = constraint.id.clone();
        self.constraints.push(constraint);
        id
    }

    /// Applies an edit to a constraint. The ID cannot change.
    pub fn update_constraint(&mut self, id: &str, edit: impl FnOnce(&mut Constraint)) -> Result<()> {
        let constraint = self
            .constraints
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::RuleNotFound(id.to_string()))?;
        edit(constraint);
        constraint.id = id.to_string();
        constraint.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Removes a constraint.
    pub fn delete_constraint(&mut self, id: &str) -> Result<Constraint> {
        let index = self
            .constraints
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| Error::RuleNotFound(id.to_string()))?;
        Ok(self.constraints.remove(index))
    }

    /// Appends a preference at the lowest priority under a fresh ID.
    /// Returns the ID.
    pub fn add_preference(&mut self, mut preference: Preference) -> String {
        let now = Utc::now();
        preference.id = generate_id();
        preference.priority = self.preferences.len() as u32 + 1;
        preference.created_at = Some(now);
        preference.updated_at = Some(now);
        let id = preference.id.clone();
        self.preferences.push(preference);
        id
    }

    /// Applies an edit to a preference. ID and priority cannot change;
    /// use [`reorder_preferences`](Self::reorder_preferences) to move it.
    pub fn update_preference(&mut self, id: &str, edit: impl FnOnce(&mut Preference)) -> Result<()> {
        let preference = self
            .preferences
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::RuleNotFound(id.to_string()))?;
        let priority = preference.priority;
        edit(preference);
        preference.id = id.to_string();
        preference.priority = priority;
        preference.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Removes a preference and renumbers the rest.
    pub fn delete_preference(&mut self, id: &str) -> Result<Preference> {
        let index = self
            .preferences
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::RuleNotFound(id.to_string()))?;
        let removed = self.preferences.remove(index);
        self.renumber_preferences();
        Ok(removed)
    }

    /// Moves the preference at `from` to position `to` and renumbers.
    pub fn reorder_preferences(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.preferences.len();
        for index in [from, to] {
            if index >= len {
                return Err(Error::IndexOutOfRange { index, len });
            }
        }
        let moved = self.preferences.remove(from);
        self.preferences.insert(to, moved);
        self.renumber_preferences();
        Ok(())
    }

    /// Moves a preference one step. Moving past either end is a no-op.
    pub fn move_preference(&mut self, index: usize, direction: MoveDirection) -> Result<()> {
        let len = self.preferences.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        match direction {
            MoveDirection::Up if index == 0 => Ok(()),
            MoveDirection::Down if index + 1 == len => Ok(()),
            MoveDirection::Up => self.reorder_preferences(index, index - 1),
            MoveDirection::Down => self.reorder_preferences(index, index + 1),
        }
    }

    /// Rewrites priorities to `1..=N` in list order.
    pub fn renumber_preferences(&mut self) {
        for (index, preference) in self.preferences.iter_mut().enumerate() {
            preference.priority = index as u32 + 1;
        }
    }

    /// Whether priorities are exactly `1..=N` in list order.
    pub fn has_dense_priorities(&self) -> bool {
        self.preferences
            .iter()
            .enumerate()
            .all(|(i, p)| p.priority == i as u32 + 1)
    }
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleAction;

    fn sample() -> RuleSet {
        let mut rules = RuleSet::new();
        for name in ["Cart Consolidation", "FEFO Placement", "Fast Mover", "Fallback"] {
            rules.add_preference(Preference::new("", name, 0));
        }
        rules
    }

    fn names(rules: &RuleSet) -> Vec<&str> {
        rules.preferences.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_add_preference_assigns_next_priority() {
        let rules = sample();
        assert!(rules.has_dense_priorities());
        assert_eq!(rules.preferences[3].priority, 4);
        assert!(!rules.preferences[0].id.is_empty());
        assert_ne!(rules.preferences[0].id, rules.preferences[1].id);
    }

    #[test]
    fn test_delete_renumbers() {
        let mut rules = sample();
        let id = rules.preferences[1].id.clone();
        let removed = rules.delete_preference(&id).unwrap();
        assert_eq!(removed.name, "FEFO Placement");
        assert_eq!(names(&rules), vec!["Cart Consolidation", "Fast Mover", "Fallback"]);
        assert!(rules.has_dense_priorities());
    }

    #[test]
    fn test_reorder_renumbers() {
        let mut rules = sample();
        rules.reorder_preferences(3, 0).unwrap();
        assert_eq!(
            names(&rules),
            vec!["Fallback", "Cart Consolidation", "FEFO Placement", "Fast Mover"]
        );
        assert!(rules.has_dense_priorities());
    }

    #[test]
    fn test_reorder_out_of_range() {
        let mut rules = sample();
        assert!(matches!(
            rules.reorder_preferences(0, 9),
            Err(Error::IndexOutOfRange { index: 9, len: 4 })
        ));
    }

    #[test]
    fn test_move_at_edges_is_noop() {
        let mut rules = sample();
        let before = names(&rules).join(",");
        rules.move_preference(0, MoveDirection::Up).unwrap();
        rules.move_preference(3, MoveDirection::Down).unwrap();
        assert_eq!(names(&rules).join(","), before);

        rules.move_preference(1, MoveDirection::Down).unwrap();
        assert_eq!(rules.preferences[2].name, "FEFO Placement");
        assert_eq!(rules.preferences[2].priority, 3);
    }

    #[test]
    fn test_update_preference_keeps_priority() {
        let mut rules = sample();
        let id = rules.preferences[2].id.clone();
        rules
            .update_preference(&id, |p| {
                p.name = "Fast Mover Golden Zone".into();
                p.priority = 99;
            })
            .unwrap();
        let p = rules.preference(&id).unwrap();
        assert_eq!(p.name, "Fast Mover Golden Zone");
        assert_eq!(p.priority, 3);
    }

    #[test]
    fn test_constraint_crud() {
        let mut rules = RuleSet::new();
        let id = rules.add_constraint(Constraint::limit_to("", "Hazmat Isolation"));
        assert!(rules.constraint(&id).is_some());
        assert!(rules.is_rule_enabled(&id));

        rules
            .update_constraint(&id, |c| {
                c.enabled = false;
                c.action = RuleAction::Exclude;
            })
            .unwrap();
        assert!(!rules.is_rule_enabled(&id));
        assert_eq!(rules.constraint(&id).unwrap().action, RuleAction::Exclude);

        rules.delete_constraint(&id).unwrap();
        assert!(matches!(
            rules.delete_constraint(&id),
            Err(Error::RuleNotFound(_))
        ));
    }
}
