use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Default upper bound on description length.
pub const DEFAULT_MAX_DESCRIPTION_LEN: usize = 500;

/// A saved, reusable timer template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerDefinition {
    pub id: String,
    pub project: String,
    pub task: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a [`TimerDefinition`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimer {
    pub project: String,
    pub task: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_favorite: bool,
}

impl NewTimer {
    pub fn new(project: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            task: task.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    /// Check required fields and the description length.
    ///
    /// # Errors
    /// Returns the single failure, or [`ValidationError::Invalid`] when
    /// several fields fail.
    pub fn validate(&self, max_description_len: usize) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if self.project.trim().is_empty() {
            errors.push(ValidationError::MissingField { field: "project" });
        }
        if self.task.trim().is_empty() {
            errors.push(ValidationError::MissingField { field: "task" });
        }
        let len = self.description.chars().count();
        if len > max_description_len {
            errors.push(ValidationError::TooLong {
                field: "description",
                max: max_description_len,
                len,
            });
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Invalid(errors)),
        }
    }

    /// Build the definition, assigning a fresh id and creation time.
    pub fn into_definition(self, now: DateTime<Utc>) -> TimerDefinition {
        TimerDefinition {
            id: Uuid::new_v4().to_string(),
            project: self.project,
            task: self.task,
            description: self.description,
            is_favorite: self.is_favorite,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_project_and_task_are_rejected() {
        let err = NewTimer::new("  ", "")
            .validate(DEFAULT_MAX_DESCRIPTION_LEN)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Invalid(vec![
                ValidationError::MissingField { field: "project" },
                ValidationError::MissingField { field: "task" },
            ])
        );
    }

    #[test]
    fn long_description_is_rejected() {
        let input = NewTimer::new("p", "t").description("x".repeat(11));
        assert_eq!(
            input.validate(10),
            Err(ValidationError::TooLong {
                field: "description",
                max: 10,
                len: 11
            })
        );
        assert!(input.validate(11).is_ok());
    }

    #[test]
    fn definition_gets_unique_id() {
        let now = Utc::now();
        let a = NewTimer::new("p", "t").into_definition(now);
        let b = NewTimer::new("p", "t").favorite(true).into_definition(now);
        assert_ne!(a.id, b.id);
        assert!(b.is_favorite);
        assert_eq!(a.created_at, now);
    }

    #[test]
    fn serializes_camel_case() {
        let def = NewTimer::new("p", "t").into_definition(Utc::now());
        let json = serde_json::to_value(&def).unwrap();
        assert!(json.get("isFavorite").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
