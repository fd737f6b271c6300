use serde::{Deserialize, Serialize};

use crate::{DurationMs, StepId, StepStatus};

/// Construction input for one pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSpec {
    /// Unique step identifier.
    pub id: StepId,
    /// Display title.
    pub title: String,
    /// Display description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Display icon name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    /// How long the step is simulated to take.
    pub duration_ms: DurationMs,
    /// Cosmetic detail tags shown while the step runs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl StepSpec {
    pub fn new(id: impl Into<StepId>, title: impl Into<String>, duration_ms: DurationMs) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            icon: String::new(),
            duration_ms,
            details: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_details<I, S>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.details = details.into_iter().map(Into::into).collect();
        self
    }
}

/// Runtime record of a pipeline step: its spec plus the current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInfo {
    pub id: StepId,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    pub status: StepStatus,
    pub duration_ms: DurationMs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl From<StepSpec> for StepInfo {
    fn from(spec: StepSpec) -> Self {
        Self {
            id: spec.id,
            title: spec.title,
            description: spec.description,
            icon: spec.icon,
            status: StepStatus::Pending,
            duration_ms: spec.duration_ms,
            details: spec.details,
        }
    }
}
