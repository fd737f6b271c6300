use serde::{Deserialize, Serialize};

use crate::{ToolId, ToolKind, ToolStatus};

/// Construction input for one bench tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    /// Unique tool identifier.
    pub id: ToolId,
    /// Display name.
    pub name: String,
    /// Display category.
    pub kind: ToolKind,
    /// Display icon name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
}

impl ToolSpec {
    pub fn new(id: impl Into<ToolId>, name: impl Into<String>, kind: ToolKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            icon: String::new(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }
}

/// Runtime record of a bench tool.
///
/// `progress` and `elapsed_ms` only grow while the tool is running; `output`
/// is assigned in the same mutation that completes the tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInfo {
    pub id: ToolId,
    pub name: String,
    pub kind: ToolKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    pub status: ToolStatus,
    /// Completion percentage in `[0, 100]`.
    pub progress: f64,
    /// Accumulated simulated duration.
    pub elapsed_ms: u64,
    /// Simulated result line, present once the tool completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl From<ToolSpec> for ToolInfo {
    fn from(spec: ToolSpec) -> Self {
        Self {
            id: spec.id,
            name: spec.name,
            kind: spec.kind,
            icon: spec.icon,
            status: ToolStatus::Idle,
            progress: 0.0,
            elapsed_ms: 0,
            output: None,
        }
    }
}
