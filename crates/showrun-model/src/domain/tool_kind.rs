use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Display category of a bench tool. Purely cosmetic; the runner treats all
/// kinds the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolKind {
    Code,
    Api,
    Database,
    Integration,
}

impl ToolKind {
    /// Human-readable label for dashboards.
    pub fn label(&self) -> &'static str {
        match self {
            ToolKind::Code => "Code Execution",
            ToolKind::Api => "External API",
            ToolKind::Database => "Database",
            ToolKind::Integration => "Integration",
        }
    }
}

impl FromStr for ToolKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" => Ok(ToolKind::Code),
            "api" => Ok(ToolKind::Api),
            "database" => Ok(ToolKind::Database),
            "integration" => Ok(ToolKind::Integration),
            _ => Err(ModelError::InvalidToolKind(s.to_string())),
        }
    }
}
