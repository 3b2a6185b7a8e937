//! Declared workflow steps.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One step as declared in a workflow definition.
///
/// Every field is optional; identifier derivation decides which one to use.
/// `with` and `env` keep their declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<IndexMap<String, String>>,
}

impl StepSpec {
    /// A shell step.
    pub fn run(script: impl Into<String>) -> Self {
        Self {
            run: Some(script.into()),
            ..Default::default()
        }
    }

    /// An action step.
    pub fn uses(reference: impl Into<String>) -> Self {
        Self {
            uses: Some(reference.into()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add one `with` input.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Add one `env` variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), value.into());
        self
    }
}
