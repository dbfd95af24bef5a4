//! Locale strings for affordance labels.

use serde::{Deserialize, Serialize};

/// Read-only lookup of affordance labels.
pub trait LocaleStrings {
    fn expand(&self) -> &str;
    fn edit(&self) -> &str;
    fn copy(&self) -> &str;
    fn copied(&self) -> &str;
}

/// A plain table of labels. Defaults to English.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleTable {
    pub expand: String,
    pub edit: String,
    pub copy: String,
    pub copied: String,
}

impl Default for LocaleTable {
    fn default() -> Self {
        Self {
            expand: "Expand".into(),
            edit: "Edit".into(),
            copy: "Copy".into(),
            copied: "Copied".into(),
        }
    }
}

impl LocaleStrings for LocaleTable {
    fn expand(&self) -> &str {
        &self.expand
    }

    fn edit(&self) -> &str {
        &self.edit
    }

    fn copy(&self) -> &str {
        &self.copy
    }

    fn copied(&self) -> &str {
        &self.copied
    }
}
