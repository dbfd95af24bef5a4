//! Configuration - boolean-or-object toggles.
//!
//! `editable`, `copyable` and `ellipsis` each accept either a flag or an
//! options object:
//!
//! ```toml
//! ellipsis = true
//! # or
//! [ellipsis]
//! rows = 2
//! expandable = true
//! ```
//!
//! [`resolve`] turns that into an `(enabled, options)` pair, filling unset
//! options from defaults. Options present in the object override defaults
//! field by field; the input value itself is never mutated.
//!
//! Callbacks live on the option structs but are skipped by serde.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::TypographyError;
use crate::types::PropValue;

// =============================================================================
// Callback Types
// =============================================================================

/// Side-effect callback with no arguments (`on_copy`, `on_start`, ...).
pub type Callback = Rc<dyn Fn()>;

/// Truncation state change callback.
pub type EllipsisCallback = Rc<dyn Fn(bool)>;

/// Edited value callback.
pub type ChangeCallback = Rc<dyn Fn(&str)>;

// =============================================================================
// Toggle + Merge
// =============================================================================

/// A boolean-or-object configuration value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toggle<T> {
    Flag(bool),
    Options(T),
}

impl<T> From<bool> for Toggle<T> {
    fn from(flag: bool) -> Self {
        Toggle::Flag(flag)
    }
}

/// Field-wise override: fields set on `self` win, unset fields come from
/// `defaults`.
pub trait Merge {
    fn merge(&self, defaults: &Self) -> Self;
}

/// Normalize a toggle into `(enabled, options)`.
///
/// - absent or `false` → `(false, defaults)`
/// - `true` → `(true, defaults)`
/// - options object → `(true, options merged over defaults)`
pub fn resolve<T: Merge + Clone>(value: Option<&Toggle<T>>, defaults: &T) -> (bool, T) {
    match value {
        None | Some(Toggle::Flag(false)) => (false, defaults.clone()),
        Some(Toggle::Flag(true)) => (true, defaults.clone()),
        Some(Toggle::Options(options)) => (true, options.merge(defaults)),
    }
}

// =============================================================================
// Ellipsis
// =============================================================================

/// Ellipsis options.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipsisConfig {
    /// Line budget. Defaults to 1; non-positive values clamp to 1.
    pub rows: Option<i64>,
    /// Show an expand affordance when truncated.
    pub expandable: Option<bool>,
    /// Text placed after the (possibly truncated) text, before affordances.
    pub suffix: Option<String>,
    /// Label of the expand affordance, overriding the locale string.
    pub symbol: Option<String>,
    #[serde(skip)]
    pub on_ellipsis: Option<EllipsisCallback>,
    #[serde(skip)]
    pub on_expand: Option<Callback>,
}

impl EllipsisConfig {
    /// Line budget, clamped to at least 1.
    pub fn line_budget(&self) -> usize {
        self.rows.map_or(1, clamp_rows)
    }

    pub fn is_expandable(&self) -> bool {
        self.expandable.unwrap_or(false)
    }
}

/// Clamp a configured line budget to at least 1, logging out-of-range values.
pub fn clamp_rows(rows: i64) -> usize {
    if rows >= 1 {
        return usize::try_from(rows).unwrap_or(usize::MAX);
    }
    let err = TypographyError::InvalidConfig {
        field: "ellipsis.rows",
        value: rows,
    };
    warn!(%err, "clamping line budget");
    1
}

impl Merge for EllipsisConfig {
    fn merge(&self, defaults: &Self) -> Self {
        Self {
            rows: self.rows.or(defaults.rows),
            expandable: self.expandable.or(defaults.expandable),
            suffix: self.suffix.clone().or_else(|| defaults.suffix.clone()),
            symbol: self.symbol.clone().or_else(|| defaults.symbol.clone()),
            on_ellipsis: self.on_ellipsis.clone().or_else(|| defaults.on_ellipsis.clone()),
            on_expand: self.on_expand.clone().or_else(|| defaults.on_expand.clone()),
        }
    }
}

impl fmt::Debug for EllipsisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EllipsisConfig")
            .field("rows", &self.rows)
            .field("expandable", &self.expandable)
            .field("suffix", &self.suffix)
            .field("symbol", &self.symbol)
            .field("on_ellipsis", &self.on_ellipsis.is_some())
            .field("on_expand", &self.on_expand.is_some())
            .finish()
    }
}

// =============================================================================
// Copy
// =============================================================================

/// Copy options.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyConfig {
    /// Text to copy. Defaults to the displayed string content.
    pub text: Option<String>,
    /// Glyph of the copy affordance.
    pub icon: Option<String>,
    /// Glyph shown while the copied confirmation is active.
    pub copied_icon: Option<String>,
    /// Show labels (tooltips) on the affordance. Defaults to true.
    pub tooltips: Option<bool>,
    #[serde(skip)]
    pub on_copy: Option<Callback>,
}

impl Merge for CopyConfig {
    fn merge(&self, defaults: &Self) -> Self {
        Self {
            text: self.text.clone().or_else(|| defaults.text.clone()),
            icon: self.icon.clone().or_else(|| defaults.icon.clone()),
            copied_icon: self.copied_icon.clone().or_else(|| defaults.copied_icon.clone()),
            tooltips: self.tooltips.or(defaults.tooltips),
            on_copy: self.on_copy.clone().or_else(|| defaults.on_copy.clone()),
        }
    }
}

impl fmt::Debug for CopyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyConfig")
            .field("text", &self.text)
            .field("icon", &self.icon)
            .field("copied_icon", &self.copied_icon)
            .field("tooltips", &self.tooltips)
            .field("on_copy", &self.on_copy.is_some())
            .finish()
    }
}

// =============================================================================
// Edit
// =============================================================================

/// What activates editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditTrigger {
    /// The edit affordance only.
    #[default]
    Icon,
    /// The text itself only; no edit affordance is rendered.
    Text,
    /// Either.
    Both,
}

impl EditTrigger {
    pub fn shows_icon(self) -> bool {
        matches!(self, EditTrigger::Icon | EditTrigger::Both)
    }

    pub fn text_activates(self) -> bool {
        matches!(self, EditTrigger::Text | EditTrigger::Both)
    }
}

/// Auto-size bounds forwarded to the edit surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSize {
    pub min_rows: Option<usize>,
    pub max_rows: Option<usize>,
}

/// Edit options.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Controlled editing state. When set, internal transitions are ignored
    /// and the component mirrors this value.
    #[serde(deserialize_with = "static_prop", skip_serializing)]
    pub editing: Option<PropValue<bool>>,
    /// Initial value of the edit surface. Defaults to the string content.
    pub text: Option<String>,
    pub max_length: Option<usize>,
    pub auto_size: Option<AutoSize>,
    pub trigger: Option<EditTrigger>,
    /// Glyph of the edit affordance.
    pub icon: Option<String>,
    /// Label of the edit affordance, overriding the locale string.
    pub tooltip: Option<String>,
    #[serde(skip)]
    pub on_start: Option<Callback>,
    #[serde(skip)]
    pub on_change: Option<ChangeCallback>,
    #[serde(skip)]
    pub on_cancel: Option<Callback>,
    #[serde(skip)]
    pub on_end: Option<Callback>,
}

fn static_prop<'de, D>(deserializer: D) -> Result<Option<PropValue<bool>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.map(PropValue::Static))
}

impl EditConfig {
    pub fn trigger(&self) -> EditTrigger {
        self.trigger.unwrap_or_default()
    }
}

impl Merge for EditConfig {
    fn merge(&self, defaults: &Self) -> Self {
        Self {
            editing: self.editing.clone().or_else(|| defaults.editing.clone()),
            text: self.text.clone().or_else(|| defaults.text.clone()),
            max_length: self.max_length.or(defaults.max_length),
            auto_size: self.auto_size.or(defaults.auto_size),
            trigger: self.trigger.or(defaults.trigger),
            icon: self.icon.clone().or_else(|| defaults.icon.clone()),
            tooltip: self.tooltip.clone().or_else(|| defaults.tooltip.clone()),
            on_start: self.on_start.clone().or_else(|| defaults.on_start.clone()),
            on_change: self.on_change.clone().or_else(|| defaults.on_change.clone()),
            on_cancel: self.on_cancel.clone().or_else(|| defaults.on_cancel.clone()),
            on_end: self.on_end.clone().or_else(|| defaults.on_end.clone()),
        }
    }
}

impl fmt::Debug for EditConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditConfig")
            .field("editing", &self.editing)
            .field("text", &self.text)
            .field("max_length", &self.max_length)
            .field("auto_size", &self.auto_size)
            .field("trigger", &self.trigger)
            .field("icon", &self.icon)
            .field("tooltip", &self.tooltip)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> EllipsisConfig {
        EllipsisConfig {
            rows: Some(1),
            expandable: Some(false),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_absent_and_false() {
        let (enabled, options) = resolve::<EllipsisConfig>(None, &defaults());
        assert!(!enabled);
        assert_eq!(options.rows, Some(1));

        let (enabled, _) = resolve(Some(&Toggle::Flag(false)), &defaults());
        assert!(!enabled);
    }

    #[test]
    fn test_resolve_true_uses_defaults() {
        let (enabled, options) = resolve(Some(&Toggle::Flag(true)), &defaults());
        assert!(enabled);
        assert_eq!(options.rows, Some(1));
        assert_eq!(options.expandable, Some(false));
    }

    #[test]
    fn test_resolve_object_overrides_fieldwise() {
        let value = Toggle::Options(EllipsisConfig {
            rows: Some(3),
            suffix: Some("--".into()),
            ..Default::default()
        });
        let (enabled, options) = resolve(Some(&value), &defaults());
        assert!(enabled);
        assert_eq!(options.rows, Some(3));
        assert_eq!(options.expandable, Some(false));
        assert_eq!(options.suffix.as_deref(), Some("--"));

        // Input untouched
        if let Toggle::Options(original) = &value {
            assert_eq!(original.expandable, None);
        }
    }

    #[test]
    fn test_line_budget_clamps() {
        let mut config = EllipsisConfig::default();
        assert_eq!(config.line_budget(), 1);
        config.rows = Some(0);
        assert_eq!(config.line_budget(), 1);
        config.rows = Some(-4);
        assert_eq!(config.line_budget(), 1);
        config.rows = Some(3);
        assert_eq!(config.line_budget(), 3);
        assert_eq!(clamp_rows(i64::MIN), 1);
    }

    #[test]
    fn test_deserialize_flag_or_object() {
        let flag: Toggle<EllipsisConfig> = serde_json::from_str("true").unwrap();
        assert!(matches!(flag, Toggle::Flag(true)));

        let object: Toggle<EllipsisConfig> =
            serde_json::from_str(r#"{"rows": 2, "expandable": true}"#).unwrap();
        let (enabled, options) = resolve(Some(&object), &EllipsisConfig::default());
        assert!(enabled);
        assert_eq!(options.line_budget(), 2);
        assert!(options.is_expandable());
    }

    #[test]
    fn test_deserialize_edit_config() {
        let config: EditConfig =
            serde_json::from_str(r#"{"editing": true, "max_length": 10, "trigger": "both"}"#)
                .unwrap();
        assert_eq!(config.editing.as_ref().map(|e| e.get()), Some(true));
        assert_eq!(config.max_length, Some(10));
        assert_eq!(config.trigger(), EditTrigger::Both);
        assert!(config.trigger().shows_icon());
        assert!(config.trigger().text_activates());
    }
}
