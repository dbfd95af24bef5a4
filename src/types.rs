//! Core types for typography blocks.
//!
//! Decoration attributes, cell sizes, truncation results and the identifiers
//! used to address interactive affordances.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use spark_signals::Signal;

// =============================================================================
// Property Values
// =============================================================================

/// A property value that can be static, a signal, or a getter.
///
/// Used for externally controlled state such as `editing`: a `Signal` or
/// `Getter` makes the component mirror the outside value.
#[derive(Clone)]
pub enum PropValue<T: Clone + PartialEq + 'static> {
    /// Static value (not reactive).
    Static(T),
    /// Reactive signal.
    Signal(Signal<T>),
    /// Getter function (called each time value is needed).
    Getter(Rc<dyn Fn() -> T>),
}

impl<T: Clone + PartialEq + 'static> PropValue<T> {
    /// Get the current value.
    pub fn get(&self) -> T {
        match self {
            PropValue::Static(v) => v.clone(),
            PropValue::Signal(s) => s.get(),
            PropValue::Getter(f) => f(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for PropValue<T> {
    fn from(value: T) -> Self {
        PropValue::Static(value)
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for PropValue<T> {
    fn from(signal: Signal<T>) -> Self {
        PropValue::Signal(signal)
    }
}

impl<T: Clone + PartialEq + std::fmt::Debug + 'static> std::fmt::Debug for PropValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropValue::Static(v) => f.debug_tuple("Static").field(v).finish(),
            PropValue::Signal(_) => f.write_str("Signal(..)"),
            PropValue::Getter(_) => f.write_str("Getter(..)"),
        }
    }
}

// =============================================================================
// Text Decorations (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text decorations applied around the (possibly truncated) text.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::CODE`.
    /// Decorations never wrap trailing affordances.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
        const STRIKETHROUGH = 1 << 3;
        const CODE = 1 << 4;
        const MARK = 1 << 5;
        const KEYBOARD = 1 << 6;
    }
}

impl Attr {
    /// Wrapping order, outermost first.
    pub const NESTING: [Attr; 7] = [
        Attr::MARK,
        Attr::CODE,
        Attr::KEYBOARD,
        Attr::UNDERLINE,
        Attr::STRIKETHROUGH,
        Attr::BOLD,
        Attr::ITALIC,
    ];

    /// Build from the boolean decoration flags of a content block.
    pub fn from_flags(flags: &DecorationFlags) -> Self {
        let mut attr = Attr::NONE;
        attr.set(Attr::BOLD, flags.bold);
        attr.set(Attr::ITALIC, flags.italic);
        attr.set(Attr::UNDERLINE, flags.underline);
        attr.set(Attr::STRIKETHROUGH, flags.strikethrough);
        attr.set(Attr::CODE, flags.code);
        attr.set(Attr::MARK, flags.highlighted);
        attr.set(Attr::KEYBOARD, flags.keyboard_style);
        attr
    }
}

/// Boolean decoration flags as they appear in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationFlags {
    pub bold: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub code: bool,
    pub highlighted: bool,
    pub keyboard_style: bool,
    pub italic: bool,
}

// =============================================================================
// Geometry
// =============================================================================

/// Size in terminal cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

// =============================================================================
// Truncation
// =============================================================================

/// Default ellipsis marker placed between a truncated prefix and the decorations.
pub const ELLIPSIS_MARKER: &str = "...";

/// Outcome of measuring a text against a line budget.
///
/// `is_truncated == false` means `display_text` is the full original text.
/// When truncated, `display_text` is the maximal fitting prefix followed by
/// the ellipsis marker, or empty when no prefix fits at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncationResult {
    pub display_text: String,
    pub is_truncated: bool,
    /// Number of grapheme clusters of the original text that are shown.
    pub visible_graphemes: usize,
}

impl TruncationResult {
    /// Result showing the whole text.
    pub fn full(text: &str) -> Self {
        use unicode_segmentation::UnicodeSegmentation;
        Self {
            display_text: text.to_string(),
            is_truncated: false,
            visible_graphemes: text.graphemes(true).count(),
        }
    }
}

/// Declarative truncation hint handed to the surface in native mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleHint {
    /// No truncation requested.
    None,
    /// Single-line overflow ellipsis.
    TextOverflow,
    /// Multi-line clamp to the given number of rows.
    LineClamp(usize),
}

// =============================================================================
// Control Identifiers
// =============================================================================

/// Identifies a focusable affordance (edit, copy, expand controls).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub u32);

thread_local! {
    static NEXT_CONTROL_ID: Cell<u32> = const { Cell::new(1) };
}

impl ControlId {
    /// Allocate a fresh identifier.
    pub fn next() -> Self {
        NEXT_CONTROL_ID.with(|next| {
            let id = next.get();
            next.set(id.wrapping_add(1).max(1));
            ControlId(id)
        })
    }
}

/// Which affordance a control represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affordance {
    Expand,
    Edit,
    Copy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_from_flags() {
        let flags = DecorationFlags {
            bold: true,
            code: true,
            ..Default::default()
        };
        assert_eq!(Attr::from_flags(&flags), Attr::BOLD | Attr::CODE);
        assert_eq!(Attr::from_flags(&DecorationFlags::default()), Attr::NONE);
    }

    #[test]
    fn test_nesting_covers_all_attrs() {
        let all = Attr::NESTING.iter().fold(Attr::NONE, |acc, a| acc | *a);
        assert_eq!(all, Attr::all());
    }

    #[test]
    fn test_control_ids_unique() {
        let a = ControlId::next();
        let b = ControlId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_prop_value_sources() {
        let sig = spark_signals::signal(false);
        let prop: PropValue<bool> = sig.clone().into();
        assert!(!prop.get());
        sig.set(true);
        assert!(prop.get());

        let getter: PropValue<i32> = PropValue::Getter(Rc::new(|| 7));
        assert_eq!(getter.get(), 7);
        assert_eq!(PropValue::from(3).get(), 3);
    }

    #[test]
    fn test_full_result() {
        let r = TruncationResult::full("héllo");
        assert!(!r.is_truncated);
        assert_eq!(r.display_text, "héllo");
        assert_eq!(r.visible_graphemes, 5);
    }
}
