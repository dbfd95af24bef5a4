//! Composer - assembles the renderable content of a text block.
//!
//! Output order is fixed:
//!
//! ```text
//! [decorated text] [suffix] [expand] [edit] [copy]
//! ```
//!
//! Text decorations wrap the text span only. While editing, the edit surface
//! replaces everything.
//!
//! The same affordance atoms are handed to the measurer as decorations, so
//! their widths are reserved when computing the truncation point. The
//! expand atom is reserved whenever it could appear, even while hidden.

use crate::config::AutoSize;
use crate::controller::TruncationView;
use crate::locale::LocaleStrings;
use crate::state::interaction::InteractionState;
use crate::types::{Affordance, Attr, ControlId};

/// Default edit affordance glyph.
pub const EDIT_GLYPH: &str = "✎";
/// Default copy affordance glyph.
pub const COPY_GLYPH: &str = "⧉";
/// Default glyph shown while the copied confirmation is active.
pub const COPIED_GLYPH: &str = "✓";

// =============================================================================
// Output
// =============================================================================

/// Props consumed by the external edit surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSurfaceProps {
    pub initial_value: String,
    pub max_length: Option<usize>,
    pub auto_size: Option<AutoSize>,
}

/// One piece of composed output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    /// The (possibly truncated) text with its decorations.
    Text { text: String, attr: Attr },
    /// Custom suffix placed after the text, undecorated.
    Suffix(String),
    /// An inline control.
    Affordance {
        kind: Affordance,
        control: ControlId,
        glyph: String,
        /// Tooltip / accessible label. `None` when tooltips are off.
        label: Option<String>,
    },
    /// The edit surface, shown alone while editing.
    EditSurface(EditSurfaceProps),
}

impl Span {
    /// Inline text of an affordance atom: a leading space then the glyph.
    pub fn atom(glyph: &str) -> String {
        format!(" {glyph}")
    }

    /// Text this span occupies on screen, if it is inline content.
    pub fn inline_text(&self) -> Option<String> {
        match self {
            Span::Text { text, .. } => Some(text.clone()),
            Span::Suffix(suffix) => Some(suffix.clone()),
            Span::Affordance { glyph, .. } => Some(Span::atom(glyph)),
            Span::EditSurface(_) => None,
        }
    }
}

// =============================================================================
// Composer
// =============================================================================

/// Expand affordance settings.
#[derive(Debug, Clone)]
pub struct ExpandSlot {
    pub control: ControlId,
    pub label: String,
}

/// Edit affordance settings.
#[derive(Debug, Clone)]
pub struct EditSlot {
    pub control: ControlId,
    pub glyph: String,
    pub label: String,
    /// False when only the text activates editing.
    pub show_icon: bool,
    pub max_length: Option<usize>,
    pub auto_size: Option<AutoSize>,
}

/// Copy affordance settings.
#[derive(Debug, Clone)]
pub struct CopySlot {
    pub control: ControlId,
    pub glyph: String,
    pub copied_glyph: String,
    pub label: String,
    pub copied_label: String,
    pub tooltips: bool,
}

/// Static composition settings of one text block.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    pub attr: Attr,
    pub suffix: Option<String>,
    pub expand: Option<ExpandSlot>,
    pub edit: Option<EditSlot>,
    pub copy: Option<CopySlot>,
}

impl Composer {
    /// Fill affordance labels from `locale` where no override is given.
    pub fn with_locale(mut self, locale: &dyn LocaleStrings) -> Self {
        if let Some(expand) = &mut self.expand {
            if expand.label.is_empty() {
                expand.label = locale.expand().to_string();
            }
        }
        if let Some(edit) = &mut self.edit {
            if edit.label.is_empty() {
                edit.label = locale.edit().to_string();
            }
        }
        if let Some(copy) = &mut self.copy {
            if copy.label.is_empty() {
                copy.label = locale.copy().to_string();
            }
            if copy.copied_label.is_empty() {
                copy.copied_label = locale.copied().to_string();
            }
        }
        self
    }

    /// Trailing content to reserve room for when measuring.
    pub fn decorations(&self, state: InteractionState) -> Vec<String> {
        let mut out = Vec::with_capacity(4);
        if let Some(suffix) = &self.suffix {
            out.push(suffix.clone());
        }
        if let Some(expand) = &self.expand {
            if !state.expanded {
                out.push(Span::atom(&expand.label));
            }
        }
        if let Some(edit) = &self.edit {
            if edit.show_icon {
                out.push(Span::atom(&edit.glyph));
            }
        }
        if let Some(copy) = &self.copy {
            out.push(Span::atom(copy_glyph(copy, state.copied)));
        }
        out
    }

    /// Assemble the output for the current truncation view and state.
    ///
    /// `edit_value` seeds the edit surface.
    pub fn compose(&self, view: &TruncationView, state: InteractionState, edit_value: &str) -> Vec<Span> {
        if state.is_editing() {
            let (max_length, auto_size) = self
                .edit
                .as_ref()
                .map(|e| (e.max_length, e.auto_size))
                .unwrap_or_default();
            return vec![Span::EditSurface(EditSurfaceProps {
                initial_value: edit_value.to_string(),
                max_length,
                auto_size,
            })];
        }

        let mut spans = Vec::with_capacity(5);
        spans.push(Span::Text {
            text: view.display_text.clone(),
            attr: self.attr,
        });

        if let Some(suffix) = &self.suffix {
            spans.push(Span::Suffix(suffix.clone()));
        }

        if let Some(expand) = &self.expand {
            if !state.expanded && view.is_truncated == Some(true) {
                spans.push(Span::Affordance {
                    kind: Affordance::Expand,
                    control: expand.control,
                    glyph: expand.label.clone(),
                    label: Some(expand.label.clone()),
                });
            }
        }

        if let Some(edit) = &self.edit {
            if edit.show_icon {
                spans.push(Span::Affordance {
                    kind: Affordance::Edit,
                    control: edit.control,
                    glyph: edit.glyph.clone(),
                    label: Some(edit.label.clone()),
                });
            }
        }

        if let Some(copy) = &self.copy {
            let label = if state.copied {
                &copy.copied_label
            } else {
                &copy.label
            };
            spans.push(Span::Affordance {
                kind: Affordance::Copy,
                control: copy.control,
                glyph: copy_glyph(copy, state.copied).to_string(),
                label: copy.tooltips.then(|| label.clone()),
            });
        }

        spans
    }

    /// Which affordance, if any, `control` belongs to.
    pub fn affordance_of(&self, control: ControlId) -> Option<Affordance> {
        if self.expand.as_ref().is_some_and(|s| s.control == control) {
            Some(Affordance::Expand)
        } else if self.edit.as_ref().is_some_and(|s| s.control == control) {
            Some(Affordance::Edit)
        } else if self.copy.as_ref().is_some_and(|s| s.control == control) {
            Some(Affordance::Copy)
        } else {
            None
        }
    }
}

fn copy_glyph(copy: &CopySlot, copied: bool) -> &str {
    if copied {
        &copy.copied_glyph
    } else {
        &copy.glyph
    }
}

// =============================================================================
// Tests
// =============================================================================
