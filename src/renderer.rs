//! Terminal renderer for composed spans.
//!
//! Writes [`Span`]s as styled terminal output using crossterm's SGR
//! commands. Text decorations are applied in [`Attr::NESTING`] order around
//! the text span and reset before the trailing content. The focused
//! affordance is drawn in reverse video.
//!
//! When the controller chose native truncation, the renderer is the surface
//! that honors the [`StyleHint`]: it clamps the wrapped text to the hinted
//! number of lines and ends the last visible line with an ellipsis.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute};

use crate::compose::Span;
use crate::layout::text_measure::{grapheme_boundaries, grapheme_width, string_width};
use crate::layout::wrap_text_word;
use crate::state::focus;
use crate::types::{Attr, StyleHint, ELLIPSIS_MARKER};

// =============================================================================
// Attributes
// =============================================================================

fn attribute_for(flag: Attr) -> Option<Attribute> {
    match flag {
        f if f == Attr::MARK => Some(Attribute::Reverse),
        f if f == Attr::CODE => Some(Attribute::Dim),
        f if f == Attr::KEYBOARD => Some(Attribute::Framed),
        f if f == Attr::UNDERLINE => Some(Attribute::Underlined),
        f if f == Attr::STRIKETHROUGH => Some(Attribute::CrossedOut),
        f if f == Attr::BOLD => Some(Attribute::Bold),
        f if f == Attr::ITALIC => Some(Attribute::Italic),
        _ => None,
    }
}

/// SGR attributes for `attr`, outermost decoration first.
pub fn attributes(attr: Attr) -> Vec<Attribute> {
    Attr::NESTING
        .iter()
        .filter(|flag| attr.contains(**flag))
        .filter_map(|flag| attribute_for(*flag))
        .collect()
}

// =============================================================================
// Native Clamp
// =============================================================================

/// Apply a native truncation hint to `text` at `width` cells.
pub fn apply_hint(text: &str, hint: StyleHint, width: usize) -> String {
    let rows = match hint {
        StyleHint::None => return text.to_string(),
        StyleHint::TextOverflow => 1,
        StyleHint::LineClamp(rows) => rows.max(1),
    };
    if width == 0 {
        return text.to_string();
    }

    let lines = wrap_text_word(text, width);
    if lines.len() <= rows {
        return lines.join("\n");
    }

    let mut kept: Vec<String> = lines.into_iter().take(rows).collect();
    if let Some(last) = kept.last_mut() {
        *last = ellipsize(last, width);
    }
    kept.join("\n")
}

/// Cut `line` so that it plus the ellipsis marker fits in `width` cells.
fn ellipsize(line: &str, width: usize) -> String {
    let budget = width.saturating_sub(string_width(ELLIPSIS_MARKER));
    let mut used = 0;
    let mut end = 0;
    let mut start = 0;
    for boundary in grapheme_boundaries(line) {
        let w = grapheme_width(&line[start..boundary]);
        if used + w > budget {
            break;
        }
        used += w;
        end = boundary;
        start = boundary;
    }
    let mut out = line[..end].trim_end().to_string();
    out.push_str(ELLIPSIS_MARKER);
    out
}

// =============================================================================
// Span Output
// =============================================================================

/// Write `spans` to `w`.
///
/// `hint` and `width` are only used for the text span under native
/// truncation.
pub fn write_spans<W: Write>(w: &mut W, spans: &[Span], hint: StyleHint, width: usize) -> io::Result<()> {
    for span in spans {
        match span {
            Span::Text { text, attr } => {
                for attribute in attributes(*attr) {
                    queue!(w, SetAttribute(attribute))?;
                }
                queue!(w, Print(apply_hint(text, hint, width)))?;
                if !attr.is_empty() {
                    queue!(w, SetAttribute(Attribute::Reset))?;
                }
            }
            Span::Suffix(suffix) => {
                queue!(w, Print(suffix))?;
            }
            Span::Affordance { control, glyph, .. } => {
                queue!(w, Print(" "))?;
                if focus::is_focused(*control) {
                    queue!(
                        w,
                        SetAttribute(Attribute::Reverse),
                        Print(glyph),
                        SetAttribute(Attribute::Reset)
                    )?;
                } else {
                    queue!(w, Print(glyph))?;
                }
            }
            Span::EditSurface(props) => {
                queue!(
                    w,
                    SetAttribute(Attribute::Underlined),
                    Print(&props.initial_value),
                    SetAttribute(Attribute::Reset)
                )?;
            }
        }
    }
    w.flush()
}

/// Inline content of `spans` without any escape sequences.
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().filter_map(Span::inline_text).collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::EditSurfaceProps;
    use crate::types::{Affordance, ControlId};

    fn render(spans: &[Span], hint: StyleHint, width: usize) -> String {
        let mut out = Vec::new();
        write_spans(&mut out, spans, hint, width).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_attributes_follow_nesting_order() {
        let attrs = attributes(Attr::ITALIC | Attr::MARK | Attr::BOLD);
        assert_eq!(attrs, vec![Attribute::Reverse, Attribute::Bold, Attribute::Italic]);
        assert!(attributes(Attr::NONE).is_empty());
    }

    #[test]
    fn test_decorations_reset_before_affordances() {
        focus::reset_focus_state();
        let spans = vec![
            Span::Text {
                text: "hi".into(),
                attr: Attr::BOLD,
            },
            Span::Affordance {
                kind: Affordance::Copy,
                control: ControlId(7),
                glyph: "⧉".into(),
                label: None,
            },
        ];
        let out = render(&spans, StyleHint::None, 0);
        assert_eq!(out, "\x1b[1mhi\x1b[0m ⧉");
    }

    #[test]
    fn test_plain_text() {
        let spans = vec![
            Span::Text {
                text: "The quick...".into(),
                attr: Attr::UNDERLINE,
            },
            Span::Suffix("!".into()),
            Span::Affordance {
                kind: Affordance::Expand,
                control: ControlId(1),
                glyph: "Expand".into(),
                label: Some("Expand".into()),
            },
        ];
        assert_eq!(plain_text(&spans), "The quick...! Expand");
    }

    #[test]
    fn test_edit_surface_has_no_inline_text() {
        let spans = vec![Span::EditSurface(EditSurfaceProps {
            initial_value: "draft".into(),
            max_length: None,
            auto_size: None,
        })];
        assert_eq!(plain_text(&spans), "");
        assert!(render(&spans, StyleHint::None, 0).contains("draft"));
    }

    #[test]
    fn test_text_overflow_hint() {
        let out = apply_hint("The quick brown fox jumps", StyleHint::TextOverflow, 12);
        assert_eq!(out, "The quick...");
    }

    #[test]
    fn test_line_clamp_hint() {
        let out = apply_hint("one two three four five six", StyleHint::LineClamp(2), 9);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with(ELLIPSIS_MARKER));
        assert!(lines.iter().all(|l| string_width(l) <= 9));
    }

    #[test]
    fn test_hint_leaves_fitting_text() {
        assert_eq!(apply_hint("short", StyleHint::TextOverflow, 12), "short");
        assert_eq!(apply_hint("short", StyleHint::None, 2), "short");
    }
}
