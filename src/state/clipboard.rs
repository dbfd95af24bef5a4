//! Clipboard Module - where copied text goes
//!
//! The copy affordance only needs a best-effort writer. Three are provided:
//!
//! - [`BufferClipboard`] - in-process buffer (no external dependencies)
//! - [`Osc52Clipboard`] - OSC 52 escape sequence through the terminal
//! - `SystemClipboard` - the OS clipboard via `arboard`
//!   (feature `system-clipboard`)
//!
//! # Example
//!
//! ```ignore
//! use spark_typography::state::clipboard::{BufferClipboard, ClipboardWriter};
//!
//! let clipboard = BufferClipboard::new();
//! clipboard.write("Hello, World!")?;
//! assert_eq!(clipboard.paste().as_deref(), Some("Hello, World!"));
//! ```

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use crossterm::style::Print;

use crate::error::{Result, TypographyError};

/// Destination for copied text.
pub trait ClipboardWriter {
    fn write(&self, text: &str) -> Result<()>;
}

// =============================================================================
// Internal Buffer
// =============================================================================

/// In-process clipboard. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferClipboard {
    buffer: Rc<RefCell<Option<String>>>,
}

impl BufferClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently copied text.
    pub fn paste(&self) -> Option<String> {
        self.buffer.borrow().clone()
    }

    pub fn clear(&self) {
        *self.buffer.borrow_mut() = None;
    }

    pub fn has_content(&self) -> bool {
        self.buffer.borrow().is_some()
    }
}

impl ClipboardWriter for BufferClipboard {
    fn write(&self, text: &str) -> Result<()> {
        *self.buffer.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

// =============================================================================
// OSC 52
// =============================================================================

/// Writes the OSC 52 "set clipboard" sequence to a terminal.
///
/// Works over SSH and inside multiplexers that pass OSC 52 through.
pub struct Osc52Clipboard<W: Write> {
    out: RefCell<W>,
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl Osc52Clipboard<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

/// The OSC 52 sequence that sets the clipboard selection to `text`.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

impl<W: Write> ClipboardWriter for Osc52Clipboard<W> {
    fn write(&self, text: &str) -> Result<()> {
        let mut guard = self.out.borrow_mut();
        let out: &mut W = &mut guard;
        crossterm::execute!(out, Print(osc52_sequence(text))).map_err(|e| {
            TypographyError::ClipboardWriteFailed {
                reason: e.to_string(),
            }
        })
    }
}

// =============================================================================
// System Clipboard
// =============================================================================

/// OS clipboard via `arboard`.
#[cfg(feature = "system-clipboard")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[cfg(feature = "system-clipboard")]
impl ClipboardWriter for SystemClipboard {
    fn write(&self, text: &str) -> Result<()> {
        let failed = |e: arboard::Error| TypographyError::ClipboardWriteFailed {
            reason: e.to_string(),
        };
        let mut clipboard = arboard::Clipboard::new().map_err(failed)?;
        clipboard.set_text(text).map_err(failed)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_write_and_paste() {
        let clipboard = BufferClipboard::new();
        assert!(clipboard.paste().is_none());

        clipboard.write("Hello").unwrap();
        assert_eq!(clipboard.paste(), Some("Hello".to_string()));

        clipboard.write("Second").unwrap();
        assert_eq!(clipboard.paste(), Some("Second".to_string()));
    }

    #[test]
    fn test_buffer_clones_share_storage() {
        let clipboard = BufferClipboard::new();
        let other = clipboard.clone();
        other.write("shared 世界").unwrap();
        assert_eq!(clipboard.paste().as_deref(), Some("shared 世界"));

        clipboard.clear();
        assert!(!other.has_content());
    }

    #[test]
    fn test_osc52_sequence() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn test_osc52_writes_to_terminal() {
        let clipboard = Osc52Clipboard::new(Vec::new());
        clipboard.write("hi").unwrap();
        let written = String::from_utf8(clipboard.into_inner()).unwrap();
        assert_eq!(written, "\x1b]52;c;aGk=\x07");
    }
}
