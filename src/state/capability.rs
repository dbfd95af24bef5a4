//! Style Capability Probe - cached native truncation support
//!
//! Detects once whether the host surface can truncate natively:
//! - multi-line clamp (`LineClamp`)
//! - single-line overflow ellipsis (`TextOverflow`)
//!
//! Each property is probed at most once per thread and the answer is kept
//! for the rest of the thread's life. UI state in this crate is
//! single-threaded, so this is the process-wide cache for a UI thread.
//! Surfaces without a style engine answer `false`.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::debug;

use crate::surface::{RenderSurface, StyleProperty};

thread_local! {
    static CAPABILITY_CACHE: RefCell<HashMap<StyleProperty, bool>> = RefCell::new(HashMap::new());
}

/// Native truncation capabilities of the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilityFlags {
    pub line_clamp_supported: bool,
    pub text_overflow_supported: bool,
}

impl CapabilityFlags {
    /// Whether native truncation can handle `rows` lines.
    pub fn supports_rows(&self, rows: usize) -> bool {
        if rows == 1 {
            self.text_overflow_supported
        } else {
            self.line_clamp_supported
        }
    }
}

/// Whether `surface` supports `property`, memoized per property.
pub fn supports(surface: &dyn RenderSurface, property: StyleProperty) -> bool {
    if let Some(cached) = CAPABILITY_CACHE.with(|cache| cache.borrow().get(&property).copied()) {
        return cached;
    }

    let supported = surface.probe_style(property).unwrap_or(false);
    debug!(?property, supported, "probed native style support");

    CAPABILITY_CACHE.with(|cache| {
        *cache.borrow_mut().entry(property).or_insert(supported)
    })
}

/// Probe (or read cached) flags for both truncation properties.
pub fn capability_flags(surface: &dyn RenderSurface) -> CapabilityFlags {
    CapabilityFlags {
        line_clamp_supported: supports(surface, StyleProperty::LineClamp),
        text_overflow_supported: supports(surface, StyleProperty::TextOverflow),
    }
}

/// Clear the cache (for testing).
pub fn reset_capability_cache() {
    CAPABILITY_CACHE.with(|cache| cache.borrow_mut().clear());
}
