//! Focus System - which affordance holds keyboard focus
//!
//! The focused control lives in a signal so a host render effect re-runs
//! when focus moves.
//!
//! Leaving edit mode hands focus back to the control that opened it: the
//! edit affordance, or the block itself when the text opened it.
//!
//! # Example
//!
//! ```ignore
//! use spark_typography::state::focus;
//!
//! focus::focus(control);
//! assert!(focus::is_focused(control));
//! ```

use spark_signals::{signal, Signal};

use crate::types::ControlId;

// =============================================================================
// FOCUSED CONTROL SIGNAL
// =============================================================================

thread_local! {
    /// 0 means nothing is focused (ids start at 1).
    static FOCUSED: Signal<u32> = signal(0);
}

/// Currently focused control.
pub fn get_focused() -> Option<ControlId> {
    match FOCUSED.with(|s| s.get()) {
        0 => None,
        id => Some(ControlId(id)),
    }
}

/// Check if a specific control is focused.
pub fn is_focused(control: ControlId) -> bool {
    get_focused() == Some(control)
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Move focus to `control`.
pub fn focus(control: ControlId) {
    FOCUSED.with(|s| s.set(control.0));
}

/// Clear focus.
pub fn blur() {
    FOCUSED.with(|s| s.set(0));
}

/// Reset all focus state (for testing).
pub fn reset_focus_state() {
    blur();
}
