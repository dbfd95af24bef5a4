//! Truncation Controller - native clamp or measured ellipsis
//!
//! ```text
//!            enabled && native-eligible
//! Disabled ────────────────────────────► NativeStyle
//!    │
//!    │ enabled, otherwise
//!    ▼
//! Measuring ──(next frame: Measurer)──► Measured
//!    ▲                                      │
//!    └── text / rows / decorations / width ─┘
//! ```
//!
//! Any input change cancels the pending frame request and schedules a new
//! one, so a burst of resizes costs one measurement. `on_ellipsis` fires only
//! when `is_truncated` differs from the last reported value (initially
//! false). In native mode the surface truncates and nothing is reported.
//!
//! If the surface cannot measure, the controller shows the full text.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::config::{EllipsisCallback, EllipsisConfig};
use crate::measure::Measurer;
use crate::scheduler::{FrameHandle, Scheduler};
use crate::state::capability::{capability_flags, CapabilityFlags};
use crate::surface::{ResizeNotifier, Unsubscribe};
use crate::types::{ControlId, StyleHint, TruncationResult};

// =============================================================================
// Strategy Predicates
// =============================================================================

/// Truncation strategy / lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Truncation off (not configured, editing, or expanded).
    Disabled,
    /// The surface clamps natively; no measurement.
    NativeStyle,
    /// A measurement is pending.
    Measuring,
    /// A measurement result is cached.
    Measured,
}

/// Features that need the measured path because they put content after
/// the text or observe truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeBlockers {
    pub has_suffix: bool,
    pub has_on_ellipsis: bool,
    pub expandable: bool,
    pub editable: bool,
    pub copyable: bool,
}

impl NativeBlockers {
    pub fn from_config(ellipsis: &EllipsisConfig, editable: bool, copyable: bool) -> Self {
        Self {
            has_suffix: ellipsis.suffix.is_some(),
            has_on_ellipsis: ellipsis.on_ellipsis.is_some(),
            expandable: ellipsis.is_expandable(),
            editable,
            copyable,
        }
    }

    pub fn any(&self) -> bool {
        self.has_suffix || self.has_on_ellipsis || self.expandable || self.editable || self.copyable
    }
}

/// Whether native truncation can be used for `rows` lines.
pub fn can_use_native(blockers: &NativeBlockers, rows: usize, flags: &CapabilityFlags) -> bool {
    !blockers.any() && flags.supports_rows(rows)
}

/// Style hint for native truncation of `rows` lines.
pub fn native_hint(rows: usize) -> StyleHint {
    if rows == 1 {
        StyleHint::TextOverflow
    } else {
        StyleHint::LineClamp(rows)
    }
}

// =============================================================================
// Controller
// =============================================================================

/// What to display right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncationView {
    pub display_text: String,
    /// `None` when not observable (native mode, or before the first measurement).
    pub is_truncated: Option<bool>,
    pub hint: StyleHint,
}

struct Inner {
    enabled: bool,
    bypassed: bool,
    native: bool,
    blockers: NativeBlockers,
    flags: CapabilityFlags,
    measurer: Measurer,
    scheduler: Rc<dyn Scheduler>,
    text: String,
    rows: usize,
    decorations: Vec<String>,
    width: Option<usize>,
    result: Option<TruncationResult>,
    last_reported: bool,
    on_ellipsis: Option<EllipsisCallback>,
    pending: Option<FrameHandle>,
    unsubscribe: Option<Unsubscribe>,
    measurements: usize,
}

/// Owns the truncation decision and the cached measurement.
pub struct TruncationController {
    inner: Rc<RefCell<Inner>>,
}

impl TruncationController {
    /// Create a controller for `text`.
    ///
    /// `enabled` and `ellipsis` are the resolved ellipsis toggle. The
    /// capability flags are probed from the measurer's surface.
    pub fn new(
        measurer: Measurer,
        scheduler: Rc<dyn Scheduler>,
        enabled: bool,
        ellipsis: &EllipsisConfig,
        blockers: NativeBlockers,
        text: &str,
    ) -> Self {
        let flags = capability_flags(measurer.surface());
        let rows = ellipsis.line_budget();
        let native = can_use_native(&blockers, rows, &flags);
        debug!(enabled, native, rows, ?flags, "truncation strategy");

        Self {
            inner: Rc::new(RefCell::new(Inner {
                enabled,
                bypassed: false,
                native,
                blockers,
                flags,
                measurer,
                scheduler,
                text: text.to_string(),
                rows,
                decorations: Vec::new(),
                width: None,
                result: None,
                last_reported: false,
                on_ellipsis: ellipsis.on_ellipsis.clone(),
                pending: None,
                unsubscribe: None,
                measurements: 0,
            })),
        }
    }

    // -------------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------------

    pub fn set_text(&self, text: &str) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let changed = inner.text != text;
            if changed {
                inner.text = text.to_string();
                inner.result = None;
            }
            changed
        };
        if changed {
            self.schedule();
        }
    }

    pub fn set_rows(&self, rows: usize) {
        let rows = rows.max(1);
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let changed = inner.rows != rows;
            if changed {
                inner.rows = rows;
                inner.native = can_use_native(&inner.blockers, rows, &inner.flags);
            }
            changed
        };
        if changed {
            self.schedule();
        }
    }

    /// Trailing decorations, in display order. Re-measures when they change
    /// (icon swaps, affordances appearing or disappearing).
    pub fn set_decorations(&self, decorations: Vec<String>) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let changed = inner.decorations != decorations;
            if changed {
                inner.decorations = decorations;
            }
            changed
        };
        if changed {
            self.schedule();
        }
    }

    /// Container width in cells.
    pub fn set_width(&self, width: usize) {
        Self::set_width_on(&self.inner, width);
    }

    fn set_width_on(inner: &Rc<RefCell<Inner>>, width: usize) {
        let changed = {
            let mut state = inner.borrow_mut();
            let changed = state.width != Some(width);
            state.width = Some(width);
            changed
        };
        if changed {
            Self::schedule_on(inner);
        }
    }

    /// Turn truncation off while editing or expanded; re-measures when
    /// turned back on.
    pub fn set_bypassed(&self, bypassed: bool) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let changed = inner.bypassed != bypassed;
            inner.bypassed = bypassed;
            changed
        };
        if !changed {
            return;
        }
        if bypassed {
            self.cancel_pending();
        } else {
            self.schedule();
        }
    }

    /// Follow container resizes for `target`.
    pub fn attach(&self, notifier: &dyn ResizeNotifier, target: ControlId) {
        let weak: Weak<RefCell<Inner>> = Rc::downgrade(&self.inner);
        let unsubscribe = notifier.subscribe(
            target,
            Rc::new(move |size| {
                if let Some(inner) = weak.upgrade() {
                    Self::set_width_on(&inner, size.width);
                }
            }),
        );
        let previous = self.inner.borrow_mut().unsubscribe.replace(unsubscribe);
        if let Some(previous) = previous {
            previous();
        }
    }

    // -------------------------------------------------------------------------
    // Scheduling
    // -------------------------------------------------------------------------

    fn schedule(&self) {
        Self::schedule_on(&self.inner);
    }

    fn schedule_on(inner: &Rc<RefCell<Inner>>) {
        let (scheduler, eligible, previous) = {
            let mut state = inner.borrow_mut();
            let eligible =
                state.enabled && !state.bypassed && !state.native && state.width.is_some();
            (state.scheduler.clone(), eligible, state.pending.take())
        };

        if let Some(previous) = previous {
            scheduler.cancel_frame(previous);
        }
        if !eligible {
            return;
        }

        let weak = Rc::downgrade(inner);
        let handle = scheduler.request_frame(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Self::run_measurement(&inner);
            }
        }));
        inner.borrow_mut().pending = Some(handle);
    }

    fn cancel_pending(&self) {
        let (scheduler, pending) = {
            let mut inner = self.inner.borrow_mut();
            (inner.scheduler.clone(), inner.pending.take())
        };
        if let Some(handle) = pending {
            scheduler.cancel_frame(handle);
        }
    }

    fn run_measurement(inner: &Rc<RefCell<Inner>>) {
        let notify = {
            let mut state = inner.borrow_mut();
            state.pending = None;
            let Some(width) = state.width else {
                return;
            };

            let Inner {
                measurer,
                text,
                rows,
                decorations,
                ..
            } = &mut *state;
            let result = match measurer.measure(text, *rows, decorations, width) {
                Ok(result) => result,
                Err(err) => {
                    warn!(%err, "measurement unavailable, showing full text");
                    TruncationResult::full(text)
                }
            };

            state.measurements += 1;
            let changed = result.is_truncated != state.last_reported;
            state.last_reported = result.is_truncated;
            state.result = Some(result);

            if changed {
                state.on_ellipsis.clone().map(|cb| (cb, state.last_reported))
            } else {
                None
            }
        };

        if let Some((on_ellipsis, truncated)) = notify {
            debug!(truncated, "ellipsis state changed");
            on_ellipsis(truncated);
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn state(&self) -> ControllerState {
        let inner = self.inner.borrow();
        if !inner.enabled || inner.bypassed {
            ControllerState::Disabled
        } else if inner.native {
            ControllerState::NativeStyle
        } else if inner.pending.is_some() || inner.result.is_none() {
            ControllerState::Measuring
        } else {
            ControllerState::Measured
        }
    }

    /// Current display decision.
    pub fn view(&self) -> TruncationView {
        let state = self.state();
        let inner = self.inner.borrow();
        match state {
            ControllerState::Disabled => TruncationView {
                display_text: inner.text.clone(),
                is_truncated: Some(false),
                hint: StyleHint::None,
            },
            ControllerState::NativeStyle => TruncationView {
                display_text: inner.text.clone(),
                is_truncated: None,
                hint: native_hint(inner.rows),
            },
            ControllerState::Measuring | ControllerState::Measured => match &inner.result {
                Some(result) => TruncationView {
                    display_text: result.display_text.clone(),
                    is_truncated: Some(result.is_truncated),
                    hint: StyleHint::None,
                },
                None => TruncationView {
                    display_text: inner.text.clone(),
                    is_truncated: None,
                    hint: StyleHint::None,
                },
            },
        }
    }

    /// Cached measurement, if any.
    pub fn result(&self) -> Option<TruncationResult> {
        self.inner.borrow().result.clone()
    }

    /// Number of measurements run so far.
    pub fn measurement_count(&self) -> usize {
        self.inner.borrow().measurements
    }

    pub fn capability_flags(&self) -> CapabilityFlags {
        self.inner.borrow().flags
    }

    // -------------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------------

    /// Cancel the pending frame and stop following resizes.
    pub fn teardown(&self) {
        self.cancel_pending();
        let unsubscribe = self.inner.borrow_mut().unsubscribe.take();
        if let Some(unsubscribe) = unsubscribe {
            unsubscribe();
        }
    }
}

impl Drop for TruncationController {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// Tests
// =============================================================================
