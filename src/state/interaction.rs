//! Interaction State - editing, copied feedback, expansion
//!
//! ```text
//!            start_edit                 copy
//!  Viewing ─────────────► Editing     false ──► true ──(3000ms)──► false
//!     ▲                      │                  ▲  │
//!     └──── save / cancel ───┘                  └──┘ copy re-arms the timer
//!
//!  expanded: false ──expand──► true (terminal)
//! ```
//!
//! `editing` may be controlled from outside with a [`PropValue`]; the
//! machine then mirrors that value and only fires callbacks. While editing,
//! copy and expand are refused.
//!
//! Leaving editing gives keyboard focus back to the control that started it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use spark_signals::{signal, Signal};
use tracing::{debug, warn};

use crate::config::{Callback, CopyConfig, EditConfig};
use crate::scheduler::{Scheduler, TimerHandle};
use crate::state::clipboard::ClipboardWriter;
use crate::state::focus;
use crate::types::{ControlId, PropValue};

/// How long the copied confirmation stays visible.
pub const COPIED_DURATION: Duration = Duration::from_millis(3000);

/// Viewing or editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Viewing,
    Editing,
}

/// Snapshot of the interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionState {
    pub mode: Mode,
    pub copied: bool,
    pub expanded: bool,
}

impl InteractionState {
    pub fn is_editing(&self) -> bool {
        self.mode == Mode::Editing
    }
}

type Listener = Rc<RefCell<Option<Callback>>>;

fn notify(listener: &Listener) {
    let callback = listener.borrow().clone();
    if let Some(callback) = callback {
        callback();
    }
}

/// Coordinates edit / copy / expand transitions for one text block.
pub struct Interaction {
    editing: Signal<bool>,
    controlled: Option<PropValue<bool>>,
    copied: Signal<bool>,
    expanded: Signal<bool>,
    copy_timer: Rc<Cell<Option<TimerHandle>>>,
    scheduler: Rc<dyn Scheduler>,
    clipboard: Rc<dyn ClipboardWriter>,
    edit: EditConfig,
    copy: CopyConfig,
    on_expand: Option<Callback>,
    return_focus: ControlId,
    listener: Listener,
}

impl Interaction {
    pub fn new(
        scheduler: Rc<dyn Scheduler>,
        clipboard: Rc<dyn ClipboardWriter>,
        edit: EditConfig,
        copy: CopyConfig,
        on_expand: Option<Callback>,
        return_focus: ControlId,
    ) -> Self {
        Self {
            editing: signal(false),
            controlled: edit.editing.clone(),
            copied: signal(false),
            expanded: signal(false),
            copy_timer: Rc::new(Cell::new(None)),
            scheduler,
            clipboard,
            edit,
            copy,
            on_expand,
            return_focus,
            listener: Rc::new(RefCell::new(None)),
        }
    }

    /// Called after every state change, including timer expiry.
    pub fn set_listener(&self, listener: Callback) {
        *self.listener.borrow_mut() = Some(listener);
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn is_editing(&self) -> bool {
        match &self.controlled {
            Some(value) => value.get(),
            None => self.editing.get(),
        }
    }

    pub fn is_copied(&self) -> bool {
        self.copied.get()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded.get()
    }

    pub fn state(&self) -> InteractionState {
        InteractionState {
            mode: if self.is_editing() {
                Mode::Editing
            } else {
                Mode::Viewing
            },
            copied: self.is_copied(),
            expanded: self.is_expanded(),
        }
    }

    /// Control that receives focus when editing ends.
    pub fn return_focus(&self) -> ControlId {
        self.return_focus
    }

    pub fn edit_config(&self) -> &EditConfig {
        &self.edit
    }

    pub fn copy_config(&self) -> &CopyConfig {
        &self.copy
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    /// Viewing → Editing. Fires `on_start` before the transition.
    ///
    /// Returns false if already editing.
    pub fn start_edit(&self) -> bool {
        if self.is_editing() {
            return false;
        }
        if let Some(on_start) = &self.edit.on_start {
            on_start();
        }
        if self.controlled.is_none() {
            self.editing.set(true);
        }
        debug!("edit started");
        notify(&self.listener);
        true
    }

    /// Editing → Viewing, committing `value`.
    ///
    /// Fires `on_change(value)` then `on_end`; `on_cancel` is not fired.
    pub fn save(&self, value: &str) {
        if let Some(on_change) = &self.edit.on_change {
            on_change(value);
        }
        if let Some(on_end) = &self.edit.on_end {
            on_end();
        }
        self.leave_editing();
    }

    /// Editing → Viewing, discarding edits. Fires `on_cancel`.
    pub fn cancel_edit(&self) {
        if let Some(on_cancel) = &self.edit.on_cancel {
            on_cancel();
        }
        self.leave_editing();
    }

    fn leave_editing(&self) {
        if self.controlled.is_none() {
            self.editing.set(false);
        }
        focus::focus(self.return_focus);
        debug!("edit finished");
        notify(&self.listener);
    }

    // -------------------------------------------------------------------------
    // Copy
    // -------------------------------------------------------------------------

    /// Copy the explicit `text` option, or `content` when none is set.
    ///
    /// Fires `on_copy` even if the clipboard write fails. The copied flag is
    /// set and its expiry re-armed; an earlier pending expiry is canceled.
    /// Returns false while editing.
    pub fn copy(&self, content: &str) -> bool {
        if self.is_editing() {
            return false;
        }

        let text = self.copy.text.as_deref().unwrap_or(content);
        if !text.is_empty() {
            if let Err(err) = self.clipboard.write(text) {
                warn!(%err, "copy failed");
            }
        }
        if let Some(on_copy) = &self.copy.on_copy {
            on_copy();
        }

        self.arm_copied_timer();
        self.copied.set(true);
        notify(&self.listener);
        true
    }

    fn arm_copied_timer(&self) {
        if let Some(previous) = self.copy_timer.take() {
            self.scheduler.clear_timeout(previous);
        }

        let copied = self.copied.clone();
        let timer = self.copy_timer.clone();
        let listener = self.listener.clone();
        let handle = self.scheduler.set_timeout(
            COPIED_DURATION,
            Box::new(move || {
                timer.set(None);
                copied.set(false);
                notify(&listener);
            }),
        );
        self.copy_timer.set(Some(handle));
    }

    // -------------------------------------------------------------------------
    // Expand
    // -------------------------------------------------------------------------

    /// Collapsed → expanded. Fires `on_expand`. Returns false if already
    /// expanded or while editing.
    pub fn expand(&self) -> bool {
        if self.is_expanded() || self.is_editing() {
            return false;
        }
        self.expanded.set(true);
        if let Some(on_expand) = &self.on_expand {
            on_expand();
        }
        notify(&self.listener);
        true
    }

    // -------------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------------

    /// Cancel the pending copied expiry. Safe to call more than once.
    pub fn teardown(&self) {
        if let Some(handle) = self.copy_timer.take() {
            self.scheduler.clear_timeout(handle);
        }
        *self.listener.borrow_mut() = None;
    }
}

impl Drop for Interaction {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, TypographyError};
    use crate::scheduler::LocalScheduler;
    use crate::state::clipboard::BufferClipboard;

    struct Fixture {
        scheduler: LocalScheduler,
        clipboard: BufferClipboard,
    }

    fn fixture() -> Fixture {
        focus::reset_focus_state();
        Fixture {
            scheduler: LocalScheduler::new(),
            clipboard: BufferClipboard::new(),
        }
    }

    fn machine(f: &Fixture, edit: EditConfig, copy: CopyConfig) -> Interaction {
        Interaction::new(
            Rc::new(f.scheduler.clone()),
            Rc::new(f.clipboard.clone()),
            edit,
            copy,
            None,
            ControlId::next(),
        )
    }

    fn log() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Callback) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        (log, move |name: &str| {
            let l = l.clone();
            let name = name.to_string();
            Rc::new(move || l.borrow_mut().push(name.clone())) as Callback
        })
    }

    #[test]
    fn test_edit_cycle_with_callbacks() {
        let f = fixture();
        let (events, cb) = log();
        let changes = events.clone();
        let edit = EditConfig {
            on_start: Some(cb("start")),
            on_cancel: Some(cb("cancel")),
            on_end: Some(cb("end")),
            on_change: Some(Rc::new(move |v: &str| {
                changes.borrow_mut().push(format!("change:{v}"))
            })),
            ..Default::default()
        };
        let m = machine(&f, edit, CopyConfig::default());

        assert_eq!(m.state().mode, Mode::Viewing);
        assert!(m.start_edit());
        assert!(m.is_editing());
        assert!(!m.start_edit());

        m.save("new text");
        assert!(!m.is_editing());
        assert!(focus::is_focused(m.return_focus()));

        assert!(m.start_edit());
        m.cancel_edit();
        assert!(!m.is_editing());

        assert_eq!(
            *events.borrow(),
            vec!["start", "change:new text", "end", "start", "cancel"]
        );
    }

    #[test]
    fn test_controlled_editing_mirrors_external_value() {
        let f = fixture();
        let external = signal(false);
        let edit = EditConfig {
            editing: Some(PropValue::Signal(external.clone())),
            ..Default::default()
        };
        let m = machine(&f, edit, CopyConfig::default());

        assert!(m.start_edit());
        assert!(!m.is_editing());

        external.set(true);
        assert!(m.is_editing());
        m.cancel_edit();
        assert!(m.is_editing());
    }

    #[test]
    fn test_copied_window() {
        let f = fixture();
        let m = machine(&f, EditConfig::default(), CopyConfig::default());

        assert!(m.copy("hello"));
        assert_eq!(f.clipboard.paste().as_deref(), Some("hello"));
        assert!(m.is_copied());

        f.scheduler.advance(Duration::from_millis(2999));
        assert!(m.is_copied());

        f.scheduler.advance(Duration::from_millis(2));
        assert!(!m.is_copied());
        assert_eq!(f.scheduler.pending_timers(), 0);
    }

    #[test]
    fn test_copy_restarts_single_timer() {
        let f = fixture();
        let m = machine(&f, EditConfig::default(), CopyConfig::default());

        m.copy("a");
        f.scheduler.advance(Duration::from_millis(1000));
        m.copy("b");
        assert_eq!(f.scheduler.pending_timers(), 1);

        // Original expiry (t = 3000) passes without clearing the flag.
        f.scheduler.advance(Duration::from_millis(2500));
        assert!(m.is_copied());

        // New expiry at t = 4000.
        f.scheduler.advance(Duration::from_millis(501));
        assert!(!m.is_copied());
    }

    #[test]
    fn test_copy_prefers_explicit_text_and_fires_on_copy() {
        let f = fixture();
        let (events, cb) = log();
        let copy = CopyConfig {
            text: Some("explicit".into()),
            on_copy: Some(cb("copy")),
            ..Default::default()
        };
        let m = machine(&f, EditConfig::default(), copy);

        m.copy("displayed");
        assert_eq!(f.clipboard.paste().as_deref(), Some("explicit"));
        assert_eq!(*events.borrow(), vec!["copy"]);
    }

    struct Broken;

    impl ClipboardWriter for Broken {
        fn write(&self, _text: &str) -> Result<()> {
            Err(TypographyError::ClipboardWriteFailed {
                reason: "no clipboard".into(),
            })
        }
    }

    #[test]
    fn test_clipboard_failure_is_swallowed() {
        let f = fixture();
        let (events, cb) = log();
        let copy = CopyConfig {
            on_copy: Some(cb("copy")),
            ..Default::default()
        };
        let m = Interaction::new(
            Rc::new(f.scheduler.clone()),
            Rc::new(Broken),
            EditConfig::default(),
            copy,
            None,
            ControlId::next(),
        );

        assert!(m.copy("text"));
        assert!(m.is_copied());
        assert_eq!(*events.borrow(), vec!["copy"]);
    }

    #[test]
    fn test_expand_is_terminal() {
        let f = fixture();
        let (events, cb) = log();
        let m = Interaction::new(
            Rc::new(f.scheduler.clone()),
            Rc::new(f.clipboard.clone()),
            EditConfig::default(),
            CopyConfig::default(),
            Some(cb("expand")),
            ControlId::next(),
        );

        assert!(m.expand());
        assert!(m.is_expanded());
        assert!(!m.expand());
        assert_eq!(*events.borrow(), vec!["expand"]);
    }

    #[test]
    fn test_editing_blocks_copy_and_expand() {
        let f = fixture();
        let m = machine(&f, EditConfig::default(), CopyConfig::default());

        m.start_edit();
        assert!(!m.copy("x"));
        assert!(!m.expand());
        assert!(!m.is_copied());
        assert!(f.clipboard.paste().is_none());
    }

    #[test]
    fn test_teardown_cancels_timer() {
        let f = fixture();
        let m = machine(&f, EditConfig::default(), CopyConfig::default());

        m.copy("x");
        assert_eq!(f.scheduler.pending_timers(), 1);
        drop(m);
        assert_eq!(f.scheduler.pending_timers(), 0);
    }

    #[test]
    fn test_listener_sees_timer_expiry() {
        let f = fixture();
        let m = machine(&f, EditConfig::default(), CopyConfig::default());
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        m.set_listener(Rc::new(move || c.set(c.get() + 1)));

        m.copy("x");
        f.scheduler.advance(COPIED_DURATION);
        assert_eq!(calls.get(), 2);
    }
}
