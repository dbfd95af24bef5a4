//! Render surfaces and resize notification.
//!
//! A [`RenderSurface`] lays out inline content offscreen and reports whether
//! it fits a width/row budget. [`CellSurface`] is the terminal grid
//! implementation; [`HeadlessSurface`] has no layout capability at all and
//! always reports [`TypographyError::MeasurementUnavailable`].
//!
//! [`ResizeHub`] is the in-process [`ResizeNotifier`]: the host forwards
//! container size changes (or crossterm resize events) and every subscriber
//! for that container is called.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crossterm::event::Event;

use crate::error::{Result, TypographyError};
use crate::layout::{layout_runs, string_width, Run};
use crate::types::{ControlId, Size};

// =============================================================================
// Render Surface
// =============================================================================

/// Budget an offscreen render must fit in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraints {
    /// Container width in cells.
    pub max_width: usize,
    /// Maximum number of lines.
    pub max_rows: usize,
}

/// Result of an offscreen render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
    pub fits: bool,
    pub measured: Size,
}

/// Style properties whose native support can be probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    /// Multi-line clamp.
    LineClamp,
    /// Single-line overflow ellipsis.
    TextOverflow,
}

/// A surface able to lay out content without displaying it.
pub trait RenderSurface {
    /// Lay out `content` under `constraints` and report the measured size.
    fn render_offscreen(&mut self, content: &[Run<'_>], constraints: Constraints) -> Result<Fit>;

    /// Apply `property` to a detached probe element.
    ///
    /// `Some(accepted)` when the surface can answer, `None` when it has no
    /// style engine to probe.
    fn probe_style(&self, _property: StyleProperty) -> Option<bool> {
        None
    }
}

// =============================================================================
// Cell Surface
// =============================================================================

/// Terminal cell grid surface.
///
/// Content is laid out with word-break wrapping; atoms never split.
#[derive(Debug, Clone)]
pub struct CellSurface {
    line_clamp: bool,
    text_overflow: bool,
    renders: Rc<Cell<usize>>,
}

impl CellSurface {
    /// Surface whose renderer can both clamp lines and ellipsize a single line.
    pub fn new() -> Self {
        Self::with_native_support(true, true)
    }

    /// Surface with explicit native truncation support.
    pub fn with_native_support(line_clamp: bool, text_overflow: bool) -> Self {
        Self {
            line_clamp,
            text_overflow,
            renders: Rc::new(Cell::new(0)),
        }
    }

    /// Shared counter of offscreen renders performed on this surface.
    pub fn render_counter(&self) -> Rc<Cell<usize>> {
        self.renders.clone()
    }
}

impl Default for CellSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for CellSurface {
    fn render_offscreen(&mut self, content: &[Run<'_>], constraints: Constraints) -> Result<Fit> {
        self.renders.set(self.renders.get() + 1);

        let lines = layout_runs(content, constraints.max_width);
        let widest = lines.iter().map(|l| string_width(l)).max().unwrap_or(0);
        let measured = Size::new(widest, lines.len());

        Ok(Fit {
            fits: measured.height <= constraints.max_rows && widest <= constraints.max_width,
            measured,
        })
    }

    fn probe_style(&self, property: StyleProperty) -> Option<bool> {
        Some(match property {
            StyleProperty::LineClamp => self.line_clamp,
            StyleProperty::TextOverflow => self.text_overflow,
        })
    }
}

/// Surface without layout capability (server-side rendering, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessSurface;

impl RenderSurface for HeadlessSurface {
    fn render_offscreen(&mut self, _content: &[Run<'_>], _constraints: Constraints) -> Result<Fit> {
        Err(TypographyError::MeasurementUnavailable)
    }
}

// =============================================================================
// Resize Notification
// =============================================================================

/// Unsubscribe function returned by [`ResizeNotifier::subscribe`].
pub type Unsubscribe = Box<dyn FnOnce()>;

/// Resize callback.
pub type ResizeCallback = Rc<dyn Fn(Size)>;

/// Source of container size changes.
pub trait ResizeNotifier {
    fn subscribe(&self, target: ControlId, on_resize: ResizeCallback) -> Unsubscribe;
}

type Subscribers = HashMap<ControlId, Vec<(u64, ResizeCallback)>>;

/// In-process resize dispatcher.
#[derive(Clone, Default)]
pub struct ResizeHub {
    subscribers: Rc<RefCell<Subscribers>>,
    next_id: Rc<Cell<u64>>,
}

impl ResizeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a new size for `target`, calling each of its subscribers.
    pub fn resize(&self, target: ControlId, size: Size) {
        // Clone out so callbacks may subscribe/unsubscribe re-entrantly.
        let callbacks: Vec<ResizeCallback> = self
            .subscribers
            .borrow()
            .get(&target)
            .map(|subs| subs.iter().map(|(_, cb)| cb.clone()).collect())
            .unwrap_or_default();

        for callback in callbacks {
            callback(size);
        }
    }

    /// Forward a terminal resize event to `target` (full-width container).
    ///
    /// Returns true if the event was a resize.
    pub fn forward_event(&self, target: ControlId, event: &Event) -> bool {
        match event {
            Event::Resize(cols, rows) => {
                self.resize(target, Size::new(*cols as usize, *rows as usize));
                true
            }
            _ => false,
        }
    }

    /// Number of live subscriptions for `target`.
    pub fn subscriber_count(&self, target: ControlId) -> usize {
        self.subscribers
            .borrow()
            .get(&target)
            .map_or(0, Vec::len)
    }
}

impl ResizeNotifier for ResizeHub {
    fn subscribe(&self, target: ControlId, on_resize: ResizeCallback) -> Unsubscribe {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        self.subscribers
            .borrow_mut()
            .entry(target)
            .or_default()
            .push((id, on_resize));

        let subscribers = self.subscribers.clone();
        Box::new(move || {
            let mut subs = subscribers.borrow_mut();
            if let Some(list) = subs.get_mut(&target) {
                list.retain(|(sub_id, _)| *sub_id != id);
                if list.is_empty() {
                    subs.remove(&target);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(max_width: usize, max_rows: usize) -> Constraints {
        Constraints { max_width, max_rows }
    }

    #[test]
    fn test_cell_surface_fits() {
        let mut surface = CellSurface::new();
        let fit = surface
            .render_offscreen(&[Run::Text("The quick...")], budget(12, 1))
            .unwrap();
        assert!(fit.fits);
        assert_eq!(fit.measured, Size::new(12, 1));
    }

    #[test]
    fn test_cell_surface_overflow_rows() {
        let mut surface = CellSurface::new();
        let fit = surface
            .render_offscreen(&[Run::Text("The quick brown")], budget(12, 1))
            .unwrap();
        assert!(!fit.fits);
        assert_eq!(fit.measured.height, 2);
        assert_eq!(surface.render_counter().get(), 1);
    }

    #[test]
    fn test_headless_unavailable() {
        let mut surface = HeadlessSurface;
        let err = surface
            .render_offscreen(&[Run::Text("x")], budget(10, 1))
            .unwrap_err();
        assert_eq!(err, TypographyError::MeasurementUnavailable);
        assert_eq!(surface.probe_style(StyleProperty::LineClamp), None);
    }

    #[test]
    fn test_resize_hub_dispatch_and_unsubscribe() {
        let hub = ResizeHub::new();
        let target = ControlId::next();
        let seen = Rc::new(Cell::new(Size::default()));

        let seen_clone = seen.clone();
        let unsubscribe = hub.subscribe(target, Rc::new(move |size| seen_clone.set(size)));
        assert_eq!(hub.subscriber_count(target), 1);

        hub.resize(target, Size::new(40, 3));
        assert_eq!(seen.get(), Size::new(40, 3));

        unsubscribe();
        assert_eq!(hub.subscriber_count(target), 0);

        hub.resize(target, Size::new(10, 1));
        assert_eq!(seen.get(), Size::new(40, 3));
    }

    #[test]
    fn test_forward_event() {
        let hub = ResizeHub::new();
        let target = ControlId::next();
        let width = Rc::new(Cell::new(0));
        let width_clone = width.clone();
        let _unsub = hub.subscribe(target, Rc::new(move |size| width_clone.set(size.width)));

        assert!(hub.forward_event(target, &Event::Resize(100, 30)));
        assert_eq!(width.get(), 100);
        assert!(!hub.forward_event(target, &Event::FocusGained));
    }
}
