//! Frame and timer scheduling.
//!
//! This is the one place where timing enters the component. Measurement is
//! deferred to the next animation frame; the copied confirmation expires on
//! a timeout. Both hand back handles so a superseded or torn-down request is
//! canceled, not just ignored.
//!
//! [`LocalScheduler`] is a tick-driven implementation for a single-threaded
//! host loop: the host calls [`LocalScheduler::run_frame`] before painting
//! and [`LocalScheduler::advance`] with elapsed time, and can sleep until
//! [`LocalScheduler::next_deadline`].

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

/// Pending animation-frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Pending timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Deferred execution primitives.
pub trait Scheduler {
    /// Run `callback` at the next frame boundary.
    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> FrameHandle;
    fn cancel_frame(&self, handle: FrameHandle);
    /// Run `callback` once `delay` has elapsed.
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerHandle;
    fn clear_timeout(&self, handle: TimerHandle);
}

// =============================================================================
// Local Scheduler
// =============================================================================

struct Timer {
    id: u64,
    deadline: Duration,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Inner {
    now: Duration,
    next_id: u64,
    frames: Vec<(u64, Box<dyn FnOnce()>)>,
    timers: Vec<Timer>,
}

impl Inner {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Single-threaded scheduler driven by an explicit virtual clock.
///
/// Clones share the same queues.
#[derive(Clone, Default)]
pub struct LocalScheduler {
    inner: Rc<RefCell<Inner>>,
}

impl LocalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Run every frame callback requested before this call.
    ///
    /// Callbacks requested while running land in the next frame.
    /// Returns the number of callbacks run.
    pub fn run_frame(&self) -> usize {
        let frames = std::mem::take(&mut self.inner.borrow_mut().frames);
        let count = frames.len();
        for (_, callback) in frames {
            callback();
        }
        if count > 0 {
            trace!(count, "ran frame callbacks");
        }
        count
    }

    /// Advance the clock, firing due timers in deadline order.
    ///
    /// Returns the number of timers fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.inner.borrow().now + by;
        let mut fired = 0;

        loop {
            let due = {
                let mut inner = self.inner.borrow_mut();
                let next = inner
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.deadline <= target)
                    .min_by_key(|(_, t)| (t.deadline, t.id))
                    .map(|(i, _)| i);
                next.map(|i| {
                    let timer = inner.timers.remove(i);
                    inner.now = timer.deadline;
                    timer
                })
            };

            match due {
                Some(timer) => {
                    (timer.callback)();
                    fired += 1;
                }
                None => break,
            }
        }

        self.inner.borrow_mut().now = target;
        fired
    }

    /// Time until the earliest pending timer, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        let inner = self.inner.borrow();
        inner
            .timers
            .iter()
            .map(|t| t.deadline.saturating_sub(inner.now))
            .min()
    }

    pub fn pending_frames(&self) -> usize {
        self.inner.borrow().frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }
}

impl Scheduler for LocalScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> FrameHandle {
        let mut inner = self.inner.borrow_mut();
        let id = inner.allocate_id();
        inner.frames.push((id, callback));
        FrameHandle(id)
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.inner
            .borrow_mut()
            .frames
            .retain(|(id, _)| *id != handle.0);
    }

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let mut inner = self.inner.borrow_mut();
        let id = inner.allocate_id();
        let deadline = inner.now + delay;
        inner.timers.push(Timer {
            id,
            deadline,
            callback,
        });
        TimerHandle(id)
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        self.inner
            .borrow_mut()
            .timers
            .retain(|t| t.id != handle.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl Fn() -> Box<dyn FnOnce()>) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || {
            let c = c.clone();
            Box::new(move || c.set(c.get() + 1)) as Box<dyn FnOnce()>
        })
    }

    #[test]
    fn test_frames_run_once() {
        let scheduler = LocalScheduler::new();
        let (count, make) = counter();

        scheduler.request_frame(make());
        scheduler.request_frame(make());
        assert_eq!(scheduler.pending_frames(), 2);

        assert_eq!(scheduler.run_frame(), 2);
        assert_eq!(count.get(), 2);
        assert_eq!(scheduler.run_frame(), 0);
    }

    #[test]
    fn test_cancel_frame() {
        let scheduler = LocalScheduler::new();
        let (count, make) = counter();

        let handle = scheduler.request_frame(make());
        scheduler.cancel_frame(handle);
        assert_eq!(scheduler.pending_frames(), 0);
        scheduler.run_frame();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_frame_requested_during_frame_runs_next() {
        let scheduler = LocalScheduler::new();
        let (count, make) = counter();

        let inner = scheduler.clone();
        let nested = make();
        scheduler.request_frame(Box::new(move || {
            inner.request_frame(nested);
        }));

        scheduler.run_frame();
        assert_eq!(count.get(), 0);
        scheduler.run_frame();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_timeout_fires_at_deadline() {
        let scheduler = LocalScheduler::new();
        let (count, make) = counter();

        scheduler.set_timeout(Duration::from_millis(3000), make());
        assert_eq!(scheduler.next_deadline(), Some(Duration::from_millis(3000)));

        scheduler.advance(Duration::from_millis(2999));
        assert_eq!(count.get(), 0);
        assert_eq!(scheduler.next_deadline(), Some(Duration::from_millis(1)));

        scheduler.advance(Duration::from_millis(1));
        assert_eq!(count.get(), 1);
        assert_eq!(scheduler.pending_timers(), 0);
        assert_eq!(scheduler.now(), Duration::from_millis(3000));
    }

    #[test]
    fn test_clear_timeout() {
        let scheduler = LocalScheduler::new();
        let (count, make) = counter();

        let handle = scheduler.set_timeout(Duration::from_millis(10), make());
        scheduler.clear_timeout(handle);
        scheduler.advance(Duration::from_secs(1));
        assert_eq!(count.get(), 0);
        assert!(scheduler.next_deadline().is_none());
    }
}
