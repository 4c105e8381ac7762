//! Single-threaded countdown latch gating scene finalization
//!
//! Every outstanding piece of work (the traversal itself, each texture
//! fetch) holds a [`LatchToken`]. The completion action runs when the last
//! token is released, and at most once.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Completion = Box<dyn FnOnce()>;

struct LatchState {
    pending: Cell<usize>,
    on_zero: RefCell<Option<Completion>>,
}

impl LatchState {
    fn release(&self) {
        let pending = self.pending.get().saturating_sub(1);
        self.pending.set(pending);
        if pending == 0 {
            // Take before calling so the completion may freely re-enter the latch.
            let completion = self.on_zero.borrow_mut().take();
            if let Some(completion) = completion {
                completion();
            }
        }
    }
}

/// Countdown latch over outstanding [`LatchToken`]s
pub(crate) struct CountdownLatch {
    state: Rc<LatchState>,
}

impl CountdownLatch {
    pub(crate) fn new() -> Self {
        Self {
            state: Rc::new(LatchState {
                pending: Cell::new(0),
                on_zero: RefCell::new(None),
            }),
        }
    }

    /// Register one more outstanding piece of work
    pub(crate) fn token(&self) -> LatchToken {
        self.state.pending.set(self.state.pending.get() + 1);
        LatchToken {
            state: Rc::clone(&self.state),
        }
    }

    /// Install the completion action
    ///
    /// Must be called while a token is still held; the action fires on the
    /// release that brings the count to zero.
    pub(crate) fn arm(&self, completion: impl FnOnce() + 'static) {
        *self.state.on_zero.borrow_mut() = Some(Box::new(completion));
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.state.pending.get()
    }
}

/// One unit of outstanding work; released on drop
pub(crate) struct LatchToken {
    state: Rc<LatchState>,
}

impl Drop for LatchToken {
    fn drop(&mut self) {
        self.state.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_last_release() {
        let fired = Rc::new(Cell::new(0));
        let latch = CountdownLatch::new();
        let gate = latch.token();
        let a = latch.token();
        let b = latch.token();

        let counter = Rc::clone(&fired);
        latch.arm(move || counter.set(counter.get() + 1));
        assert_eq!(latch.pending(), 3);

        drop(a);
        drop(gate);
        assert_eq!(fired.get(), 0);
        drop(b);
        assert_eq!(fired.get(), 1);
        assert_eq!(latch.pending(), 0);
    }

    #[test]
    fn test_completion_is_single_fire() {
        let fired = Rc::new(Cell::new(0));
        let latch = CountdownLatch::new();
        let counter = Rc::clone(&fired);
        let gate = latch.token();
        latch.arm(move || counter.set(counter.get() + 1));
        drop(gate);
        // A late token cycling the count back through zero must not re-fire.
        drop(latch.token());
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_not_armed_does_not_fire() {
        let latch = CountdownLatch::new();
        drop(latch.token());
        assert_eq!(latch.pending(), 0);
    }
}
