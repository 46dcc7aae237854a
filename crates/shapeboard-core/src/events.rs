//! Observer lists with deferred delivery.
//!
//! Editing operations change shapes, the canvas and the selection while
//! `RefCell` borrows on them (and on the history running the command) are
//! held. Notifications raised inside [`batch`] are queued and delivered once
//! the outermost batch has returned, so observers can read any part of the
//! editor without hitting a borrow conflict.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

type Delivery = Box<dyn FnOnce()>;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
    static PENDING: RefCell<VecDeque<Delivery>> = const { RefCell::new(VecDeque::new()) };
}

/// Marks one level of batching; unwinds with the stack.
struct Depth;

impl Depth {
    fn enter() -> Self {
        DEPTH.with(|depth| depth.set(depth.get() + 1));
        Depth
    }
}

impl Drop for Depth {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Run `f` as one editing step.
///
/// Notifications raised while `f` runs are held back until the outermost
/// batch returns. Batches nest.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    let result = {
        let _depth = Depth::enter();
        f()
    };
    if DEPTH.with(Cell::get) == 0 {
        deliver_pending();
    }
    result
}

/// Whether a batch is currently running.
pub fn in_batch() -> bool {
    DEPTH.with(Cell::get) > 0
}

fn deliver_pending() {
    // Notifications raised by observers are queued behind the current ones.
    let _depth = Depth::enter();
    while let Some(delivery) = PENDING.with(|pending| pending.borrow_mut().pop_front()) {
        delivery();
    }
}

fn dispatch(delivery: Delivery) {
    PENDING.with(|pending| pending.borrow_mut().push_back(delivery));
    if !in_batch() {
        deliver_pending();
    }
}

type Observer<E> = Box<dyn FnMut(&E)>;

/// Callbacks interested in events of type `E`.
pub struct Observers<E> {
    list: Rc<RefCell<Vec<Observer<E>>>>,
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self {
            list: Rc::default(),
        }
    }
}

impl<E: 'static> Observers<E> {
    pub fn subscribe(&self, observer: impl FnMut(&E) + 'static) {
        self.list.borrow_mut().push(Box::new(observer));
    }

    pub fn len(&self) -> usize {
        self.list.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.borrow().is_empty()
    }

    /// Deliver `event` to every observer, immediately outside a batch and
    /// at the end of the outermost batch inside one.
    pub fn notify(&self, event: E) {
        let list = Rc::clone(&self.list);
        dispatch(Box::new(move || {
            // Taken out so an observer may subscribe more observers.
            let mut observers = std::mem::take(&mut *list.borrow_mut());
            for observer in &mut observers {
                observer(&event);
            }
            let mut slot = list.borrow_mut();
            let added = std::mem::replace(&mut *slot, observers);
            slot.extend(added);
        }));
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.list.borrow().len())
            .finish()
    }
}
