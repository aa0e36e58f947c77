//! A machine shared by several observers.

use crate::builder::Machine;
use crate::core::{Action, Context, Event, MachineState, State};
use crate::dispatch::Outcome;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

type Observer<S, C> = Rc<dyn Fn(&MachineState<S, C>)>;

struct Inner<S: State, C: Context> {
    machine: Machine<S, C>,
    state: RefCell<MachineState<S, C>>,
    observers: RefCell<BTreeMap<u64, Observer<S, C>>>,
    next_id: Cell<u64>,
}

/// One machine state observed from several places.
///
/// Every accepted transition or context update notifies the observers in
/// subscription order. Rejected actions notify nobody.
///
/// Notification walks a snapshot of the observer ids taken when the pass
/// starts: observers subscribed during a pass are first called on the next
/// change, and observers unsubscribed during a pass are not called for the
/// rest of it. Each observer receives the state current at the moment it
/// is called, so an observer that dispatches during a pass never leaves the
/// later observers on an older state.
///
/// Entry effects are not run here; pair the machine with an effect runner
/// when they are needed.
pub struct SharedMachine<S: State, C: Context> {
    inner: Rc<Inner<S, C>>,
}

impl<S: State, C: Context> Clone for SharedMachine<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: State, C: Context> SharedMachine<S, C> {
    pub fn new(machine: Machine<S, C>) -> Self {
        let state = machine.initial_state();
        Self {
            inner: Rc::new(Inner {
                machine,
                state: RefCell::new(state),
                observers: RefCell::new(BTreeMap::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn machine(&self) -> &Machine<S, C> {
        &self.inner.machine
    }

    pub fn state(&self) -> MachineState<S, C> {
        self.inner.state.borrow().clone()
    }

    pub fn send(&self, event: impl Into<Event>) {
        self.dispatch(Action::Send(event.into()));
    }

    /// Update the context. Returns `self` so a `send` can follow.
    pub fn set_context<F>(&self, reducer: F) -> &Self
    where
        F: FnOnce(&C) -> C + 'static,
    {
        self.dispatch(Action::set_context(reducer));
        self
    }

    /// Apply an action now. Returns whether the state changed.
    pub fn dispatch(&self, action: Action<C>) -> bool {
        let current = self.state();
        let next = match self.inner.machine.step(&current, action) {
            Outcome::Unchanged => return false,
            Outcome::ContextUpdated(next) | Outcome::Transitioned(next) => next,
        };
        *self.inner.state.borrow_mut() = next;

        self.notify();
        true
    }

    pub fn subscribe<F>(&self, observer: F) -> Subscription<S, C>
    where
        F: Fn(&MachineState<S, C>) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .observers
            .borrow_mut()
            .insert(id, Rc::new(observer));

        Subscription {
            inner: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    fn notify(&self) {
        let ids: Vec<u64> = self.inner.observers.borrow().keys().copied().collect();
        for id in ids {
            let observer = self.inner.observers.borrow().get(&id).cloned();
            if let Some(observer) = observer {
                // An earlier observer may have dispatched; hand out the latest state.
                observer(&self.state());
            }
        }
    }
}

impl<S: State, C: Context> fmt::Debug for SharedMachine<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMachine")
            .field("state", &*self.inner.state.borrow())
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Handle returned by [`SharedMachine::subscribe`].
///
/// Dropping it keeps the observer registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
pub struct Subscription<S: State, C: Context> {
    inner: Weak<Inner<S, C>>,
    id: u64,
}

impl<S: State, C: Context> Subscription<S, C> {
    /// Remove the observer. Returns `false` if it was already gone.
    pub fn unsubscribe(&self) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let removed = inner.observers.borrow_mut().remove(&self.id);
        removed.is_some()
    }
}

impl<S: State, C: Context> fmt::Debug for Subscription<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
