//! Synchronous scheduler.
//!
//! [`SyncedMachine`] owns the current state, a FIFO queue of pending
//! reducers and the dependency key of the last effect flush. Every public
//! entry point runs inside [`SyncedMachine::act`], so actions enqueued by
//! effects are applied, and their effects flushed, before the call returns.

use super::runner::{apply_effect, Dispatch, EffectCleanup, MountFlag};
use crate::builder::Machine;
use crate::core::{Action, Context, Event, MachineState, State};
use crate::diagnostics::Diagnostic;
use crate::dispatch::Outcome;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

/// A pending state update.
pub type Reducer<S, C> = Box<dyn FnOnce(&MachineState<S, C>) -> Outcome<S, C>>;

/// Identity of a flushed state: its value plus the transition that entered
/// it. Every accepted event bumps the epoch, so re-entering the same value
/// still counts as a change while context updates do not.
#[derive(Clone, Debug, PartialEq, Eq)]
struct EffectKey<S> {
    value: S,
    epoch: u64,
}

struct Inner<S: State, C: Context> {
    machine: Machine<S, C>,
    state: RefCell<MachineState<S, C>>,
    queue: RefCell<VecDeque<Reducer<S, C>>>,
    epoch: Cell<u64>,
    deps: RefCell<Option<EffectKey<S>>>,
    exit: RefCell<Option<EffectCleanup<C>>>,
    mounted: MountFlag,
    acting: Cell<bool>,
}

/// A machine whose transitions, including those triggered from effects,
/// complete synchronously.
///
/// Effects run in sync mode: their `send`/`set_context` only work while the
/// effect itself is running.
///
/// # Example
///
/// ```rust
/// use switchyard::builder::{ConfigBuilder, Machine};
/// use switchyard::core::Definition;
/// use switchyard::effects::SyncedMachine;
///
/// let definition: Definition<String, ()> = Definition::builder("inactive")
///     .state("inactive", |s| s.on("TOGGLE", "active"))
///     .state("active", |s| s.on("TOGGLE", "inactive").effect("onActive"))
///     .build();
/// let config = ConfigBuilder::new()
///     .effect("onActive", |params| {
///         params.send("TOGGLE");
///         None
///     })
///     .build();
///
/// let machine = SyncedMachine::new(Machine::new(definition, config).unwrap());
/// machine.start();
/// machine.send("TOGGLE");
///
/// // The effect bounced the machine straight back.
/// assert_eq!(machine.state().value, "inactive");
/// ```
pub struct SyncedMachine<S: State, C: Context> {
    inner: Rc<Inner<S, C>>,
}

impl<S: State, C: Context> Clone for SyncedMachine<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: State, C: Context> SyncedMachine<S, C> {
    pub fn new(machine: Machine<S, C>) -> Self {
        let state = machine.initial_state();
        Self {
            inner: Rc::new(Inner {
                machine,
                state: RefCell::new(state),
                queue: RefCell::new(VecDeque::new()),
                epoch: Cell::new(0),
                deps: RefCell::new(None),
                exit: RefCell::new(None),
                mounted: MountFlag::new(),
                acting: Cell::new(false),
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> MachineState<S, C> {
        self.inner.state.borrow().clone()
    }

    pub fn machine(&self) -> &Machine<S, C> {
        &self.inner.machine
    }

    pub fn mount_flag(&self) -> MountFlag {
        self.inner.mounted.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.is_mounted()
    }

    /// Run the initial state's effects.
    pub fn start(&self) {
        self.act(|| self.flush());
    }

    /// Send an event and settle.
    pub fn send(&self, event: impl Into<Event>) {
        let event = event.into();
        self.act(|| self.dispatch(Action::Send(event)));
    }

    /// Update the context and settle. Returns `self` so a `send` can follow.
    pub fn set_context<F>(&self, reducer: F) -> &Self
    where
        F: FnOnce(&C) -> C + 'static,
    {
        self.act(|| self.dispatch(Action::set_context(reducer)));
        self
    }

    /// Queue an action without applying it. Dropped and reported once the
    /// machine is stopped.
    pub fn dispatch(&self, action: Action<C>) {
        if self.is_mounted() {
            self.enqueue(action);
            return;
        }

        self.inner
            .machine
            .config()
            .reporter()
            .report(&Diagnostic::Unmounted, || vec![("Action", format!("{action:?}"))]);
    }

    /// Queue an action unconditionally.
    pub fn enqueue(&self, action: Action<C>) {
        let machine = self.inner.machine.clone();
        self.inner
            .queue
            .borrow_mut()
            .push_back(Box::new(move |state| machine.step(state, action)));
    }

    /// Number of queued reducers.
    pub fn pending(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Apply queued reducers in order until the queue is empty, including
    /// any enqueued while draining. Returns how many were applied.
    pub fn drain(&self) -> usize {
        let mut applied = 0;
        loop {
            let next = self.inner.queue.borrow_mut().pop_front();
            let Some(reducer) = next else {
                break;
            };

            let current = self.state();
            match reducer(&current) {
                Outcome::Unchanged => {}
                Outcome::ContextUpdated(next) => {
                    *self.inner.state.borrow_mut() = next;
                }
                Outcome::Transitioned(next) => {
                    self.inner.epoch.set(self.inner.epoch.get() + 1);
                    *self.inner.state.borrow_mut() = next;
                }
            }
            applied += 1;
        }
        applied
    }

    /// Run effects for the current state if it differs from the last flush:
    /// the previous cleanup first, with the current event and context, then
    /// the entry effects of the current state.
    pub fn flush(&self) {
        let state = self.state();
        let key = EffectKey {
            value: state.value.clone(),
            epoch: self.inner.epoch.get(),
        };
        if self.inner.deps.borrow().as_ref() == Some(&key) {
            return;
        }
        *self.inner.deps.borrow_mut() = Some(key);

        self.run_exit();

        let cleanup = apply_effect(
            self.inner.machine.definition(),
            self.inner.machine.config(),
            &state,
            self.dispatcher(),
            &self.inner.mounted,
            true,
        );
        *self.inner.exit.borrow_mut() = cleanup;
    }

    /// Run `render`, then drain and flush until no actions remain.
    ///
    /// Nested calls, such as an effect calling [`send`](Self::send) on a
    /// clone of the machine, only run `render`; the outermost call drains
    /// what they queued once the running flush has stored its cleanup.
    pub fn act<F: FnOnce()>(&self, render: F) {
        if self.inner.acting.replace(true) {
            render();
            return;
        }

        render();
        while self.pending() > 0 {
            self.drain();
            self.flush();
        }
        self.inner.acting.set(false);
    }

    /// Unmount and run the active cleanup. Later dispatches are reported
    /// and dropped.
    pub fn stop(&self) {
        self.inner.mounted.unmount();
        self.run_exit();
        self.inner.queue.borrow_mut().clear();
    }

    fn run_exit(&self) {
        let previous = self.inner.exit.borrow_mut().take();
        if let Some(exit) = previous {
            let MachineState { event, context, .. } = self.state();
            exit.run(event, context);
        }
    }

    fn dispatcher(&self) -> Dispatch<C> {
        let weak: Weak<Inner<S, C>> = Rc::downgrade(&self.inner);
        Rc::new(move |action| {
            if let Some(inner) = weak.upgrade() {
                SyncedMachine { inner }.dispatch(action);
            }
        })
    }
}

impl<S: State, C: Context> fmt::Debug for SyncedMachine<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncedMachine")
            .field("state", &*self.inner.state.borrow())
            .field("pending", &self.pending())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConfigBuilder;
    use crate::core::Definition;
    use crate::diagnostics::MemoryConsole;
    use crate::effects::{cleanup, EffectHandle};

    type Log = Rc<RefCell<Vec<String>>>;

    fn toggle() -> Definition<String, i32> {
        Definition::builder("inactive")
            .state("inactive", |s| s.on("TOGGLE", "active").effect("onInactive"))
            .state("active", |s| {
                s.on("TOGGLE", "inactive")
                    .on("PING", "active")
                    .effect("onActive")
            })
            .build()
    }

    fn recording(log: &Log, console: &Rc<MemoryConsole>) -> ConfigBuilder<i32> {
        let inactive = Rc::clone(log);
        let active = Rc::clone(log);
        ConfigBuilder::new()
            .effect("onInactive", move |p| {
                inactive.borrow_mut().push(format!("enter inactive {}", p.event.kind()));
                let log = Rc::clone(&inactive);
                cleanup(move |exit| {
                    log.borrow_mut().push(format!("exit inactive {}", exit.event.kind()))
                })
            })
            .effect("onActive", move |p| {
                active.borrow_mut().push(format!("enter active {}", p.event.kind()));
                None
            })
            .console(console.clone())
    }

    fn synced(config: ConfigBuilder<i32>) -> SyncedMachine<String, i32> {
        SyncedMachine::new(Machine::new(toggle(), config.build()).unwrap())
    }

    #[test]
    fn start_runs_initial_effects_once() {
        let log: Log = Rc::default();
        let console = Rc::new(MemoryConsole::new());
        let machine = synced(recording(&log, &console));

        machine.start();
        machine.start();

        assert_eq!(*log.borrow(), vec!["enter inactive $init"]);
    }

    #[test]
    fn send_runs_exit_then_entry() {
        let log: Log = Rc::default();
        let console = Rc::new(MemoryConsole::new());
        let machine = synced(recording(&log, &console));
        machine.start();

        machine.send("TOGGLE");

        assert_eq!(machine.state().value, "active");
        assert_eq!(
            *log.borrow(),
            vec!["enter inactive $init", "exit inactive TOGGLE", "enter active TOGGLE"]
        );
    }

    #[test]
    fn reentering_same_value_flushes_again() {
        let log: Log = Rc::default();
        let console = Rc::new(MemoryConsole::new());
        let machine = synced(recording(&log, &console));
        machine.start();
        machine.send("TOGGLE");

        machine.send("PING");

        assert_eq!(log.borrow().last().unwrap(), "enter active PING");
        assert_eq!(log.borrow().len(), 4);
    }

    #[test]
    fn context_update_does_not_reflush() {
        let log: Log = Rc::default();
        let console = Rc::new(MemoryConsole::new());
        let machine = synced(recording(&log, &console));
        machine.start();

        machine.set_context(|c| c + 5);

        assert_eq!(machine.state().context, 5);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn unknown_event_does_not_reflush() {
        let log: Log = Rc::default();
        let console = Rc::new(MemoryConsole::new());
        let machine = synced(recording(&log, &console));
        machine.start();

        machine.send("PING");

        assert_eq!(machine.state().value, "inactive");
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn effect_sends_are_drained_before_returning() {
        let console = Rc::new(MemoryConsole::new());
        let config = ConfigBuilder::new()
            .effect("onInactive", |_| None)
            .effect("onActive", |p: &crate::effects::EffectParams<i32>| {
                if p.context < 3 {
                    p.set_context(|c| c + 1).send("TOGGLE");
                }
                None
            })
            .console(console.clone());
        let machine = synced(config);
        machine.start();

        machine.send("TOGGLE");

        // The active effect bounced the machine straight back.
        assert_eq!(machine.state().value, "inactive");
        assert_eq!(machine.state().context, 1);
        assert_eq!(machine.pending(), 0);
        assert!(console.is_empty());
    }

    #[test]
    fn manual_enqueue_drain_and_flush() {
        let log: Log = Rc::default();
        let console = Rc::new(MemoryConsole::new());
        let machine = synced(recording(&log, &console));
        machine.start();

        machine.enqueue(Action::send("TOGGLE"));
        machine.enqueue(Action::send("TOGGLE"));
        assert_eq!(machine.pending(), 2);
        assert_eq!(machine.state().value, "inactive");

        assert_eq!(machine.drain(), 2);
        assert_eq!(machine.state().value, "inactive");
        assert_eq!(machine.state().event.kind(), "TOGGLE");

        machine.flush();
        assert_eq!(
            *log.borrow(),
            vec!["enter inactive $init", "exit inactive TOGGLE", "enter inactive TOGGLE"]
        );
    }

    #[test]
    fn send_through_clone_inside_effect_keeps_cleanup_order() {
        let log: Log = Rc::default();
        let slot: Rc<RefCell<Option<SyncedMachine<String, i32>>>> = Rc::default();
        let definition: Definition<String, i32> = Definition::builder("idle")
            .state("idle", |s| s.on("ENTER", "a"))
            .state("a", |s| s.on("GO", "b").effect("onA"))
            .state("b", |s| s.on("GO", "idle").effect("onB"))
            .build();
        let enter_a = Rc::clone(&log);
        let enter_b = Rc::clone(&log);
        let reentrant = Rc::clone(&slot);
        let config = ConfigBuilder::<i32>::new()
            .effect("onA", move |_| {
                enter_a.borrow_mut().push("enter a".to_string());
                let machine = reentrant.borrow().clone();
                if let Some(machine) = machine {
                    machine.send("GO");
                }
                let log = Rc::clone(&enter_a);
                cleanup(move |exit| log.borrow_mut().push(format!("exit a {}", exit.event.kind())))
            })
            .effect("onB", move |_| {
                enter_b.borrow_mut().push("enter b".to_string());
                None
            })
            .verbose(false)
            .build();
        let machine = SyncedMachine::new(Machine::new(definition, config).unwrap());
        *slot.borrow_mut() = Some(machine.clone());
        machine.start();

        machine.send("ENTER");

        assert_eq!(machine.state().value, "b");
        assert_eq!(machine.pending(), 0);
        assert_eq!(*log.borrow(), vec!["enter a", "exit a GO", "enter b"]);
        slot.borrow_mut().take();
    }

    #[test]
    fn deferred_send_is_rejected() {
        let console = Rc::new(MemoryConsole::new());
        let kept: Rc<RefCell<Option<EffectHandle<i32>>>> = Rc::default();
        let slot = Rc::clone(&kept);
        let config = ConfigBuilder::new()
            .effect("onInactive", move |p| {
                *slot.borrow_mut() = Some(p.handle());
                None
            })
            .effect("onActive", |_| None)
            .console(console.clone());
        let machine = synced(config);
        machine.start();

        let handle = kept.borrow_mut().take().unwrap();
        handle.send("TOGGLE");
        machine.act(|| {});

        assert_eq!(machine.state().value, "inactive");
        assert_eq!(console.errors()[0], Diagnostic::SendLocked.to_string());
    }

    #[test]
    fn stop_runs_cleanup_and_rejects_dispatch() {
        let log: Log = Rc::default();
        let console = Rc::new(MemoryConsole::new());
        let machine = synced(recording(&log, &console));
        machine.start();

        machine.stop();
        machine.send("TOGGLE");

        assert!(!machine.is_mounted());
        assert_eq!(machine.state().value, "inactive");
        assert_eq!(log.borrow().last().unwrap(), "exit inactive $init");
        assert_eq!(console.errors()[0], Diagnostic::Unmounted.to_string());
        assert!(console.errors()[1].starts_with("Action: Send("));
    }
}
