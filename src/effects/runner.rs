//! Entry effects and their cleanups.

use crate::core::{Action, Config, Context, Definition, Event, MachineState, State};
use crate::diagnostics::{Diagnostic, Reporter};
use std::cell::Cell;
use std::rc::Rc;

/// Callback through which effects feed actions back into the machine.
pub type Dispatch<C> = Rc<dyn Fn(Action<C>)>;

/// Cleanup returned by an effect, run when the state is left.
pub type Cleanup<C> = Box<dyn FnOnce(&CleanupParams<C>)>;

/// Wrap a closure as an effect cleanup.
///
/// # Example
///
/// ```rust
/// use switchyard::effects::{cleanup, Cleanup, EffectParams};
///
/// fn on_active(params: &EffectParams<u32>) -> Option<Cleanup<u32>> {
///     let started = params.context;
///     cleanup(move |exit| assert!(exit.context >= started))
/// }
/// ```
pub fn cleanup<C, F>(f: F) -> Option<Cleanup<C>>
where
    F: FnOnce(&CleanupParams<C>) + 'static,
{
    Some(Box::new(f))
}

/// Shared flag telling whether the owner of a machine is still alive.
///
/// Once cleared, dispatches through effect handles are dropped.
#[derive(Clone, Debug)]
pub struct MountFlag(Rc<Cell<bool>>);

impl MountFlag {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_mounted(&self) -> bool {
        self.0.get()
    }

    pub fn set_mounted(&self, mounted: bool) {
        self.0.set(mounted);
    }

    pub fn unmount(&self) {
        self.set_mounted(false);
    }
}

impl Default for MountFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// `send`/`set_context` access handed to effects and cleanups.
///
/// In sync mode the handle is locked as soon as the effect (or cleanup)
/// returns: calls made later, from a timer or another deferred callback,
/// are rejected and reported.
pub struct EffectHandle<C> {
    dispatch: Dispatch<C>,
    locked: Rc<Cell<bool>>,
    mounted: MountFlag,
    reporter: Reporter,
    state: Rc<str>,
}

impl<C> Clone for EffectHandle<C> {
    fn clone(&self) -> Self {
        Self {
            dispatch: Rc::clone(&self.dispatch),
            locked: Rc::clone(&self.locked),
            mounted: self.mounted.clone(),
            reporter: self.reporter.clone(),
            state: Rc::clone(&self.state),
        }
    }
}

impl<C: Context> EffectHandle<C> {
    pub fn send(&self, event: impl Into<Event>) {
        let event = event.into();
        if self.locked.get() {
            self.reporter.report(&Diagnostic::SendLocked, || {
                vec![("State", self.state.to_string()), ("Event", event.to_string())]
            });
            return;
        }
        (self.dispatch)(Action::Send(event));
    }

    /// Queue a context update. Returns the handle so a `send` can follow.
    pub fn set_context<F>(&self, reducer: F) -> &Self
    where
        F: FnOnce(&C) -> C + 'static,
    {
        if self.locked.get() {
            self.reporter.report(&Diagnostic::SetContextLocked, || {
                vec![("State", self.state.to_string())]
            });
        } else {
            (self.dispatch)(Action::set_context(reducer));
        }
        self
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_mounted()
    }

    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }
}

/// Input of an entry effect.
pub struct EffectParams<C> {
    pub event: Event,
    pub context: C,
    handle: EffectHandle<C>,
}

/// Input of an effect cleanup: the event and context the state is left with.
pub struct CleanupParams<C> {
    pub event: Event,
    pub context: C,
    handle: EffectHandle<C>,
}

macro_rules! delegate_handle {
    ($params:ident) => {
        impl<C: Context> $params<C> {
            pub fn send(&self, event: impl Into<Event>) {
                self.handle.send(event);
            }

            pub fn set_context<F>(&self, reducer: F) -> &EffectHandle<C>
            where
                F: FnOnce(&C) -> C + 'static,
            {
                self.handle.set_context(reducer)
            }

            pub fn is_mounted(&self) -> bool {
                self.handle.is_mounted()
            }

            /// A handle that outlives this call, for deferred work.
            pub fn handle(&self) -> EffectHandle<C> {
                self.handle.clone()
            }
        }
    };
}

delegate_handle!(EffectParams);
delegate_handle!(CleanupParams);

/// Cleanups collected from one state's entry effects.
pub struct EffectCleanup<C> {
    handle: EffectHandle<C>,
    exits: Vec<Cleanup<C>>,
    sync_mode: bool,
}

impl<C: Context> EffectCleanup<C> {
    /// Run every cleanup in registration order with the exit event and
    /// context.
    pub fn run(self, event: Event, context: C) {
        self.handle.locked.set(false);
        let params = CleanupParams {
            event,
            context,
            handle: self.handle.clone(),
        };
        for exit in self.exits {
            exit(&params);
        }
        self.handle.locked.set(self.sync_mode);
    }

    pub fn len(&self) -> usize {
        self.exits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exits.is_empty()
    }
}

/// Run the entry effects configured for `state.value`.
///
/// Returns `None` when the state has no effects. Effects named in the
/// definition but missing from the configuration are reported and skipped.
/// In `sync_mode` the handles given to effects only accept calls while the
/// effects (or later their cleanups) are running.
pub fn apply_effect<S: State, C: Context>(
    definition: &Definition<S, C>,
    config: &Config<C>,
    state: &MachineState<S, C>,
    dispatch: Dispatch<C>,
    mounted: &MountFlag,
    sync_mode: bool,
) -> Option<EffectCleanup<C>> {
    let effects = &definition.state(&state.value)?.effects;
    if effects.is_empty() {
        return None;
    }

    let reporter = config.reporter();
    let handle = EffectHandle {
        dispatch,
        locked: Rc::new(Cell::new(false)),
        mounted: mounted.clone(),
        reporter: reporter.clone(),
        state: Rc::from(state.value.name()),
    };

    let mut exits = Vec::new();
    for name in effects {
        let Some(effect) = config.effect(name) else {
            reporter.report(
                &Diagnostic::UndefinedEffect {
                    effect: name.clone(),
                    state: state.value.name().to_string(),
                },
                || {
                    vec![
                        ("Event", state.event.to_string()),
                        ("Context", format!("{:?}", state.context)),
                    ]
                },
            );
            continue;
        };

        let params = EffectParams {
            event: state.event.clone(),
            context: state.context.clone(),
            handle: handle.clone(),
        };
        if let Some(exit) = effect.run(&params) {
            exits.push(exit);
        }
    }
    handle.locked.set(sync_mode);

    Some(EffectCleanup {
        handle,
        exits,
        sync_mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConfigBuilder;
    use crate::diagnostics::MemoryConsole;
    use crate::dispatch::create_initial_state;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<String>>>;

    fn definition() -> Definition<String, i32> {
        Definition::builder("active")
            .state("active", |s| s.on("TOGGLE", "inactive").effects(["first", "second"]))
            .state("inactive", |s| s.on("TOGGLE", "active"))
            .build()
    }

    fn recording_dispatch() -> (Dispatch<i32>, Rc<RefCell<Vec<Action<i32>>>>) {
        let actions: Rc<RefCell<Vec<Action<i32>>>> = Rc::default();
        let sink = Rc::clone(&actions);
        let dispatch: Dispatch<i32> = Rc::new(move |action| sink.borrow_mut().push(action));
        (dispatch, actions)
    }

    fn config(log: &Log, console: &Rc<MemoryConsole>) -> Config<i32> {
        let first = Rc::clone(log);
        let second = Rc::clone(log);
        ConfigBuilder::new()
            .effect("first", move |p| {
                first.borrow_mut().push(format!("enter first {}", p.event.kind()));
                let log = Rc::clone(&first);
                cleanup(move |exit| log.borrow_mut().push(format!("exit first {}", exit.event.kind())))
            })
            .effect("second", move |_| {
                second.borrow_mut().push("enter second".to_string());
                None
            })
            .console(console.clone())
            .build()
    }

    #[test]
    fn effects_run_in_order_and_collect_cleanups() {
        let log: Log = Rc::default();
        let console = Rc::new(MemoryConsole::new());
        let def = definition();
        let state = create_initial_state(&def);
        let (dispatch, _) = recording_dispatch();

        let exit = apply_effect(&def, &config(&log, &console), &state, dispatch, &MountFlag::new(), false)
            .expect("active has effects");

        assert_eq!(*log.borrow(), vec!["enter first $init", "enter second"]);
        assert_eq!(exit.len(), 1);

        exit.run(Event::new("TOGGLE"), 0);
        assert_eq!(log.borrow().last().unwrap(), "exit first TOGGLE");
    }

    #[test]
    fn state_without_effects_returns_none() {
        let log: Log = Rc::default();
        let console = Rc::new(MemoryConsole::new());
        let def = definition();
        let mut state = create_initial_state(&def);
        state.value = "inactive".to_string();
        let (dispatch, _) = recording_dispatch();

        let exit = apply_effect(&def, &config(&log, &console), &state, dispatch, &MountFlag::new(), false);

        assert!(exit.is_none());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn sync_mode_locks_handle_after_effects_return() {
        let console = Rc::new(MemoryConsole::new());
        let kept: Rc<RefCell<Option<EffectHandle<i32>>>> = Rc::default();
        let slot = Rc::clone(&kept);
        let conf = ConfigBuilder::new()
            .effect("first", move |p| {
                p.send("TOGGLE");
                *slot.borrow_mut() = Some(p.handle());
                None
            })
            .effect("second", |_| None)
            .console(console.clone())
            .build();
        let def = definition();
        let (dispatch, actions) = recording_dispatch();

        let exit = apply_effect(&def, &conf, &create_initial_state(&def), dispatch, &MountFlag::new(), true);

        assert_eq!(actions.borrow().len(), 1);
        let handle = kept.borrow_mut().take().unwrap();
        assert!(handle.is_locked());

        handle.send("TOGGLE");
        handle.set_context(|c| c + 1);
        assert_eq!(actions.borrow().len(), 1);
        assert_eq!(
            console.errors(),
            vec![
                Diagnostic::SendLocked.to_string(),
                "State: active".to_string(),
                r#"Event: {"type":"TOGGLE"}"#.to_string(),
                Diagnostic::SetContextLocked.to_string(),
                "State: active".to_string(),
            ]
        );

        drop(exit);
    }

    #[test]
    fn cleanup_unlocks_handle_while_running() {
        let console = Rc::new(MemoryConsole::new());
        let conf = ConfigBuilder::new()
            .effect("first", |_| cleanup(|exit: &CleanupParams<i32>| exit.send("TOGGLE")))
            .effect("second", |_| None)
            .console(console.clone())
            .build();
        let def = definition();
        let (dispatch, actions) = recording_dispatch();

        let exit = apply_effect(&def, &conf, &create_initial_state(&def), dispatch, &MountFlag::new(), true)
            .unwrap();
        exit.run(Event::new("TOGGLE"), 0);

        assert_eq!(actions.borrow().len(), 1);
        assert!(console.is_empty());
    }

    #[test]
    fn normal_mode_never_locks() {
        let console = Rc::new(MemoryConsole::new());
        let kept: Rc<RefCell<Option<EffectHandle<i32>>>> = Rc::default();
        let slot = Rc::clone(&kept);
        let conf = ConfigBuilder::new()
            .effect("first", move |p| {
                *slot.borrow_mut() = Some(p.handle());
                None
            })
            .effect("second", |_| None)
            .console(console.clone())
            .build();
        let def = definition();
        let (dispatch, actions) = recording_dispatch();

        let _exit = apply_effect(&def, &conf, &create_initial_state(&def), dispatch, &MountFlag::new(), false);
        let handle = kept.borrow_mut().take().unwrap();
        handle.set_context(|c| c + 1).send("TOGGLE");

        assert_eq!(actions.borrow().len(), 2);
        assert!(console.is_empty());
    }

    #[test]
    fn missing_effect_is_reported_and_skipped() {
        let log: Log = Rc::default();
        let console = Rc::new(MemoryConsole::new());
        let first = Rc::clone(&log);
        let conf = ConfigBuilder::new()
            .effect("first", move |_| {
                first.borrow_mut().push("first".to_string());
                None
            })
            .console(console.clone())
            .build();
        let def = definition();
        let (dispatch, _) = recording_dispatch();

        let exit = apply_effect(&def, &conf, &create_initial_state(&def), dispatch, &MountFlag::new(), false);

        assert!(exit.is_some_and(|e| e.is_empty()));
        assert_eq!(*log.borrow(), vec!["first"]);
        assert_eq!(console.errors()[0], "Effect 'second' not defined for state 'active'.");
    }

    #[test]
    fn effects_observe_mount_flag() {
        let seen = Rc::new(Cell::new(true));
        let probe = Rc::clone(&seen);
        let conf = ConfigBuilder::new()
            .effect("first", move |p| {
                probe.set(p.is_mounted());
                None
            })
            .effect("second", |_| None)
            .build();
        let def = definition();
        let (dispatch, _) = recording_dispatch();
        let mounted = MountFlag::new();
        mounted.unmount();

        apply_effect(&def, &conf, &create_initial_state(&def), dispatch, &mounted, false);

        assert!(!seen.get());
    }
}
