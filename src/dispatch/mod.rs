//! Pure state transitions.
//!
//! [`apply_dispatch`] maps `(definition, config, state, action)` to the next
//! state. It has no hidden state: everything it has to say about rejected
//! events goes to the configured console, never to the caller.

use crate::core::{Action, Config, Context, Definition, Event, GuardParams, MachineState, State};
use crate::diagnostics::Diagnostic;
use crate::guard::{evaluate, format_trace, trace, GuardError, GuardExpr};

/// What a dispatch did.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<S, C> {
    /// The action was rejected; the state stays as it was.
    Unchanged,

    /// Only the context changed.
    ContextUpdated(MachineState<S, C>),

    /// An event was accepted and the machine entered `value` (possibly the
    /// same value it was in).
    Transitioned(MachineState<S, C>),
}

impl<S, C> Outcome<S, C> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Outcome::Unchanged)
    }

    /// The resulting state, or `current` when nothing changed.
    pub fn into_state(self, current: &MachineState<S, C>) -> MachineState<S, C>
    where
        S: Clone,
        C: Clone,
    {
        match self {
            Outcome::Unchanged => current.clone(),
            Outcome::ContextUpdated(next) | Outcome::Transitioned(next) => next,
        }
    }
}

/// The state a machine starts in: the initial value and context, with the
/// `$init` event.
pub fn create_initial_state<S: State, C: Context>(
    definition: &Definition<S, C>,
) -> MachineState<S, C> {
    MachineState {
        value: definition.initial.clone(),
        context: definition.context.clone(),
        event: Event::init(),
        next_events: next_events(definition, &definition.initial),
    }
}

/// Event types accepted in `value`: its own transition keys in order, then
/// root keys not already listed.
pub fn next_events<S: State, C>(definition: &Definition<S, C>, value: &S) -> Vec<String> {
    definition.next_events(value)
}

/// Apply one action and return the next state.
///
/// Rejected actions return a copy equal to `state`.
pub fn apply_dispatch<S: State, C: Context>(
    definition: &Definition<S, C>,
    config: &Config<C>,
    state: &MachineState<S, C>,
    action: Action<C>,
) -> MachineState<S, C> {
    step(definition, config, state, action).into_state(state)
}

/// Like [`apply_dispatch`], but reports what kind of change happened.
pub fn step<S: State, C: Context>(
    definition: &Definition<S, C>,
    config: &Config<C>,
    state: &MachineState<S, C>,
    action: Action<C>,
) -> Outcome<S, C> {
    match action {
        Action::Send(event) => send(definition, config, state, event),
        Action::SetContext(reducer) => {
            let context = reducer(&state.context);

            config
                .reporter()
                .report(&Diagnostic::ContextUpdated, || {
                    vec![
                        ("Prev Context", format!("{:?}", state.context)),
                        ("Next Context", format!("{context:?}")),
                    ]
                });

            Outcome::ContextUpdated(MachineState {
                context,
                ..state.clone()
            })
        }
    }
}

fn send<S: State, C: Context>(
    definition: &Definition<S, C>,
    config: &Config<C>,
    state: &MachineState<S, C>,
    event: Event,
) -> Outcome<S, C> {
    let reporter = config.reporter();

    if definition.state(&state.value).is_none() {
        reporter.report(
            &Diagnostic::UndefinedState {
                state: state.value.name().to_string(),
            },
            || vec![("State", format!("{state:?}")), ("Event", event.to_string())],
        );
        return Outcome::Unchanged;
    }

    let Some(transition) = definition.transition(&state.value, event.kind()) else {
        reporter.report(
            &Diagnostic::UnknownEvent {
                state: state.value.name().to_string(),
                event: event.kind().to_string(),
            },
            || vec![("State", format!("{state:?}")), ("Event", event.to_string())],
        );
        return Outcome::Unchanged;
    };

    let target = transition.target();
    if let Some(guard) = transition.guard() {
        if !check_guard(config, guard, state, target, &event) {
            return Outcome::Unchanged;
        }
    }

    Outcome::Transitioned(MachineState {
        value: target.clone(),
        context: state.context.clone(),
        event,
        next_events: next_events(definition, target),
    })
}

/// Decide a guarded transition. The production evaluation decides; in
/// development the tracer runs as well to explain denials and to
/// cross-check the result.
fn check_guard<S: State, C: Context>(
    config: &Config<C>,
    guard: &GuardExpr,
    state: &MachineState<S, C>,
    target: &S,
    event: &Event,
) -> bool {
    let reporter = config.reporter();
    let predicates = config.predicates(GuardParams {
        event,
        context: &state.context,
    });

    let allow = match evaluate(&predicates, guard) {
        Ok(allow) => allow,
        Err(GuardError::UndefinedGuard { name }) => {
            reporter.report(&Diagnostic::UndefinedGuard { name }, || {
                vec![("Guard", guard.to_string()), ("Event", event.to_string())]
            });
            return false;
        }
    };

    let traced = if config.is_development() {
        trace(&predicates, guard).ok()
    } else {
        None
    };

    if let Some(traced) = &traced {
        if traced.allow != Some(allow) {
            reporter.report(&Diagnostic::TracerDivergence, || {
                vec![
                    ("Event", event.to_string()),
                    ("Guard", guard.to_string()),
                    ("Traced", format!("{:?}", traced.allow)),
                    ("Production", allow.to_string()),
                ]
            });
        }
    }

    if !allow {
        reporter.report(
            &Diagnostic::GuardDenied {
                from: state.value.name().to_string(),
                to: target.name().to_string(),
            },
            || {
                let explanation = traced
                    .as_ref()
                    .map(format_trace)
                    .unwrap_or_else(|| guard.to_string());
                vec![
                    ("Guard", explanation),
                    ("Event", event.to_string()),
                    ("Context", format!("{:?}", state.context)),
                ]
            },
        );
    }

    allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConfigBuilder;
    use crate::diagnostics::MemoryConsole;
    use crate::guard::and;
    use std::cell::Cell;
    use std::rc::Rc;

    fn definition() -> Definition<String, i32> {
        Definition::builder("idle")
            .state("idle", |s| {
                s.on("FETCH", "loading")
                    .on_guarded("SKIP", "done", and(["isOk", "isOk"]))
            })
            .state("loading", |s| s.on("RESOLVE", "done"))
            .state("done", |s| s)
            .on("RESET", "idle")
            .context(0)
            .build()
    }

    fn config(is_ok: bool, console: &Rc<MemoryConsole>) -> Config<i32> {
        ConfigBuilder::new()
            .guard("isOk", move |_| is_ok)
            .verbose(2)
            .console(console.clone())
            .development(true)
            .build()
    }

    #[test]
    fn initial_state_uses_init_event() {
        let state = create_initial_state(&definition());

        assert_eq!(state.value, "idle");
        assert_eq!(state.context, 0);
        assert_eq!(state.event, Event::init());
        assert_eq!(state.next_events, vec!["FETCH", "SKIP", "RESET"]);
    }

    #[test]
    fn send_moves_to_target_and_recomputes_next_events() {
        let console = Rc::new(MemoryConsole::new());
        let def = definition();
        let state = create_initial_state(&def);

        let next = apply_dispatch(&def, &config(true, &console), &state, Action::send("FETCH"));

        assert_eq!(next.value, "loading");
        assert_eq!(next.event, Event::new("FETCH"));
        assert_eq!(next.next_events, vec!["RESOLVE", "RESET"]);
    }

    #[test]
    fn root_transitions_apply_from_any_state() {
        let console = Rc::new(MemoryConsole::new());
        let def = definition();
        let conf = config(true, &console);
        let loading = apply_dispatch(&def, &conf, &create_initial_state(&def), Action::send("FETCH"));

        let reset = apply_dispatch(&def, &conf, &loading, Action::send("RESET"));

        assert_eq!(reset.value, "idle");
        assert_eq!(reset.event.kind(), "RESET");
    }

    #[test]
    fn unknown_event_is_a_logged_no_op() {
        let console = Rc::new(MemoryConsole::new());
        let def = definition();
        let state = create_initial_state(&def);

        let outcome = step(&def, &config(true, &console), &state, Action::send("RESOLVE"));

        assert!(outcome.is_unchanged());
        assert!(console.contains("doesn't listen to event type 'RESOLVE'"));
    }

    #[test]
    fn denied_guard_logs_trace() {
        let console = Rc::new(MemoryConsole::new());
        let def = definition();
        let state = create_initial_state(&def);

        let next = apply_dispatch(&def, &config(false, &console), &state, Action::send("SKIP"));

        assert_eq!(next, state);
        assert!(console.contains("Transition from 'idle' to 'done' denied by guard."));
        assert!(console.contains("Guard:\n(isOk && isOk)\n ^^^^         "));
    }

    #[test]
    fn allowed_guard_transitions() {
        let console = Rc::new(MemoryConsole::new());
        let def = definition();
        let state = create_initial_state(&def);

        let next = apply_dispatch(&def, &config(true, &console), &state, Action::send("SKIP"));

        assert_eq!(next.value, "done");
        assert!(console.is_empty());
    }

    #[test]
    fn set_context_only_touches_context() {
        let console = Rc::new(MemoryConsole::new());
        let def = definition();
        let state = create_initial_state(&def);

        let outcome = step(
            &def,
            &config(true, &console),
            &state,
            Action::set_context(|count: &i32| count + 1),
        );

        let Outcome::ContextUpdated(next) = outcome else {
            panic!("Expected ContextUpdated");
        };
        assert_eq!(next.context, 1);
        assert_eq!(next.value, state.value);
        assert_eq!(next.event, state.event);
        assert_eq!(next.next_events, state.next_events);
        assert!(console.contains("Next Context: 1"));
    }

    #[test]
    fn undefined_current_state_is_reported() {
        let console = Rc::new(MemoryConsole::new());
        let def = definition();
        let mut state = create_initial_state(&def);
        state.value = "ghost".to_string();

        let next = apply_dispatch(&def, &config(true, &console), &state, Action::send("RESET"));

        assert_eq!(next, state);
        assert_eq!(console.errors()[0], "State 'ghost' not defined.");
    }

    #[test]
    fn tracer_divergence_is_reported_and_production_result_wins() {
        let console = Rc::new(MemoryConsole::new());
        let flip = Rc::new(Cell::new(true));
        let toggle = Rc::clone(&flip);
        let conf = ConfigBuilder::new()
            .guard("isOk", move |_| {
                let value = toggle.get();
                toggle.set(!value);
                value
            })
            .console(console.clone())
            .development(true)
            .build();
        let def: Definition<String, i32> = Definition::builder("idle")
            .state("idle", |s| s.on_guarded("GO", "done", "isOk"))
            .state("done", |s| s)
            .build();

        let next = apply_dispatch(&def, &conf, &create_initial_state(&def), Action::send("GO"));

        assert_eq!(next.value, "done");
        assert!(console.errors()[0].starts_with("Guard results differ"));
    }

    #[test]
    fn undefined_guard_denies_transition() {
        let console = Rc::new(MemoryConsole::new());
        let def = definition();
        let conf = ConfigBuilder::new().console(console.clone()).build();
        let state = create_initial_state(&def);

        let next = apply_dispatch(&def, &conf, &state, Action::send("SKIP"));

        assert_eq!(next, state);
        assert_eq!(
            console.errors()[0],
            "The guard function 'isOk' is not defined in the configuration."
        );
    }

    #[test]
    fn production_mode_skips_tracer() {
        let console = Rc::new(MemoryConsole::new());
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let conf = ConfigBuilder::new()
            .guard("isOk", move |_| {
                counter.set(counter.get() + 1);
                false
            })
            .verbose(true)
            .console(console.clone())
            .development(false)
            .build();
        let def = definition();

        apply_dispatch(&def, &conf, &create_initial_state(&def), Action::send("SKIP"));

        assert_eq!(calls.get(), 1);
        assert!(console.contains("Guard: (isOk && isOk)"));
    }
}
