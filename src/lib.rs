//! Switchyard: a small finite state machine engine
//!
//! Switchyard keeps a pure core and an imperative shell. Transitions are
//! computed by a pure function of `(definition, config, state, action)`;
//! entry effects, their cleanups and the scheduling of effect-triggered
//! transitions live in a thin layer around it.
//!
//! # Core Concepts
//!
//! - **Definition**: a static table of states, event transitions and entry
//!   effects, plus machine-wide fallback transitions and the initial context
//! - **Guards**: boolean formulas over named predicates (`and`, `or`, `not`)
//!   deciding whether a transition is taken
//! - **Diagnostics**: rejected events, denied guards and effect misuse are
//!   logged through an injectable console, never returned as errors
//! - **Sync mode**: effects may only `send` while they are running, so every
//!   transition settles before control returns to the caller
//!
//! # Example
//!
//! ```rust
//! use switchyard::builder::{ConfigBuilder, Machine};
//! use switchyard::core::{Action, Definition};
//! use switchyard::guard::and;
//!
//! let definition: Definition<String, u32> = Definition::builder("idle")
//!     .state("idle", |s| s.on("FETCH", "loading"))
//!     .state("loading", |s| {
//!         s.on("RESOLVE", "idle")
//!             .on_guarded("RETRY", "loading", and(["isOnline", "hasBudget"]))
//!     })
//!     .build();
//! let config = ConfigBuilder::<u32>::new()
//!     .guard("isOnline", |_| true)
//!     .guard("hasBudget", |p| *p.context < 3)
//!     .build();
//! let machine = Machine::new(definition, config).unwrap();
//!
//! let state = machine.transition(&machine.initial_state(), Action::send("FETCH"));
//! assert_eq!(state.value, "loading");
//! assert_eq!(state.next_events, ["RESOLVE", "RETRY"]);
//! assert!(state.can("RETRY"));
//! ```

pub mod builder;
pub mod core;
pub mod diagnostics;
pub mod dispatch;
pub mod effects;
pub mod guard;

// Re-export commonly used types
pub use crate::builder::{BuildError, ConfigBuilder, Machine};
pub use crate::core::{Action, Config, Definition, Event, MachineState, State};
pub use crate::dispatch::{apply_dispatch, create_initial_state};
pub use crate::effects::{apply_effect, SharedMachine, SyncedMachine};
pub use crate::guard::{and, leaf, not, or, GuardExpr};
