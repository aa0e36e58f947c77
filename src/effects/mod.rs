//! Entry effects and the runtimes that drive them.
//!
//! This module is the imperative shell around the pure dispatcher:
//!
//! - **Runner**: [`apply_effect`] runs a state's entry effects and returns
//!   the cleanup to call on exit
//! - **Sync scheduler**: [`SyncedMachine`] queues actions and settles every
//!   transition, including those triggered from effects, before returning
//! - **Shared machine**: [`SharedMachine`] applies actions immediately and
//!   notifies subscribed observers
//!
//! # Sync mode
//!
//! Effects receive `send`/`set_context` through an [`EffectHandle`]. In sync
//! mode the handle only accepts calls while the effect or its cleanup is
//! running; anything deferred to a timer or a task is rejected and logged.

mod runner;
mod scheduler;
mod shared;

pub use runner::{
    apply_effect, cleanup, Cleanup, CleanupParams, Dispatch, EffectCleanup, EffectHandle,
    EffectParams, MountFlag,
};
pub use scheduler::{Reducer, SyncedMachine};
pub use shared::{SharedMachine, Subscription};
