//! Guard Diagnostics
//!
//! This example demonstrates how denied guards are explained.
//!
//! Key concepts:
//! - Guard expressions built from `and`, `or` and `not`
//! - Traced evaluation with caret-annotated output
//! - A custom console that groups diagnostic lines
//!
//! Run with: cargo run --example guard_diagnostics

use std::cell::Cell;
use std::rc::Rc;
use switchyard::builder::{ConfigBuilder, Machine};
use switchyard::core::{Action, Definition};
use switchyard::diagnostics::Console;
use switchyard::guard::{and, not, or};

/// Prints diagnostics to stdout, indenting grouped lines.
#[derive(Default)]
struct IndentedConsole {
    depth: Cell<usize>,
}

impl Console for IndentedConsole {
    fn log(&self, line: &str) {
        let indent = "  ".repeat(self.depth.get());
        for part in line.split('\n') {
            println!("{indent}{part}");
        }
    }

    fn supports_groups(&self) -> bool {
        true
    }

    fn group(&self, label: &str) {
        self.log(label);
        self.depth.set(self.depth.get() + 1);
    }

    fn group_end(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

#[derive(Clone, Debug, Default)]
struct Player {
    ready: bool,
    stopped: bool,
    destroyed: bool,
}

fn main() {
    println!("=== Guard Diagnostics ===\n");

    let definition: Definition<String, Player> = Definition::builder("idle")
        .state("idle", |s| {
            s.on_guarded(
                "PLAY",
                "playing",
                and([or(["isReady", "isStopped"]), not("isDestroyed")]),
            )
        })
        .state("playing", |s| s.on("STOP", "idle"))
        .build();

    let config = ConfigBuilder::<Player>::new()
        .guard("isReady", |p| p.context.ready)
        .guard("isStopped", |p| p.context.stopped)
        .guard("isDestroyed", |p| p.context.destroyed)
        .verbose(true)
        .console(Rc::new(IndentedConsole::default()))
        .development(true)
        .build();

    let machine = Machine::new(definition, config).expect("definition and config agree");
    let idle = machine.initial_state();

    println!("Nothing ready yet:");
    machine.transition(&idle, Action::send("PLAY"));

    println!("\nReady but destroyed:");
    let destroyed = machine.transition(
        &idle,
        Action::set_context(|_| Player {
            ready: true,
            stopped: false,
            destroyed: true,
        }),
    );
    machine.transition(&destroyed, Action::send("PLAY"));

    println!("\nReady:");
    let ready = machine.transition(
        &idle,
        Action::set_context(|_| Player {
            ready: true,
            ..Player::default()
        }),
    );
    let playing = machine.transition(&ready, Action::send("PLAY"));
    println!("  now in '{}'", playing.value);

    println!("\n=== Example Complete ===");
}
