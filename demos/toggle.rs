//! Toggle Machine
//!
//! This example demonstrates a synced machine with entry effects.
//!
//! Key concepts:
//! - Enum state values via `state_enum!`
//! - Entry effects with cleanups
//! - Effects that send events synchronously
//! - Context updates chained with a send
//!
//! Run with: cargo run --example toggle

use switchyard::builder::{ConfigBuilder, Machine};
use switchyard::core::Definition;
use switchyard::effects::cleanup;
use switchyard::state_enum;

state_enum! {
    enum Switch {
        Off,
        On,
        Broken,
    }
}

fn main() {
    println!("=== Toggle Machine ===\n");

    let definition: Definition<Switch, u32> = Definition::builder(Switch::Off)
        .state(Switch::Off, |s| s.on("TOGGLE", Switch::On).effect("onOff"))
        .state(Switch::On, |s| s.on("TOGGLE", Switch::Off).effect("onOn"))
        .state(Switch::Broken, |s| s)
        .on("BREAK", Switch::Broken)
        .build();

    let config = ConfigBuilder::<u32>::new()
        .effect("onOff", |params| {
            println!("  entered Off via {}", params.event.kind());
            None
        })
        .effect("onOn", |params| {
            println!("  entered On via {} (flips: {})", params.event.kind(), params.context);
            if params.context >= 2 {
                params.set_context(|flips| flips + 1).send("BREAK");
            } else {
                params.set_context(|flips| flips + 1);
            }
            cleanup(|exit| println!("  left On via {}", exit.event.kind()))
        })
        .verbose(false)
        .build();

    let machine = Machine::new(definition, config)
        .expect("definition and config agree")
        .into_synced();

    machine.start();
    for _ in 0..4 {
        machine.send("TOGGLE");
        let state = machine.state();
        println!("-> {:?}, next events {:?}\n", state.value, state.next_events);
    }

    println!("Final context: {}", machine.state().context);
    machine.stop();

    println!("\n=== Example Complete ===");
}
