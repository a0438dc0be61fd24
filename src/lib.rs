use wasm_bindgen::prelude::*;

pub mod allocator;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod logging;
pub mod scenarios;
pub mod small_step;
pub mod state;
pub mod syntax;

pub use allocator::{AboveHighest, AllocPolicy, Allocator, LowestFree};
pub use error::{EvalError, EvalResult};
pub use evaluator::{run_big_step, BigStep};
pub use small_step::{run_small_step, step, Config, Machine};
pub use state::{Heap, Outcome, State, Store};
pub use syntax::{AExpr, Address, BExpr, Command, Ident, Nat};

/// Runs a named scenario through both evaluators with the default
/// configuration and returns the report.
#[wasm_bindgen]
pub fn run_scenario(name: &str) -> String {
    match scenarios::find(name) {
        Some(scenario) => scenario.report(&config::EngineConfig::default()),
        None => format!("unknown scenario: {name}"),
    }
}
