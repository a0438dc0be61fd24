//! Small-step reduction over configurations `(remaining command, outcome)`.
//!
//! Expressions reduce one operation at a time before a command fires. A
//! configuration carrying `Abort` collapses to `(skip, Abort)` in one step.
//! The only configurations without a successor are `(skip, _)`.

use std::fmt;

use tracing::{debug, trace};

use crate::allocator::{AllocPolicy, Allocator};
use crate::error::{EvalError, EvalResult};
use crate::expr::{step_arith, step_bool};
use crate::state::{Outcome, State};
use crate::syntax::{AExpr, BExpr, Command};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub command: Command,
    pub outcome: Outcome,
}

impl Config {
    pub fn new(command: Command, state: State) -> Self {
        Self {
            command,
            outcome: Outcome::Normal(state),
        }
    }

    pub fn aborted() -> Self {
        Self {
            command: Command::Skip,
            outcome: Outcome::Abort,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.command, Command::Skip)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} | {}>", self.command, self.outcome)
    }
}

/// The successor of `config`, or `None` if it is terminal.
pub fn step<A: Allocator + ?Sized>(config: &Config, allocator: &A) -> Option<Config> {
    match &config.outcome {
        Outcome::Abort if config.is_terminal() => None,
        Outcome::Abort => Some(Config::aborted()),
        Outcome::Normal(state) => reduce(&config.command, state, allocator),
    }
}

fn normal(command: Command, state: State) -> Config {
    Config::new(command, state)
}

fn reduce<A: Allocator + ?Sized>(command: &Command, state: &State, allocator: &A) -> Option<Config> {
    let store = &state.store;
    let heap = &state.heap;
    let next = match command {
        Command::Skip => return None,

        Command::Assign(x, AExpr::Num(n)) => normal(
            Command::Skip,
            State::new(store.update(x, *n), heap.clone()),
        ),
        Command::Assign(x, a) => normal(
            Command::Assign(x.clone(), step_arith(store, a)?),
            state.clone(),
        ),

        Command::HeapWrite(AExpr::Num(addr), AExpr::Num(n)) => {
            if !heap.contains(*addr) {
                debug!(addr, "write to unallocated address");
                return Some(Config::aborted());
            }
            normal(Command::Skip, State::new(store.clone(), heap.write(*addr, *n)))
        }
        Command::HeapWrite(addr @ AExpr::Num(_), a) => normal(
            Command::HeapWrite(addr.clone(), step_arith(store, a)?),
            state.clone(),
        ),
        Command::HeapWrite(addr, a) => normal(
            Command::HeapWrite(step_arith(store, addr)?, a.clone()),
            state.clone(),
        ),

        Command::HeapAlloc(x, AExpr::Num(n1), AExpr::Num(n2)) => {
            let n = allocator.fresh(heap);
            debug!(addr = n, "allocated block");
            normal(
                Command::Skip,
                State::new(store.update(x, n), heap.write(n, *n1).write(n + 1, *n2)),
            )
        }
        Command::HeapAlloc(x, a1 @ AExpr::Num(_), a2) => normal(
            Command::HeapAlloc(x.clone(), a1.clone(), step_arith(store, a2)?),
            state.clone(),
        ),
        Command::HeapAlloc(x, a1, a2) => normal(
            Command::HeapAlloc(x.clone(), step_arith(store, a1)?, a2.clone()),
            state.clone(),
        ),

        Command::HeapFree(AExpr::Num(addr)) => {
            if !heap.contains(*addr) {
                debug!(addr, "free of unallocated address");
                return Some(Config::aborted());
            }
            normal(Command::Skip, State::new(store.clone(), heap.free(*addr)))
        }
        Command::HeapFree(addr) => normal(Command::HeapFree(step_arith(store, addr)?), state.clone()),

        Command::Sequence(c1, c2) if matches!(**c1, Command::Skip) => normal((**c2).clone(), state.clone()),
        Command::Sequence(c1, c2) => {
            let Config { command, outcome } = reduce(c1, state, allocator)?;
            Config {
                command: Command::Sequence(Box::new(command), c2.clone()),
                outcome,
            }
        }

        Command::If(BExpr::True, then_c, _) => normal((**then_c).clone(), state.clone()),
        Command::If(BExpr::False, _, else_c) => normal((**else_c).clone(), state.clone()),
        Command::If(b, then_c, else_c) => normal(
            Command::If(step_bool(store, b)?, then_c.clone(), else_c.clone()),
            state.clone(),
        ),

        Command::While(b, body) => normal(
            Command::if_(
                b.clone(),
                Command::seq((**body).clone(), command.clone()),
                Command::Skip,
            ),
            state.clone(),
        ),
    };
    Some(next)
}

/// A small-step machine that owns its configuration. Stepping needs
/// `&mut self`, so only one caller drives it at a time.
#[derive(Debug, Clone)]
pub struct Machine<A> {
    config: Config,
    allocator: A,
    steps: u64,
}

impl<A: Allocator> Machine<A> {
    pub fn new(command: Command, state: State, allocator: A) -> Self {
        Self::from_config(Config::new(command, state), allocator)
    }

    pub fn from_config(config: Config, allocator: A) -> Self {
        Self {
            config,
            allocator,
            steps: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_terminal(&self) -> bool {
        self.config.is_terminal()
    }

    /// Takes one step. Returns `false`, leaving the machine untouched, once
    /// the configuration is terminal.
    pub fn step(&mut self) -> bool {
        match step(&self.config, &self.allocator) {
            Some(next) => {
                self.config = next;
                self.steps += 1;
                trace!(step = self.steps, config = %self.config, "small step");
                true
            }
            None => false,
        }
    }

    /// Steps until terminal, taking at most `fuel` further steps.
    pub fn run(&mut self, fuel: u64) -> EvalResult<Outcome> {
        for _ in 0..fuel {
            if !self.step() {
                break;
            }
        }
        if !self.is_terminal() {
            return Err(EvalError::OutOfFuel { limit: fuel });
        }
        debug!(steps = self.steps, abort = self.config.outcome.is_abort(), "small-step finished");
        Ok(self.config.outcome.clone())
    }
}

/// Runs `command` from `state` with the default allocator for at most `fuel`
/// steps.
pub fn run_small_step(command: &Command, state: State, fuel: u64) -> EvalResult<Outcome> {
    Machine::new(command.clone(), state, AllocPolicy::default()).run(fuel)
}
