//! Big-step evaluation: a command and a state straight to an outcome.

use tracing::{debug, trace};

use crate::allocator::{AllocPolicy, Allocator};
use crate::error::{EvalError, EvalResult};
use crate::expr::{eval_arith, eval_bool};
use crate::state::{Outcome, State};
use crate::syntax::Command;

/// Runs `cmd` to completion with the default allocator. Does not return if
/// `cmd` diverges; use [`BigStep::with_fuel`] for a bounded run.
pub fn run_big_step(cmd: &Command, state: State) -> Outcome {
    match BigStep::new(AllocPolicy::default()).eval(cmd, state) {
        Ok(outcome) => outcome,
        Err(EvalError::OutOfFuel { .. }) => unreachable!("unbounded run cannot exhaust fuel"),
    }
}

#[derive(Debug, Clone)]
pub struct BigStep<A> {
    allocator: A,
    fuel: Option<u64>,
}

/// Fuel tracker for one evaluation. Every rule application burns one unit.
struct Fuel {
    limit: Option<u64>,
    used: u64,
}

impl Fuel {
    fn burn(&mut self) -> EvalResult<()> {
        if let Some(limit) = self.limit {
            if self.used >= limit {
                return Err(EvalError::OutOfFuel { limit });
            }
        }
        self.used += 1;
        Ok(())
    }
}

impl<A: Allocator> BigStep<A> {
    pub fn new(allocator: A) -> Self {
        Self {
            allocator,
            fuel: None,
        }
    }

    pub fn with_fuel(mut self, limit: u64) -> Self {
        self.fuel = Some(limit);
        self
    }

    pub fn eval(&self, cmd: &Command, state: State) -> EvalResult<Outcome> {
        let mut fuel = Fuel {
            limit: self.fuel,
            used: 0,
        };
        let outcome = self.eval_cmd(cmd, state, &mut fuel)?;
        debug!(rules = fuel.used, abort = outcome.is_abort(), "big-step finished");
        Ok(outcome)
    }

    fn eval_cmd(&self, cmd: &Command, state: State, fuel: &mut Fuel) -> EvalResult<Outcome> {
        fuel.burn()?;
        let State { store, heap } = state;
        match cmd {
            Command::Skip => Ok(Outcome::Normal(State { store, heap })),
            Command::Assign(x, a) => {
                let n = eval_arith(&store, a);
                Ok(Outcome::Normal(State {
                    store: store.update(x, n),
                    heap,
                }))
            }
            Command::HeapWrite(addr, a) => {
                let addr = eval_arith(&store, addr);
                if !heap.contains(addr) {
                    debug!(addr, "write to unallocated address");
                    return Ok(Outcome::Abort);
                }
                let n = eval_arith(&store, a);
                Ok(Outcome::Normal(State {
                    heap: heap.write(addr, n),
                    store,
                }))
            }
            Command::HeapAlloc(x, a1, a2) => {
                let n = self.allocator.fresh(&heap);
                debug!(addr = n, "allocated block");
                let heap = heap
                    .write(n, eval_arith(&store, a1))
                    .write(n + 1, eval_arith(&store, a2));
                Ok(Outcome::Normal(State {
                    store: store.update(x, n),
                    heap,
                }))
            }
            Command::HeapFree(addr) => {
                let addr = eval_arith(&store, addr);
                if !heap.contains(addr) {
                    debug!(addr, "free of unallocated address");
                    return Ok(Outcome::Abort);
                }
                Ok(Outcome::Normal(State {
                    heap: heap.free(addr),
                    store,
                }))
            }
            Command::Sequence(c1, c2) => match self.eval_cmd(c1, State { store, heap }, fuel)? {
                Outcome::Normal(state) => self.eval_cmd(c2, state, fuel),
                Outcome::Abort => Ok(Outcome::Abort),
            },
            Command::If(b, then_c, else_c) => {
                let branch = if eval_bool(&store, b) { then_c } else { else_c };
                self.eval_cmd(branch, State { store, heap }, fuel)
            }
            Command::While(b, body) => {
                let mut state = State { store, heap };
                let mut iterations = 0u64;
                // Each pass is one more application of the loop rule.
                while eval_bool(&state.store, b) {
                    match self.eval_cmd(body, state, fuel)? {
                        Outcome::Normal(next) => state = next,
                        Outcome::Abort => return Ok(Outcome::Abort),
                    }
                    iterations += 1;
                    trace!(iterations, "loop iteration");
                    fuel.burn()?;
                }
                Ok(Outcome::Normal(state))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{AboveHighest, LowestFree};
    use crate::state::{Heap, Store};
    use crate::syntax::{AExpr, Address, BExpr};

    /// Lowest free block at or above a fixed base, to show results do not
    /// depend on one particular address.
    struct From100;

    impl Allocator for From100 {
        fn fresh(&self, heap: &Heap) -> Address {
            (100..).find(|n| !heap.contains(*n) && !heap.contains(n + 1)).unwrap()
        }
    }

    fn eval(cmd: &Command) -> Outcome {
        BigStep::new(LowestFree)
            .with_fuel(10_000)
            .eval(cmd, State::empty())
            .unwrap()
    }

    fn normal(outcome: Outcome) -> State {
        outcome.into_state().expect("expected a normal outcome")
    }

    #[test]
    fn test_skip_keeps_state() {
        let state = State::new(Store::new().update("x", 3), [(1, 1)].into_iter().collect());
        let outcome = BigStep::new(LowestFree).eval(&Command::Skip, state.clone()).unwrap();
        assert_eq!(outcome, Outcome::Normal(state));
    }

    #[test]
    fn test_multiple_stores() {
        let program = Command::seq(Command::assign("x", 1), Command::assign("y", 2));
        let state = normal(eval(&program));
        assert_eq!(state.store.get("x"), 1);
        assert_eq!(state.store.get("y"), 2);
        assert!(state.heap.is_empty());
    }

    #[test]
    fn test_alloc_then_write() {
        let allocators: [&dyn Allocator; 3] = [&LowestFree, &AboveHighest, &From100];
        for allocator in allocators {
            let program = Command::seq(Command::alloc("x", 1, 2), Command::write(AExpr::id("x"), 9));
            let state = normal(BigStep::new(allocator).eval(&program, State::empty()).unwrap());
            let n = state.store.get("x");
            assert_eq!(state.heap.get(n), Some(9));
            assert_eq!(state.heap.get(n + 1), Some(2));
            assert_eq!(state.heap.len(), 2);
        }
    }

    #[test]
    fn test_alloc_picks_fresh_block() {
        let heap: Heap = [(100, 7), (101, 8), (103, 9)].into_iter().collect();
        let state = State::new(Store::new(), heap.clone());
        let program = Command::alloc("p", 3, 4);
        let after = normal(BigStep::new(From100).eval(&program, state).unwrap());
        let n = after.store.get("p");
        assert!(!heap.contains(n) && !heap.contains(n + 1));
        assert!(heap.is_subset(&after.heap));
        assert_eq!(after.heap.get(n), Some(3));
        assert_eq!(after.heap.get(n + 1), Some(4));
    }

    #[test]
    fn test_alloc_near_top_of_address_space() {
        let heap: Heap = [(Address::MAX - 1, 1)].into_iter().collect();
        let state = State::new(Store::new(), heap.clone());
        let after = normal(
            BigStep::new(AboveHighest)
                .eval(&Command::alloc("x", 1, 2), state)
                .unwrap(),
        );
        let n = after.store.get("x");
        assert!(!heap.contains(n) && !heap.contains(n + 1));
        assert_eq!(after.heap.get(n), Some(1));
        assert_eq!(after.heap.get(n + 1), Some(2));
        assert_eq!(after.heap.get(Address::MAX - 1), Some(1));
    }

    #[test]
    fn test_free_unbound_aborts() {
        assert_eq!(eval(&Command::free(AExpr::id("x"))), Outcome::Abort);
    }

    #[test]
    fn test_write_unallocated_aborts() {
        assert_eq!(eval(&Command::write(42, 1)), Outcome::Abort);
    }

    #[test]
    fn test_counting_loop() {
        let program = Command::seq(
            Command::assign("x", 0),
            Command::while_(
                BExpr::Le(AExpr::id("x"), AExpr::Num(3)),
                Command::assign("x", AExpr::plus(AExpr::id("x"), AExpr::Num(1))),
            ),
        );
        assert_eq!(normal(eval(&program)).store.get("x"), 4);
    }

    #[test]
    fn test_false_loop_is_noop() {
        let state = State::new(Store::new().update("y", 2), Heap::new());
        let program = Command::while_(BExpr::False, Command::free(0));
        let outcome = BigStep::new(LowestFree).eval(&program, state.clone()).unwrap();
        assert_eq!(outcome, Outcome::Normal(state));
    }

    #[test]
    fn test_double_free_aborts() {
        let program = Command::block([
            Command::alloc("x", 5, 5),
            Command::free(AExpr::id("x")),
            Command::free(AExpr::id("x")),
        ]);
        assert_eq!(eval(&program), Outcome::Abort);

        let single = Command::seq(Command::alloc("x", 5, 5), Command::free(AExpr::id("x")));
        let state = normal(eval(&single));
        let n = state.store.get("x");
        assert!(!state.heap.contains(n));
        assert!(state.heap.contains(n + 1));
    }

    #[test]
    fn test_abort_skips_rest_of_sequence() {
        let program = Command::seq(Command::free(AExpr::id("x")), Command::assign("x", 100));
        assert_eq!(eval(&program), Outcome::Abort);

        let diverging = Command::seq(
            Command::free(AExpr::id("x")),
            Command::while_(BExpr::True, Command::Skip),
        );
        assert_eq!(eval(&diverging), Outcome::Abort);
    }

    #[test]
    fn test_abort_escapes_loop() {
        let program = Command::seq(
            Command::assign("i", 3),
            Command::while_(
                BExpr::not(BExpr::Eq(AExpr::id("i"), AExpr::Num(0))),
                Command::seq(
                    Command::assign("i", AExpr::minus(AExpr::id("i"), AExpr::Num(1))),
                    Command::if_(
                        BExpr::Eq(AExpr::id("i"), AExpr::Num(1)),
                        Command::free(77),
                        Command::Skip,
                    ),
                ),
            ),
        );
        assert_eq!(eval(&program), Outcome::Abort);
    }

    #[test]
    fn test_conditional_heap() {
        let program = Command::block([
            Command::alloc("x", 1, 0),
            Command::if_(
                BExpr::Le(AExpr::id("x"), AExpr::Num(0)),
                Command::free(AExpr::id("x")),
                Command::write(AExpr::plus(AExpr::id("x"), AExpr::Num(1)), 4),
            ),
        ]);
        let state = normal(eval(&program));
        let n = state.store.get("x");
        assert_eq!(state.heap.get(n), Some(1));
        assert_eq!(state.heap.get(n + 1), Some(4));
    }

    #[test]
    fn test_deterministic() {
        let program = Command::block([
            Command::alloc("p", 1, 2),
            Command::alloc("q", 3, 4),
            Command::free(AExpr::id("p")),
            Command::alloc("r", 5, 6),
        ]);
        let evaluator = BigStep::new(AllocPolicy::LowestFree);
        let first = evaluator.eval(&program, State::empty()).unwrap();
        let second = evaluator.eval(&program, State::empty()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_divergence_runs_out_of_fuel() {
        let program = Command::while_(BExpr::True, Command::Skip);
        let result = BigStep::new(LowestFree).with_fuel(50).eval(&program, State::empty());
        assert_eq!(result, Err(EvalError::OutOfFuel { limit: 50 }));
    }

    #[test]
    fn test_run_big_step_uses_default_policy() {
        let program = Command::seq(Command::alloc("a", 0, 0), Command::alloc("b", 0, 0));
        let state = normal(run_big_step(&program, State::empty()));
        assert_eq!(state.store.get("a"), 1);
        assert_eq!(state.store.get("b"), 3);
    }
}
