//! Named demo programs, each with its starting state.

use lazy_static::lazy_static;

use crate::config::EngineConfig;
use crate::evaluator::BigStep;
use crate::small_step::Machine;
use crate::state::State;
use crate::syntax::{AExpr, BExpr, Command};

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub command: Command,
    pub state: State,
}

lazy_static! {
    static ref SCENARIOS: Vec<Scenario> = vec![
        Scenario {
            name: "alloc-write",
            description: "allocate a block, then overwrite its first cell",
            command: alloc_write(),
            state: State::empty(),
        },
        Scenario {
            name: "free-unbound",
            description: "free through a pointer that was never assigned",
            command: Command::free(AExpr::id("x")),
            state: State::empty(),
        },
        Scenario {
            name: "count-to-four",
            description: "loop until x exceeds 3",
            command: count_to_four(),
            state: State::empty(),
        },
        Scenario {
            name: "double-free",
            description: "free the same address twice",
            command: double_free(),
            state: State::empty(),
        },
        Scenario {
            name: "abort-before-assign",
            description: "a fault stops the assignment that follows it",
            command: Command::seq(Command::free(AExpr::id("x")), Command::assign("x", 100)),
            state: State::empty(),
        },
        Scenario {
            name: "use-after-free",
            description: "write through a pointer after freeing it",
            command: Command::block([
                Command::alloc("p", 1, 2),
                Command::free(AExpr::id("p")),
                Command::write(AExpr::id("p"), 3),
            ]),
            state: State::empty(),
        },
        Scenario {
            name: "partial-free",
            description: "free the second cell of a block and keep using the first",
            command: Command::block([
                Command::alloc("p", 1, 2),
                Command::free(AExpr::plus(AExpr::id("p"), AExpr::Num(1))),
                Command::write(AExpr::id("p"), 7),
            ]),
            state: State::empty(),
        },
        Scenario {
            name: "alloc-loop",
            description: "allocate in a loop, keeping only each block's second cell",
            command: alloc_loop(),
            state: State::empty(),
        },
    ];
}

fn alloc_write() -> Command {
    Command::seq(Command::alloc("x", 1, 2), Command::write(AExpr::id("x"), 9))
}

fn count_to_four() -> Command {
    Command::seq(
        Command::assign("x", 0),
        Command::while_(
            BExpr::Le(AExpr::id("x"), AExpr::Num(3)),
            Command::assign("x", AExpr::plus(AExpr::id("x"), AExpr::Num(1))),
        ),
    )
}

fn double_free() -> Command {
    Command::block([
        Command::alloc("x", 5, 5),
        Command::free(AExpr::id("x")),
        Command::free(AExpr::id("x")),
    ])
}

fn alloc_loop() -> Command {
    let i = || AExpr::id("i");
    let p = || AExpr::id("p");
    Command::seq(
        Command::assign("i", 0),
        Command::while_(
            BExpr::Le(i(), AExpr::Num(2)),
            Command::block([
                Command::alloc("p", i(), AExpr::mult(i(), i())),
                Command::write(AExpr::plus(p(), AExpr::Num(1)), AExpr::plus(i(), AExpr::Num(10))),
                Command::free(p()),
                Command::assign("i", AExpr::plus(i(), AExpr::Num(1))),
            ]),
        ),
    )
}

pub fn all() -> &'static [Scenario] {
    &SCENARIOS
}

pub fn find(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|scenario| scenario.name == name)
}

impl Scenario {
    /// Runs the scenario through both evaluators and describes the results.
    pub fn report(&self, config: &EngineConfig) -> String {
        let big = BigStep::new(config.allocator)
            .with_fuel(config.big_step_fuel)
            .eval(&self.command, self.state.clone());
        let mut machine = Machine::new(self.command.clone(), self.state.clone(), config.allocator);
        let small = machine.run(config.small_step_fuel);

        let mut lines = vec![
            format!("{}: {}", self.name, self.description),
            format!("program: {}", self.command),
            format!("initial: {}", self.state),
        ];
        lines.push(match &big {
            Ok(outcome) => format!("big-step: {outcome}"),
            Err(err) => format!("big-step: {err}"),
        });
        lines.push(match &small {
            Ok(outcome) => format!("small-step: {outcome} ({} steps)", machine.steps()),
            Err(err) => format!("small-step: {err}"),
        });
        let verdict = match (big, small) {
            (Ok(b), Ok(s)) if b == s => "agree",
            (Ok(_), Ok(_)) => "DISAGREE",
            _ => "inconclusive",
        };
        lines.push(format!("evaluators: {verdict}"));
        lines.join("\n")
    }
}
