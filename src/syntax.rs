use std::fmt;

pub type Ident = String;
pub type Nat = u64;
pub type Address = Nat;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AExpr {
    Num(Nat),
    Id(Ident),
    Plus(Box<AExpr>, Box<AExpr>),
    Minus(Box<AExpr>, Box<AExpr>),
    Mult(Box<AExpr>, Box<AExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BExpr {
    True,
    False,
    Eq(AExpr, AExpr),
    Le(AExpr, AExpr),
    Not(Box<BExpr>),
    And(Box<BExpr>, Box<BExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    Skip,
    Assign(Ident, AExpr),
    /// `[addr] := value`
    HeapWrite(AExpr, AExpr),
    /// `x := cons(a1, a2)`, two contiguous cells
    HeapAlloc(Ident, AExpr, AExpr),
    HeapFree(AExpr),
    Sequence(Box<Command>, Box<Command>),
    If(BExpr, Box<Command>, Box<Command>),
    While(BExpr, Box<Command>),
}

impl AExpr {
    pub fn id(x: &str) -> Self {
        Self::Id(x.to_owned())
    }

    pub fn plus(a1: AExpr, a2: AExpr) -> Self {
        Self::Plus(Box::new(a1), Box::new(a2))
    }

    pub fn minus(a1: AExpr, a2: AExpr) -> Self {
        Self::Minus(Box::new(a1), Box::new(a2))
    }

    pub fn mult(a1: AExpr, a2: AExpr) -> Self {
        Self::Mult(Box::new(a1), Box::new(a2))
    }
}

impl From<Nat> for AExpr {
    fn from(n: Nat) -> Self {
        Self::Num(n)
    }
}

impl BExpr {
    pub fn not(b: BExpr) -> Self {
        Self::Not(Box::new(b))
    }

    pub fn and(b1: BExpr, b2: BExpr) -> Self {
        Self::And(Box::new(b1), Box::new(b2))
    }
}

impl From<bool> for BExpr {
    fn from(b: bool) -> Self {
        if b {
            Self::True
        } else {
            Self::False
        }
    }
}

impl Command {
    pub fn assign(x: &str, a: impl Into<AExpr>) -> Self {
        Self::Assign(x.to_owned(), a.into())
    }

    pub fn write(addr: impl Into<AExpr>, value: impl Into<AExpr>) -> Self {
        Self::HeapWrite(addr.into(), value.into())
    }

    pub fn alloc(x: &str, a1: impl Into<AExpr>, a2: impl Into<AExpr>) -> Self {
        Self::HeapAlloc(x.to_owned(), a1.into(), a2.into())
    }

    pub fn free(addr: impl Into<AExpr>) -> Self {
        Self::HeapFree(addr.into())
    }

    pub fn seq(c1: Command, c2: Command) -> Self {
        Self::Sequence(Box::new(c1), Box::new(c2))
    }

    pub fn if_(b: BExpr, then_c: Command, else_c: Command) -> Self {
        Self::If(b, Box::new(then_c), Box::new(else_c))
    }

    pub fn while_(b: BExpr, body: Command) -> Self {
        Self::While(b, Box::new(body))
    }

    /// Right-nested sequence of `commands`; `Skip` when empty.
    pub fn block(commands: impl IntoIterator<Item = Command>) -> Self {
        let mut commands: Vec<_> = commands.into_iter().collect();
        let Some(last) = commands.pop() else {
            return Self::Skip;
        };
        commands
            .into_iter()
            .rev()
            .fold(last, |acc, next| Self::seq(next, acc))
    }

    /// Number of primitive commands, the way a reader would count statements.
    pub fn size(&self) -> usize {
        match self {
            Self::Skip
            | Self::Assign(..)
            | Self::HeapWrite(..)
            | Self::HeapAlloc(..)
            | Self::HeapFree(..) => 1,
            Self::Sequence(c1, c2) | Self::If(_, c1, c2) => c1.size() + c2.size(),
            Self::While(_, body) => body.size() + 1,
        }
    }
}

impl fmt::Display for AExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Id(x) => write!(f, "{x}"),
            Self::Plus(a1, a2) => write!(f, "({a1} + {a2})"),
            Self::Minus(a1, a2) => write!(f, "({a1} - {a2})"),
            Self::Mult(a1, a2) => write!(f, "({a1} * {a2})"),
        }
    }
}

impl fmt::Display for BExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Eq(a1, a2) => write!(f, "{a1} = {a2}"),
            Self::Le(a1, a2) => write!(f, "{a1} <= {a2}"),
            Self::Not(b) => write!(f, "~({b})"),
            Self::And(b1, b2) => write!(f, "({b1} && {b2})"),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Assign(x, a) => write!(f, "{x} := {a}"),
            Self::HeapWrite(addr, a) => write!(f, "[{addr}] := {a}"),
            Self::HeapAlloc(x, a1, a2) => write!(f, "{x} := cons({a1}, {a2})"),
            Self::HeapFree(addr) => write!(f, "dispose({addr})"),
            Self::Sequence(c1, c2) => write!(f, "{c1}; {c2}"),
            Self::If(b, c1, c2) => write!(f, "if {b} then {c1} else {c2} end"),
            Self::While(b, body) => write!(f, "while {b} do {body} end"),
        }
    }
}
