//! Store and heap: the two halves of a program state.
//!
//! Both are immutable values. Every "mutation" returns a fresh copy, so states
//! captured at different points of an evaluation never alias.

use std::collections::BTreeMap;
use std::fmt;

use crate::syntax::{Address, Ident, Nat};

/// Total map from identifiers to naturals. Unbound identifiers read as 0.
///
/// Keys bound to the default are not stored, which keeps equality pointwise:
/// `{x ↦ 0}` and `{}` are the same store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store(BTreeMap<Ident, Nat>);

impl Store {
    pub const DEFAULT: Nat = 0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, x: &str) -> Nat {
        self.0.get(x).copied().unwrap_or(Self::DEFAULT)
    }

    pub fn update(&self, x: &str, n: Nat) -> Self {
        let mut next = self.clone();
        if n == Self::DEFAULT {
            next.0.remove(x);
        } else {
            next.0.insert(x.to_owned(), n);
        }
        next
    }

    /// Identifiers holding a non-default value, in order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, Nat)> {
        self.0.iter().map(|(x, n)| (x.as_str(), *n))
    }
}

impl<S: Into<Ident>> FromIterator<(S, Nat)> for Store {
    fn from_iter<I: IntoIterator<Item = (S, Nat)>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |store, (x, n)| {
            let x: Ident = x.into();
            store.update(&x, n)
        })
    }
}

/// Partial map from addresses to cell contents. The domain is the set of
/// currently allocated addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heap(BTreeMap<Address, Nat>);

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, addr: Address) -> Option<Nat> {
        self.0.get(&addr).copied()
    }

    pub fn contains(&self, addr: Address) -> bool {
        self.0.contains_key(&addr)
    }

    /// Sets `addr` to `n` whether or not it is allocated. Callers that must
    /// fault on dangling addresses check [`Heap::contains`] first.
    pub fn write(&self, addr: Address, n: Nat) -> Self {
        let mut next = self.clone();
        next.0.insert(addr, n);
        next
    }

    pub fn free(&self, addr: Address) -> Self {
        let mut next = self.clone();
        next.0.remove(&addr);
        next
    }

    /// Left-biased: where both heaps hold `addr`, the cell from `self` wins.
    pub fn union(&self, other: &Heap) -> Self {
        let mut next = other.clone();
        next.0.extend(self.cells());
        next
    }

    pub fn is_disjoint(&self, other: &Heap) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.domain().all(|addr| !large.contains(addr))
    }

    /// Every cell of `self` is present in `other` with the same content.
    pub fn is_subset(&self, other: &Heap) -> bool {
        self.cells().all(|(addr, n)| other.get(addr) == Some(n))
    }

    pub fn domain(&self) -> impl Iterator<Item = Address> + '_ {
        self.0.keys().copied()
    }

    pub fn cells(&self) -> impl Iterator<Item = (Address, Nat)> + '_ {
        self.0.iter().map(|(addr, n)| (*addr, *n))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn highest(&self) -> Option<Address> {
        self.0.keys().next_back().copied()
    }
}

impl FromIterator<(Address, Nat)> for Heap {
    fn from_iter<I: IntoIterator<Item = (Address, Nat)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub store: Store,
    pub heap: Heap,
}

impl State {
    pub fn new(store: Store, heap: Heap) -> Self {
        Self { store, heap }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Result of running a command. `Abort` is the memory fault: a write or free
/// of an unallocated address. Nothing runs after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Normal(State),
    Abort,
}

impl Outcome {
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Abort)
    }

    pub fn state(&self) -> Option<&State> {
        match self {
            Self::Normal(state) => Some(state),
            Self::Abort => None,
        }
    }

    pub fn into_state(self) -> Option<State> {
        match self {
            Self::Normal(state) => Some(state),
            Self::Abort => None,
        }
    }
}

impl From<State> for Outcome {
    fn from(state: State) -> Self {
        Self::Normal(state)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal(state) => write!(f, "normal: {state}"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (x, n)) in self.bindings().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x} = {n}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (addr, n)) in self.cells().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{addr} |-> {n}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store {} heap {}", self.store, self.heap)
    }
}
