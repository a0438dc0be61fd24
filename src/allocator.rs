//! Fresh-address selection for `cons`.
//!
//! Any block `n, n + 1` outside the heap's domain is a valid allocation. A
//! policy fixes one such choice so that runs are reproducible.

use serde::{Deserialize, Serialize};

use crate::state::Heap;
use crate::syntax::Address;

pub trait Allocator {
    /// Returns `n < Address::MAX` such that neither `n` nor `n + 1` is in
    /// `heap`.
    fn fresh(&self, heap: &Heap) -> Address;
}

/// Smallest `n >= 1` whose two-cell block is free. Address 0 is never handed
/// out, so a pointer variable that was never assigned cannot alias a cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowestFree;

impl Allocator for LowestFree {
    fn fresh(&self, heap: &Heap) -> Address {
        let mut n: Address = 1;
        // Domain is sorted, so one pass over it finds the first gap of two.
        // Every address seen is at least `n`.
        for addr in heap.domain().filter(|addr| *addr >= 1) {
            if addr - n >= 2 {
                break;
            }
            n = addr.saturating_add(1);
        }
        n
    }
}

/// Bump allocation: one past the highest allocated cell. Falls back to
/// [`LowestFree`] once the block would run past `Address::MAX`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AboveHighest;

impl Allocator for AboveHighest {
    fn fresh(&self, heap: &Heap) -> Address {
        match heap.highest() {
            None => 1,
            Some(addr) if addr.checked_add(2).is_some() => addr + 1,
            Some(_) => LowestFree.fresh(heap),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AllocPolicy {
    #[default]
    LowestFree,
    AboveHighest,
}

impl Allocator for AllocPolicy {
    fn fresh(&self, heap: &Heap) -> Address {
        match self {
            Self::LowestFree => LowestFree.fresh(heap),
            Self::AboveHighest => AboveHighest.fresh(heap),
        }
    }
}

impl<A: Allocator + ?Sized> Allocator for &A {
    fn fresh(&self, heap: &Heap) -> Address {
        (**self).fresh(heap)
    }
}
