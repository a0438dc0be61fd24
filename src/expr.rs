//! Pure expression evaluation over the store.
//!
//! Expressions never read the heap and never fail: subtraction stops at 0,
//! addition and multiplication stop at `Nat::MAX`, and unbound identifiers
//! read the store default.

use crate::state::Store;
use crate::syntax::{AExpr, BExpr, Nat};

pub fn eval_arith(store: &Store, a: &AExpr) -> Nat {
    match a {
        AExpr::Num(n) => *n,
        AExpr::Id(x) => store.get(x),
        AExpr::Plus(a1, a2) => eval_arith(store, a1).saturating_add(eval_arith(store, a2)),
        AExpr::Minus(a1, a2) => eval_arith(store, a1).saturating_sub(eval_arith(store, a2)),
        AExpr::Mult(a1, a2) => eval_arith(store, a1).saturating_mul(eval_arith(store, a2)),
    }
}

pub fn eval_bool(store: &Store, b: &BExpr) -> bool {
    match b {
        BExpr::True => true,
        BExpr::False => false,
        BExpr::Eq(a1, a2) => eval_arith(store, a1) == eval_arith(store, a2),
        BExpr::Le(a1, a2) => eval_arith(store, a1) <= eval_arith(store, a2),
        BExpr::Not(b) => !eval_bool(store, b),
        BExpr::And(b1, b2) => eval_bool(store, b1) && eval_bool(store, b2),
    }
}

impl AExpr {
    pub fn as_num(&self) -> Option<Nat> {
        match self {
            Self::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        self.as_num().is_some()
    }
}

impl BExpr {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        self.as_bool().is_some()
    }
}

/// One leftmost reduction of `a`, or `None` when `a` is already a literal.
pub fn step_arith(store: &Store, a: &AExpr) -> Option<AExpr> {
    let reduced = match a {
        AExpr::Num(_) => return None,
        AExpr::Id(x) => AExpr::Num(store.get(x)),
        AExpr::Plus(a1, a2) => step_operands(store, a1, a2, AExpr::Plus, Nat::saturating_add),
        AExpr::Minus(a1, a2) => step_operands(store, a1, a2, AExpr::Minus, Nat::saturating_sub),
        AExpr::Mult(a1, a2) => step_operands(store, a1, a2, AExpr::Mult, Nat::saturating_mul),
    };
    Some(reduced)
}

fn step_operands(
    store: &Store,
    a1: &AExpr,
    a2: &AExpr,
    rebuild: fn(Box<AExpr>, Box<AExpr>) -> AExpr,
    op: fn(Nat, Nat) -> Nat,
) -> AExpr {
    match (a1.as_num(), a2.as_num()) {
        (Some(n1), Some(n2)) => AExpr::Num(op(n1, n2)),
        (Some(_), None) => rebuild(Box::new(a1.clone()), Box::new(reduce(store, a2))),
        (None, _) => rebuild(Box::new(reduce(store, a1)), Box::new(a2.clone())),
    }
}

// Only called on non-literals, where a step always exists.
fn reduce(store: &Store, a: &AExpr) -> AExpr {
    step_arith(store, a).unwrap_or_else(|| a.clone())
}

/// One leftmost reduction of `b`, or `None` when `b` is already a literal.
pub fn step_bool(store: &Store, b: &BExpr) -> Option<BExpr> {
    let reduced = match b {
        BExpr::True | BExpr::False => return None,
        BExpr::Eq(a1, a2) => compare(store, a1, a2, BExpr::Eq, |n1, n2| n1 == n2),
        BExpr::Le(a1, a2) => compare(store, a1, a2, BExpr::Le, |n1, n2| n1 <= n2),
        BExpr::Not(inner) => match (inner.as_bool(), step_bool(store, inner)) {
            (Some(v), _) => BExpr::from(!v),
            (None, Some(next)) => BExpr::not(next),
            (None, None) => unreachable!("non-literal boolean always steps"),
        },
        BExpr::And(b1, b2) => match (b1.as_bool(), step_bool(store, b1)) {
            (Some(true), _) => (**b2).clone(),
            (Some(false), _) => BExpr::False,
            (None, Some(next)) => BExpr::and(next, (**b2).clone()),
            (None, None) => unreachable!("non-literal boolean always steps"),
        },
    };
    Some(reduced)
}

fn compare(
    store: &Store,
    a1: &AExpr,
    a2: &AExpr,
    rebuild: fn(AExpr, AExpr) -> BExpr,
    op: fn(Nat, Nat) -> bool,
) -> BExpr {
    match (a1.as_num(), a2.as_num()) {
        (Some(n1), Some(n2)) => BExpr::from(op(n1, n2)),
        (Some(_), None) => rebuild(a1.clone(), reduce(store, a2)),
        (None, _) => rebuild(reduce(store, a1), a2.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize_arith(store: &Store, a: &AExpr) -> (AExpr, usize) {
        let mut a = a.clone();
        let mut steps = 0;
        while let Some(next) = step_arith(store, &a) {
            a = next;
            steps += 1;
        }
        (a, steps)
    }

    fn normalize_bool(store: &Store, b: &BExpr) -> BExpr {
        let mut b = b.clone();
        while let Some(next) = step_bool(store, &b) {
            b = next;
        }
        b
    }

    #[test]
    fn unbound_identifiers_read_zero() {
        assert_eq!(eval_arith(&Store::new(), &AExpr::id("nope")), 0);
    }

    #[test]
    fn subtraction_saturates() {
        let store = Store::new().update("x", 3);
        let a = AExpr::minus(AExpr::id("x"), AExpr::Num(10));
        assert_eq!(eval_arith(&store, &a), 0);
    }

    #[test]
    fn addition_saturates() {
        let a = AExpr::plus(AExpr::Num(Nat::MAX), AExpr::Num(1));
        assert_eq!(eval_arith(&Store::new(), &a), Nat::MAX);
        let a = AExpr::mult(AExpr::Num(Nat::MAX), AExpr::Num(2));
        assert_eq!(eval_arith(&Store::new(), &a), Nat::MAX);
    }

    #[test]
    fn booleans_follow_store() {
        let store = Store::new().update("x", 4);
        let b = BExpr::and(
            BExpr::Le(AExpr::Num(3), AExpr::id("x")),
            BExpr::not(BExpr::Eq(AExpr::id("x"), AExpr::Num(5))),
        );
        assert!(eval_bool(&store, &b));
        assert!(!eval_bool(&store.update("x", 5), &b));
    }

    #[test]
    fn arith_steps_leftmost_first() {
        let store = Store::new().update("x", 2).update("y", 3);
        let a = AExpr::plus(AExpr::id("x"), AExpr::id("y"));
        let first = step_arith(&store, &a).unwrap();
        assert_eq!(first, AExpr::plus(AExpr::Num(2), AExpr::id("y")));
        let second = step_arith(&store, &first).unwrap();
        assert_eq!(second, AExpr::plus(AExpr::Num(2), AExpr::Num(3)));
        assert_eq!(step_arith(&store, &second), Some(AExpr::Num(5)));
        assert_eq!(step_arith(&store, &AExpr::Num(5)), None);
    }

    #[test]
    fn arith_steps_reach_eval() {
        let store = Store::new().update("x", 7).update("y", 2);
        let a = AExpr::mult(
            AExpr::minus(AExpr::id("x"), AExpr::id("y")),
            AExpr::plus(AExpr::Num(1), AExpr::id("z")),
        );
        let (value, steps) = normalize_arith(&store, &a);
        assert_eq!(value, AExpr::Num(eval_arith(&store, &a)));
        assert_eq!(steps, 6);
    }

    #[test]
    fn and_short_circuits_in_steps() {
        let store = Store::new();
        let b = BExpr::and(BExpr::False, BExpr::Le(AExpr::id("x"), AExpr::Num(1)));
        assert_eq!(step_bool(&store, &b), Some(BExpr::False));

        let b = BExpr::and(BExpr::True, BExpr::Eq(AExpr::id("x"), AExpr::Num(0)));
        assert_eq!(
            step_bool(&store, &b),
            Some(BExpr::Eq(AExpr::id("x"), AExpr::Num(0)))
        );
    }

    #[test]
    fn bool_steps_reach_eval() {
        let store = Store::new().update("x", 1);
        let b = BExpr::not(BExpr::and(
            BExpr::Le(AExpr::id("x"), AExpr::Num(3)),
            BExpr::Eq(AExpr::plus(AExpr::id("x"), AExpr::Num(1)), AExpr::Num(2)),
        ));
        assert_eq!(normalize_bool(&store, &b), BExpr::from(eval_bool(&store, &b)));
    }
}
