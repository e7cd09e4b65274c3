//! Type-safe wrappers for KNF variables and literals.
//!
//! This module provides newtype wrappers that enforce a compile-time distinction
//! between variable IDs and signed literals, so that a literal is never
//! accidentally used where a variable index is expected (and vice versa).
use std::fmt;
use std::ops::Neg;

/// Largest variable id a DIMACS literal can carry.
pub const MAX_VAR: u32 = i32::MAX as u32;

/// A variable identifier (1-indexed).
///
/// # Invariants
///
/// - Variable IDs must be >= 1 (0 is the clause terminator in KNF/DIMACS)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// Creates a new variable with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id == 0`. Variables must be 1-indexed.
    pub fn new(id: u32) -> Self {
        assert_ne!(id, 0, "Variable IDs must be >= 1");
        Var(id)
    }

    /// Returns the raw variable ID as a `u32`.
    pub fn id(self) -> u32 {
        self.0
    }

    /// Returns the 0-based index of this variable, handy for `Vec` lookups.
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// Positive literal of this variable.
    pub fn pos(self) -> Lit {
        Lit(self.0 as i32)
    }

    /// Negative literal of this variable.
    pub fn neg(self) -> Lit {
        Lit(-(self.0 as i32))
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}

/// A signed literal in DIMACS convention: `+v` asserts variable `v`, `-v` negates it.
///
/// # Invariants
///
/// - The raw value is never 0
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit(i32);

impl Lit {
    /// Creates a literal from its DIMACS representation.
    ///
    /// # Panics
    ///
    /// Panics if `value == 0`.
    pub fn from_dimacs(value: i32) -> Self {
        assert_ne!(value, 0, "Literal must be non-zero");
        Lit(value)
    }

    /// Returns the DIMACS representation of this literal.
    pub fn to_dimacs(self) -> i32 {
        self.0
    }

    /// The underlying variable.
    pub fn var(self) -> Var {
        Var(self.0.unsigned_abs())
    }

    pub fn is_negated(self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns the literal with the same sign over another variable.
    pub fn with_var(self, var: Var) -> Self {
        if self.is_negated() {
            var.neg()
        } else {
            var.pos()
        }
    }
}

impl Neg for Lit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Lit(-self.0)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Lit> for i32 {
    fn from(lit: Lit) -> Self {
        lit.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_creation() {
        let v1 = Var::new(1);
        let v2 = Var::new(2);
        assert_eq!(v1.id(), 1);
        assert_eq!(v2.index(), 1);
        assert!(v1 < v2);
    }

    #[test]
    #[should_panic(expected = "Variable IDs must be >= 1")]
    fn test_var_zero_panics() {
        Var::new(0);
    }

    #[test]
    fn test_lit_sign() {
        let x = Lit::from_dimacs(-3);
        assert!(x.is_negated());
        assert_eq!(x.var(), Var::new(3));
        assert_eq!(-x, Var::new(3).pos());
        assert_eq!(x.to_dimacs(), -3);
    }

    #[test]
    fn test_lit_with_var() {
        let x = Lit::from_dimacs(-3);
        assert_eq!(x.with_var(Var::new(7)).to_dimacs(), -7);
        let y = Lit::from_dimacs(2);
        assert_eq!(y.with_var(Var::new(5)).to_dimacs(), 5);
    }

    #[test]
    #[should_panic(expected = "Literal must be non-zero")]
    fn test_lit_zero_panics() {
        Lit::from_dimacs(0);
    }
}
