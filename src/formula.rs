//! In-memory model of a KNF formula: plain clauses plus cardinality constraints.

use std::collections::BTreeSet;

use crate::types::{Lit, Var};

/// A disjunction of literals.
pub type Clause = Vec<Lit>;

/// "At least `bound` of `lits` are true".
///
/// Literals are kept exactly as they appear in the source, duplicates included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardinalityConstraint {
    pub bound: u32,
    pub lits: Vec<Lit>,
}

impl CardinalityConstraint {
    pub fn new(bound: u32, lits: Vec<Lit>) -> Self {
        Self { bound, lits }
    }

    /// Whether this constraint is just a clause in disguise.
    pub fn is_clause(&self) -> bool {
        self.bound == 1
    }

    pub fn vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.lits.iter().map(|lit| lit.var())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formula {
    /// Declared number of variables; every literal's variable is in `1..=num_vars`.
    pub num_vars: u32,
    /// Number of clauses declared in the header (informational only).
    pub declared_clauses: usize,
    pub clauses: Vec<Clause>,
    pub constraints: Vec<CardinalityConstraint>,
}

impl Formula {
    pub fn new(num_vars: u32) -> Self {
        Self {
            num_vars,
            ..Default::default()
        }
    }

    pub fn add_clause(&mut self, clause: impl IntoIterator<Item = i32>) {
        self.clauses.push(clause.into_iter().map(Lit::from_dimacs).collect());
    }

    pub fn add_constraint(&mut self, bound: u32, lits: impl IntoIterator<Item = i32>) {
        let lits = lits.into_iter().map(Lit::from_dimacs).collect();
        self.constraints.push(CardinalityConstraint::new(bound, lits));
    }

    /// All variables `1..=num_vars`, in natural order.
    pub fn variables(&self) -> impl Iterator<Item = Var> {
        (1..=self.num_vars).map(Var::new)
    }

    /// Variables occurring in at least one cardinality constraint, deduplicated and sorted by id.
    pub fn constrained_vars(&self) -> Vec<Var> {
        let set: BTreeSet<Var> = self.constraints.iter().flat_map(|c| c.vars()).collect();
        set.into_iter().collect()
    }

    /// Number of literal occurrences of each variable in the standard clauses.
    ///
    /// Indexed by [`Var::index`].
    pub fn clause_occurrences(&self) -> Vec<u64> {
        let mut counts = vec![0; self.num_vars as usize];
        for lit in self.clauses.iter().flatten() {
            counts[lit.var().index()] += 1;
        }
        counts
    }

    /// Clause occurrences plus, for each constraint a variable appears in, that constraint's bound.
    ///
    /// The bound is a crude stand-in for how often the variable would occur in the encoding.
    pub fn weighted_occurrences(&self) -> Vec<u64> {
        let mut counts = self.clause_occurrences();
        for constraint in &self.constraints {
            for var in constraint.vars() {
                counts[var.index()] += constraint.bound as u64;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Formula {
        let mut formula = Formula::new(4);
        formula.add_clause([1, 2]);
        formula.add_constraint(2, [1, 2, 3, 4]);
        formula
    }

    #[test]
    fn test_constrained_vars_dedup() {
        let mut formula = Formula::new(5);
        formula.add_constraint(2, [5, -3, 3]);
        formula.add_constraint(2, [1, 5]);
        let ids: Vec<u32> = formula.constrained_vars().into_iter().map(Var::id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn test_weighted_occurrences() {
        let formula = sample();
        assert_eq!(formula.clause_occurrences(), vec![1, 1, 0, 0]);
        assert_eq!(formula.weighted_occurrences(), vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_is_clause() {
        assert!(CardinalityConstraint::new(1, vec![Lit::from_dimacs(1)]).is_clause());
        assert!(!sample().constraints[0].is_clause());
    }
}
