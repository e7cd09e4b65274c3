//! Applying a variable ordering to a formula.
//!
//! # Literal Reordering
//!
//! Encoders build their networks over the constraint literals in the sequence they are
//! given, so neighbouring literals end up sharing auxiliary structure. Reordering sorts
//! every constraint's literals by the rank of their variable; the sort is stable and
//! signs are untouched, so only the presentation order changes, never the meaning.
//!
//! # Renaming
//!
//! Renaming is the alternative: instead of moving literals, it relabels the constrained
//! variables so that sorting by id gives the rank order. Only ids already used by
//! constrained variables are handed out again, so the renaming is a permutation of the
//! constrained set and the identity everywhere else:
//!
//! ```text
//! constrained (by id):   2 3 5 7
//! constrained (by rank): 7 2 5 3
//! rename:                7 -> 2, 2 -> 3, 5 -> 5, 3 -> 7
//! ```
//!
//! The variable with the i-th smallest rank receives the i-th smallest id.

use std::collections::HashMap;

use crate::formula::{CardinalityConstraint, Formula};
use crate::order::Ordering;
use crate::types::{Lit, Var};

/// Stable sort of `lits` by the rank of their variables.
pub fn reorder_literals(lits: &[Lit], ordering: &Ordering) -> Vec<Lit> {
    let mut lits = lits.to_vec();
    lits.sort_by_key(|lit| ordering.rank(lit.var()));
    lits
}

/// Reorders the literals of every cardinality constraint. Standard clauses are left as is.
pub fn reorder_constraints(formula: &Formula, ordering: &Ordering) -> Formula {
    let constraints = formula
        .constraints
        .iter()
        .map(|c| CardinalityConstraint::new(c.bound, reorder_literals(&c.lits, ordering)))
        .collect();
    Formula {
        constraints,
        ..formula.clone()
    }
}

/// Permutation of the constrained variables; identity on all other variables.
#[derive(Debug, Clone, Default)]
pub struct RenameMap {
    map: HashMap<Var, Var>,
}

impl RenameMap {
    pub fn new(formula: &Formula, ordering: &Ordering) -> Self {
        let by_id = formula.constrained_vars();
        let mut by_rank = by_id.clone();
        ordering.sort(&mut by_rank);

        let map: HashMap<Var, Var> = by_rank.into_iter().zip(by_id).collect();
        let moved = map.iter().filter(|(from, to)| from != to).count();
        log::debug!("Renaming {} of {} constrained variables", moved, map.len());
        Self { map }
    }

    pub fn apply(&self, var: Var) -> Var {
        self.map.get(&var).copied().unwrap_or(var)
    }

    pub fn apply_lit(&self, lit: Lit) -> Lit {
        lit.with_var(self.apply(lit.var()))
    }

    /// Number of constrained variables covered by the map.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Renames every clause and every constraint.
    ///
    /// Constraint literals are then sorted by id, which after renaming is the rank order.
    pub fn rename_formula(&self, formula: &Formula) -> Formula {
        let rename = |lits: &[Lit]| lits.iter().map(|&l| self.apply_lit(l)).collect::<Vec<_>>();
        let clauses = formula.clauses.iter().map(|c| rename(c.as_slice())).collect();
        let constraints = formula
            .constraints
            .iter()
            .map(|c| {
                let mut lits = rename(c.lits.as_slice());
                lits.sort_by_key(|lit| lit.var());
                CardinalityConstraint::new(c.bound, lits)
            })
            .collect();
        Formula {
            clauses,
            constraints,
            ..formula.clone()
        }
    }
}
