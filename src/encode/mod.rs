//! Compilation of cardinality constraints into CNF.
//!
//! A constraint "at least `k` of `x₁..xₙ`" is compiled as "at most `n − k` of
//! `¬x₁..¬xₙ`", so every scheme below only has to implement an at-most-`m` network.
//! Auxiliary variables are allocated from a [`VarPool`] starting right after the
//! current top variable; the caller folds the new top into the output header.
//!
//! Degenerate constraints are handled before dispatch:
//!
//! - `k = 1`: the literals form a single clause;
//! - `k = n`: every literal becomes a unit clause;
//! - `k > n`: unsatisfiable, reported as [`EncodeError::BoundExceedsLiterals`].
//!
//! | name                   | scheme                                          |
//! |------------------------|-------------------------------------------------|
//! | `seqcounter`           | sequential counter (Sinz 2005)                  |
//! | `totalizer`            | totalizer (Bailleux & Boufkhad 2003)            |
//! | `sortnetwrk`           | odd-even merge sorting network (Batcher 1968)   |
//! | `cardnetwrk`           | cardinality network (Asín et al. 2011)          |
//! | `mtotalizer`           | modular totalizer, modulus `⌈√(m+1)⌉`           |
//! | `kmtotalizer`          | modular totalizer, modulus `⌈∛(m+1)⌉`           |
//! | `original_cardinality` | no encoding, the constraint is kept as is       |

mod mtotalizer;
mod seqcounter;
mod sorter;
mod totalizer;

use std::fmt;
use std::str::FromStr;

use crate::error::EncodeError;
use crate::formula::{CardinalityConstraint, Clause};
use crate::types::{Lit, Var, MAX_VAR};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Scheme {
    SeqCounter,
    Totalizer,
    SortingNetwork,
    CardinalityNetwork,
    ModularTotalizer,
    KModularTotalizer,
    /// Keep constraints unencoded, for consumers that read the KNF format.
    Passthrough,
}

impl Scheme {
    pub const ALL: [Scheme; 7] = [
        Scheme::SeqCounter,
        Scheme::Totalizer,
        Scheme::SortingNetwork,
        Scheme::CardinalityNetwork,
        Scheme::ModularTotalizer,
        Scheme::KModularTotalizer,
        Scheme::Passthrough,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scheme::SeqCounter => "seqcounter",
            Scheme::Totalizer => "totalizer",
            Scheme::SortingNetwork => "sortnetwrk",
            Scheme::CardinalityNetwork => "cardnetwrk",
            Scheme::ModularTotalizer => "mtotalizer",
            Scheme::KModularTotalizer => "kmtotalizer",
            Scheme::Passthrough => "original_cardinality",
        }
    }

    pub fn is_passthrough(self) -> bool {
        self == Scheme::Passthrough
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scheme {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scheme::ALL
            .into_iter()
            .find(|scheme| scheme.name() == s)
            .ok_or_else(|| EncodeError::UnknownScheme(s.to_string()))
    }
}

/// Allocator of fresh variables above a fixed top.
#[derive(Debug, Clone)]
pub struct VarPool {
    top: u32,
}

impl VarPool {
    /// A pool whose first fresh variable is `top + 1`.
    pub fn new(top: u32) -> Self {
        Self { top }
    }

    /// Highest variable id handed out so far (or the initial top).
    pub fn top(&self) -> u32 {
        self.top
    }

    /// Fails once the ids would no longer fit a DIMACS literal.
    pub fn new_var(&mut self) -> Result<Var, EncodeError> {
        if self.top >= MAX_VAR {
            return Err(EncodeError::VariablesExhausted(MAX_VAR));
        }
        self.top += 1;
        Ok(Var::new(self.top))
    }

    /// Positive literal of a fresh variable.
    pub fn new_lit(&mut self) -> Result<Lit, EncodeError> {
        Ok(self.new_var()?.pos())
    }
}

/// Result of compiling one constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    Clauses(Vec<Clause>),
    /// The constraint itself, left for a KNF-aware consumer.
    Constraint(CardinalityConstraint),
}

impl Encoded {
    /// Number of lines this result occupies in the output.
    pub fn len(&self) -> usize {
        match self {
            Encoded::Clauses(clauses) => clauses.len(),
            Encoded::Constraint(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compiles `constraint` (the `index`-th of its formula) with `scheme`.
///
/// `top` is the highest variable id in use; auxiliaries are numbered from `top + 1`.
/// Returns the compiled form and the new top.
pub fn encode(
    constraint: &CardinalityConstraint,
    index: usize,
    scheme: Scheme,
    top: u32,
) -> Result<(Encoded, u32), EncodeError> {
    let mut pool = VarPool::new(top);
    let encoded = encode_with(constraint, index, scheme, &mut pool)?;
    Ok((encoded, pool.top()))
}

/// Like [`encode`], drawing auxiliaries from `pool`.
pub fn encode_with(
    constraint: &CardinalityConstraint,
    index: usize,
    scheme: Scheme,
    pool: &mut VarPool,
) -> Result<Encoded, EncodeError> {
    let k = constraint.bound as usize;
    let n = constraint.lits.len();
    if k > n {
        return Err(EncodeError::BoundExceedsLiterals {
            index,
            bound: constraint.bound,
            len: n,
        });
    }

    if constraint.is_clause() {
        return Ok(Encoded::Clauses(vec![constraint.lits.clone()]));
    }
    if scheme.is_passthrough() {
        return Ok(Encoded::Constraint(constraint.clone()));
    }
    if k == n {
        return Ok(Encoded::Clauses(constraint.lits.iter().map(|&lit| vec![lit]).collect()));
    }

    let negated: Vec<Lit> = constraint.lits.iter().map(|&lit| -lit).collect();
    let m = n - k;
    let before = pool.top();
    let mut clauses = Vec::new();
    match scheme {
        Scheme::SeqCounter => seqcounter::at_most(&negated, m, pool, &mut clauses)?,
        Scheme::Totalizer => totalizer::at_most(&negated, m, pool, &mut clauses)?,
        Scheme::SortingNetwork => sorter::at_most_sorting(&negated, m, pool, &mut clauses)?,
        Scheme::CardinalityNetwork => sorter::at_most_cardinality(&negated, m, pool, &mut clauses)?,
        Scheme::ModularTotalizer => {
            mtotalizer::at_most(&negated, m, mtotalizer::coarse_modulus(m), pool, &mut clauses)?
        }
        Scheme::KModularTotalizer => {
            mtotalizer::at_most(&negated, m, mtotalizer::fine_modulus(m), pool, &mut clauses)?
        }
        Scheme::Passthrough => unreachable!("handled above"),
    }
    log::trace!(
        "Constraint #{} ({} of {}) with {}: {} clauses, {} auxiliaries",
        index,
        k,
        n,
        scheme,
        clauses.len(),
        pool.top() - before
    );
    Ok(Encoded::Clauses(clauses))
}

/// Comparator with one-directional implications: `hi ⇐ a ∨ b`, `lo ⇐ a ∧ b`.
pub(crate) fn comparator(
    a: Lit,
    b: Lit,
    pool: &mut VarPool,
    clauses: &mut Vec<Clause>,
) -> Result<(Lit, Lit), EncodeError> {
    let hi = pool.new_lit()?;
    let lo = pool.new_lit()?;
    clauses.push(vec![-a, hi]);
    clauses.push(vec![-b, hi]);
    clauses.push(vec![-a, -b, lo]);
    Ok((hi, lo))
}

/// Half comparator: only `hi ⇐ a ∨ b`.
pub(crate) fn half_comparator(
    a: Lit,
    b: Lit,
    pool: &mut VarPool,
    clauses: &mut Vec<Clause>,
) -> Result<Lit, EncodeError> {
    let hi = pool.new_lit()?;
    clauses.push(vec![-a, hi]);
    clauses.push(vec![-b, hi]);
    Ok(hi)
}

/// Clause `¬premises... ∨ conclusion`.
pub(crate) fn implication(premises: &[Lit], conclusion: Option<Lit>) -> Clause {
    premises.iter().map(|&lit| -lit).chain(conclusion).collect()
}
