//! Sequential counter.
//!
//! Register `s[i][j]` holds "at least `j + 1` of `x₀..=xᵢ` are true". Each register row
//! is derived from the previous one, and an input arriving while the previous row is
//! already full is forbidden. `(n − 1) · m` auxiliaries, `O(n · m)` clauses.
//!
//! - C. Sinz. "Towards an Optimal CNF Encoding of Boolean Cardinality Constraints."
//!   CP 2005.

use super::VarPool;
use crate::error::EncodeError;
use crate::formula::Clause;
use crate::types::Lit;

/// At most `m` of `xs` true; requires `1 <= m < xs.len()`.
pub(super) fn at_most(
    xs: &[Lit],
    m: usize,
    pool: &mut VarPool,
    clauses: &mut Vec<Clause>,
) -> Result<(), EncodeError> {
    let n = xs.len();
    debug_assert!(m >= 1 && m < n);

    let registers: Vec<Vec<Lit>> = (0..n - 1)
        .map(|_| (0..m).map(|_| pool.new_lit()).collect())
        .collect::<Result<_, _>>()?;

    // First row: s[0][0] ⇐ x₀, and nothing higher.
    clauses.push(vec![-xs[0], registers[0][0]]);
    for &s in &registers[0][1..] {
        clauses.push(vec![-s]);
    }

    for i in 1..n - 1 {
        let (prev, cur) = (&registers[i - 1], &registers[i]);
        clauses.push(vec![-xs[i], cur[0]]);
        clauses.push(vec![-prev[0], cur[0]]);
        for j in 1..m {
            clauses.push(vec![-xs[i], -prev[j - 1], cur[j]]);
            clauses.push(vec![-prev[j], cur[j]]);
        }
        clauses.push(vec![-xs[i], -prev[m - 1]]);
    }

    clauses.push(vec![-xs[n - 1], -registers[n - 2][m - 1]]);
    Ok(())
}
