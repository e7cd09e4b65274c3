//! Totalizer.
//!
//! A binary tree over the inputs where every node carries a unary count of the inputs
//! below it: `out[j]` is implied whenever at least `j + 1` of them are true. Counts are
//! cut at `m + 1`, which is all the root needs to forbid `m + 1` true inputs.
//!
//! - O. Bailleux, Y. Boufkhad. "Efficient CNF Encoding of Boolean Cardinality
//!   Constraints." CP 2003.

use super::{implication, VarPool};
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
    debug_assert!(m >= 1 && m < xs.len());
    let root = build(xs, m + 1, pool, clauses)?;
    clauses.push(vec![-root[m]]);
    Ok(())
}

/// Unary count of `xs`, truncated to `limit` outputs.
fn build(
    xs: &[Lit],
    limit: usize,
    pool: &mut VarPool,
    clauses: &mut Vec<Clause>,
) -> Result<Vec<Lit>, EncodeError> {
    if xs.len() == 1 {
        return Ok(xs.to_vec());
    }
    let (left, right) = xs.split_at(xs.len() / 2);
    let a = build(left, limit, pool, clauses)?;
    let b = build(right, limit, pool, clauses)?;

    let len = (a.len() + b.len()).min(limit);
    let out: Vec<Lit> = (0..len).map(|_| pool.new_lit()).collect::<Result<_, _>>()?;

    for i in 0..=a.len() {
        for j in 0..=b.len() {
            if i + j == 0 {
                continue;
            }
            let mut premises = Vec::with_capacity(2);
            if i > 0 {
                premises.push(a[i - 1]);
            }
            if j > 0 {
                premises.push(b[j - 1]);
            }
            let target = (i + j).min(len);
            clauses.push(implication(&premises, Some(out[target - 1])));
        }
    }
    Ok(out)
}
