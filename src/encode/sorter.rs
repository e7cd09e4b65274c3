//! Odd-even merge sorting networks and cardinality networks.
//!
//! Both sort the inputs in descending order (true first) with comparators whose
//! outputs are only implied by their inputs, then forbid output `m`. The sorting
//! network sorts all `n` inputs; the cardinality network only keeps the first `m + 1`
//! outputs of every merge, and builds the last output of a truncated merge with a half
//! comparator.
//!
//! Merging sorted `a` and `b`: merge the even-indexed elements into `v` and the
//! odd-indexed ones into `w`, then `v₀, sort(w₀, v₁), sort(w₁, v₂), ...` is sorted.
//!
//! - K. E. Batcher. "Sorting Networks and their Applications." AFIPS 1968.
//! - R. Asín, R. Nieuwenhuis, A. Oliveras, E. Rodríguez-Carbonell.
//!   "Cardinality Networks: a theoretical and empirical study." Constraints 2011.

use super::{comparator, half_comparator, VarPool};
use crate::error::EncodeError;
use crate::formula::Clause;
use crate::types::Lit;

/// At most `m` of `xs` through a full sorting network.
pub(super) fn at_most_sorting(
    xs: &[Lit],
    m: usize,
    pool: &mut VarPool,
    clauses: &mut Vec<Clause>,
) -> Result<(), EncodeError> {
    debug_assert!(m >= 1 && m < xs.len());
    let sorted = sort(xs, xs.len(), pool, clauses)?;
    clauses.push(vec![-sorted[m]]);
    Ok(())
}

/// At most `m` of `xs` through a cardinality network with `m + 1` outputs.
pub(super) fn at_most_cardinality(
    xs: &[Lit],
    m: usize,
    pool: &mut VarPool,
    clauses: &mut Vec<Clause>,
) -> Result<(), EncodeError> {
    debug_assert!(m >= 1 && m < xs.len());
    let sorted = sort(xs, m + 1, pool, clauses)?;
    clauses.push(vec![-sorted[m]]);
    Ok(())
}

/// The first `min(limit, xs.len())` outputs of a descending sort of `xs`.
fn sort(
    xs: &[Lit],
    limit: usize,
    pool: &mut VarPool,
    clauses: &mut Vec<Clause>,
) -> Result<Vec<Lit>, EncodeError> {
    if xs.len() <= 1 {
        return Ok(xs.to_vec());
    }
    let (left, right) = xs.split_at(xs.len() / 2);
    let a = sort(left, limit, pool, clauses)?;
    let b = sort(right, limit, pool, clauses)?;
    merge(&a, &b, limit, pool, clauses)
}

/// The first `min(limit, a.len() + b.len())` outputs of merging sorted `a` and `b`.
fn merge(
    a: &[Lit],
    b: &[Lit],
    limit: usize,
    pool: &mut VarPool,
    clauses: &mut Vec<Clause>,
) -> Result<Vec<Lit>, EncodeError> {
    let len = limit.min(a.len() + b.len());
    if len == 0 {
        return Ok(Vec::new());
    }
    if a.is_empty() {
        return Ok(b[..len].to_vec());
    }
    if b.is_empty() {
        return Ok(a[..len].to_vec());
    }
    if a.len() == 1 && b.len() == 1 {
        if len == 1 {
            return Ok(vec![half_comparator(a[0], b[0], pool, clauses)?]);
        }
        let (hi, lo) = comparator(a[0], b[0], pool, clauses)?;
        return Ok(vec![hi, lo]);
    }

    let evens = |xs: &[Lit]| xs.iter().step_by(2).copied().collect::<Vec<_>>();
    let odds = |xs: &[Lit]| xs.iter().skip(1).step_by(2).copied().collect::<Vec<_>>();
    let v = merge(&evens(a), &evens(b), len / 2 + 1, pool, clauses)?;
    let w = merge(&odds(a), &odds(b), len / 2, pool, clauses)?;

    let mut out = Vec::with_capacity(len);
    out.push(v[0]);
    let mut i = 0;
    while out.len() < len {
        match (w.get(i), v.get(i + 1)) {
            (Some(&x), Some(&y)) if len - out.len() == 1 => out.push(half_comparator(x, y, pool, clauses)?),
            (Some(&x), Some(&y)) => {
                let (hi, lo) = comparator(x, y, pool, clauses)?;
                out.push(hi);
                out.push(lo);
            }
            (Some(&x), None) | (None, Some(&x)) => out.push(x),
            (None, None) => break,
        }
        i += 1;
    }
    Ok(out)
}
