//! Modular totalizer.
//!
//! Like the totalizer, but every node stores its count `c` as `c = p·u + l` with
//! `0 <= l < p`: the lower digit `l` in unary over `p − 1` variables, the upper digit
//! `u` in unary (cut at `⌊m / p⌋ + 1`), and a carry for sums of lower digits that
//! reach `p`. For a node with children `(l₁, u₁)` and `(l₂, u₂)`:
//!
//! ```text
//! L₁[a] ∧ L₂[b] → L[a+b] ∨ C     a + b < p
//! L₁[a] ∧ L₂[b] → C              a + b ≥ p
//! L₁[a] ∧ L₂[b] → L[a+b−p]       a + b > p
//! U₁[i] ∧ U₂[j]     → U[i+j]
//! U₁[i] ∧ U₂[j] ∧ C → U[i+j+1]
//! ```
//!
//! With `m = p·q + r`, the root forbids `U[q+1]` and `U[q] ∧ L[s]` for all `s > r`.
//! Every node then satisfies `p·max(U) + max(L) >= min(count, p·(q+1))`, so the root
//! accepts exactly the assignments with at most `m` true inputs.
//!
//! - T. Ogawa, Y. Liu, R. Hasegawa, M. Koshimura, H. Fujita. "Modulo Based CNF
//!   Encoding of Cardinality Constraints and Its Application to MaxSAT Solvers."
//!   ICTAI 2013.

use super::{implication, VarPool};
use crate::error::EncodeError;
use crate::formula::Clause;
use crate::types::Lit;

/// Modulus `⌈√(m+1)⌉`, at least 2.
pub(super) fn coarse_modulus(m: usize) -> usize {
    let mut p = 2;
    while p * p < m + 1 {
        p += 1;
    }
    p
}

/// Modulus `⌈∛(m+1)⌉`, at least 2.
pub(super) fn fine_modulus(m: usize) -> usize {
    let mut p = 2;
    while p * p * p < m + 1 {
        p += 1;
    }
    p
}

struct Node {
    size: usize,
    /// `lower[j]` is `L[j + 1]`.
    lower: Vec<Lit>,
    /// `upper[i]` is `U[i + 1]`.
    upper: Vec<Lit>,
}

struct Builder<'a> {
    p: usize,
    /// Longest upper digit kept in any node.
    cap: usize,
    pool: &'a mut VarPool,
    clauses: &'a mut Vec<Clause>,
}

/// At most `m` of `xs` true with modulus `p`; requires `1 <= m < xs.len()` and `p >= 2`.
pub(super) fn at_most(
    xs: &[Lit],
    m: usize,
    p: usize,
    pool: &mut VarPool,
    clauses: &mut Vec<Clause>,
) -> Result<(), EncodeError> {
    debug_assert!(m >= 1 && m < xs.len() && p >= 2);
    let (q, r) = (m / p, m % p);
    let mut builder = Builder {
        p,
        cap: q + 1,
        pool,
        clauses,
    };
    let root = builder.build(xs)?;

    if let Some(&u) = root.upper.get(q) {
        builder.clauses.push(vec![-u]);
    }
    let uq = if q == 0 { None } else { root.upper.get(q - 1).copied() };
    if q > 0 && uq.is_none() {
        // Not enough inputs to reach p·q, which is at most m.
        return Ok(());
    }
    for &l in root.lower.iter().skip(r) {
        builder.clauses.push(implication(&[uq, Some(l)].into_iter().flatten().collect::<Vec<_>>(), None));
    }
    Ok(())
}

impl Builder<'_> {
    fn build(&mut self, xs: &[Lit]) -> Result<Node, EncodeError> {
        if xs.len() == 1 {
            return Ok(Node {
                size: 1,
                lower: xs.to_vec(),
                upper: Vec::new(),
            });
        }
        let (left, right) = xs.split_at(xs.len() / 2);
        let a = self.build(left)?;
        let b = self.build(right)?;
        self.combine(a, b)
    }

    fn combine(&mut self, a: Node, b: Node) -> Result<Node, EncodeError> {
        let p = self.p;
        let size = a.size + b.size;
        let lower: Vec<Lit> = (0..(p - 1).min(size))
            .map(|_| self.pool.new_lit())
            .collect::<Result<_, _>>()?;
        let upper: Vec<Lit> = (0..(size / p).min(self.cap))
            .map(|_| self.pool.new_lit())
            .collect::<Result<_, _>>()?;
        let carry = (a.lower.len() + b.lower.len() >= p)
            .then(|| self.pool.new_lit())
            .transpose()?;

        for i in 0..=a.lower.len() {
            for j in 0..=b.lower.len() {
                let s = i + j;
                if s == 0 {
                    continue;
                }
                let premises = digits(&a.lower, i, &b.lower, j);
                if s < p {
                    let mut clause = implication(&premises, Some(lower[s - 1]));
                    clause.extend(carry);
                    self.clauses.push(clause);
                } else {
                    self.clauses.push(implication(&premises, carry));
                    if s > p {
                        self.clauses.push(implication(&premises, Some(lower[s - p - 1])));
                    }
                }
            }
        }

        for i in 0..=a.upper.len() {
            for j in 0..=b.upper.len() {
                let premises = digits(&a.upper, i, &b.upper, j);
                if i + j > 0 {
                    self.push_upper(&premises, i + j, &upper);
                }
                if let Some(c) = carry {
                    let mut with_carry = premises.clone();
                    with_carry.push(c);
                    self.push_upper(&with_carry, i + j + 1, &upper);
                }
            }
        }

        Ok(Node { size, lower, upper })
    }

    /// `premises → U[target]`, saturating at the cap; impossible targets just forbid the premises.
    fn push_upper(&mut self, premises: &[Lit], target: usize, upper: &[Lit]) {
        let conclusion = if target <= upper.len() {
            Some(upper[target - 1])
        } else if upper.len() == self.cap {
            upper.last().copied()
        } else {
            None
        };
        self.clauses.push(implication(premises, conclusion));
    }
}

/// Literals `X[i] ∧ Y[j]`, where index 0 stands for "true" and is omitted.
fn digits(x: &[Lit], i: usize, y: &[Lit], j: usize) -> Vec<Lit> {
    let mut premises = Vec::with_capacity(2);
    if i > 0 {
        premises.push(x[i - 1]);
    }
    if j > 0 {
        premises.push(y[j - 1]);
    }
    premises
}
