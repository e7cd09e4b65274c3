//! # knf-order: variable ordering for cardinality constraints
//!
//! **`knf-order`** reads a SAT formula with cardinality constraints (the KNF format),
//! computes an order over its variables, and compiles every constraint into plain CNF
//! clauses with the literals presented to the encoder in that order.
//!
//! ## Why Ordering Matters
//!
//! Cardinality encodings (counters, totalizers, sorting networks) are built over the
//! constraint literals as a sequence: literals that are close in the sequence share
//! auxiliary variables. If variables that also interact through the rest of the formula
//! sit next to each other, the solver gets to reason about them together. The encoding
//! stays correct under any order; only its shape changes.
//!
//! ## Pipeline
//!
//! 1. [`parser`] reads the formula into a [`Formula`][crate::formula::Formula].
//! 2. [`order`] computes an [`Ordering`][crate::order::Ordering] with one of several
//!    strategies: natural, seeded random, occurrence counts, community detection on the
//!    variable incidence graph ([`graph`], [`community`], [`partition`]), an external
//!    program, or a file.
//! 3. [`reorder`] sorts the constraint literals by rank, or renames the constrained
//!    variables so that their ids follow the rank.
//! 4. [`encode`] compiles each constraint with the selected [`Scheme`][crate::encode::Scheme].
//! 5. [`writer`] writes the result; [`coverage`] scores an ordering instead.
//!
//! [`pipeline`] ties the stages together for a single run.
//!
//! ## Basic Usage
//!
//! ```rust
//! use knf_order::encode::Scheme;
//! use knf_order::order::{compute_order, Strategy};
//! use knf_order::parser::parse_formula;
//! use knf_order::pipeline::{arrange, compile};
//!
//! let formula = parse_formula("p knf 4 2\n1 2 0\nk 2 1 2 3 4 0\n").unwrap();
//! let ordering = compute_order(&formula, &Strategy::Occurrence).unwrap();
//! let arranged = arrange(&formula, &ordering, false);
//! let compiled = compile(&arranged, Scheme::Totalizer).unwrap();
//!
//! let mut out = Vec::new();
//! compiled.write(&mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().starts_with("p cnf "));
//! ```

pub mod community;
pub mod coverage;
pub mod encode;
pub mod error;
pub mod formula;
pub mod graph;
pub mod order;
pub mod parser;
pub mod partition;
pub mod pipeline;
pub mod reorder;
pub mod types;
pub mod writer;
