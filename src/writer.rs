//! Output formats.
//!
//! All writers take any [`Write`]; [`write_file`] renders into memory first and only
//! then creates the destination, so a failed run never leaves a truncated file behind.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::encode::Encoded;
use crate::error::Error;
use crate::formula::{CardinalityConstraint, Clause, Formula};
use crate::order::Ordering;
use crate::types::Lit;

/// A formula after encoding: the standard clauses followed by every compiled constraint.
#[derive(Debug, Clone)]
pub struct CompiledFormula {
    /// Highest variable id, auxiliaries included.
    pub num_vars: u32,
    pub clauses: Vec<Clause>,
    /// Compiled constraints, in constraint order.
    pub encoded: Vec<Encoded>,
    /// Constraints were left unencoded; the header says `knf` whatever the body holds.
    pub passthrough: bool,
}

impl CompiledFormula {
    pub fn num_clauses(&self) -> usize {
        self.clauses.len() + self.encoded.iter().map(Encoded::len).sum::<usize>()
    }

    pub fn tag(&self) -> &'static str {
        if self.passthrough {
            "knf"
        } else {
            "cnf"
        }
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "p {} {} {}", self.tag(), self.num_vars, self.num_clauses())?;
        for clause in &self.clauses {
            write_clause(w, clause)?;
        }
        for encoded in &self.encoded {
            match encoded {
                Encoded::Clauses(clauses) => {
                    for clause in clauses {
                        write_clause(w, clause)?;
                    }
                }
                Encoded::Constraint(constraint) => write_constraint(w, constraint)?,
            }
        }
        Ok(())
    }
}

/// `lits... 0`
pub fn write_clause<W: Write>(w: &mut W, lits: &[Lit]) -> io::Result<()> {
    for lit in lits {
        write!(w, "{} ", lit)?;
    }
    writeln!(w, "0")
}

/// `k bound lits... 0`
pub fn write_constraint<W: Write>(w: &mut W, constraint: &CardinalityConstraint) -> io::Result<()> {
    write!(w, "k {} ", constraint.bound)?;
    write_clause(w, &constraint.lits)
}

/// Writes `formula` in KNF: header, standard clauses, then constraints.
pub fn write_knf<W: Write>(w: &mut W, formula: &Formula) -> io::Result<()> {
    let tag = if formula.constraints.is_empty() { "cnf" } else { "knf" };
    let count = formula.clauses.len() + formula.constraints.len();
    writeln!(w, "p {} {} {}", tag, formula.num_vars, count)?;
    for clause in &formula.clauses {
        write_clause(w, clause)?;
    }
    for constraint in &formula.constraints {
        write_constraint(w, constraint)?;
    }
    Ok(())
}

/// Variable ids in rank order on a single line.
pub fn write_order<W: Write>(w: &mut W, ordering: &Ordering) -> io::Result<()> {
    let ids: Vec<String> = ordering.sequence().iter().map(|v| v.id().to_string()).collect();
    writeln!(w, "{}", ids.join(" "))
}

/// Weighted CNF: each literal of a proper cardinality constraint becomes a soft unit
/// of weight 1, written first and sorted; standard clauses and clause-like constraints
/// follow as hard clauses (`h ... 0`).
pub fn write_wcnf<W: Write>(w: &mut W, formula: &Formula) -> io::Result<()> {
    let mut soft: Vec<Lit> = formula
        .constraints
        .iter()
        .filter(|c| !c.is_clause())
        .flat_map(|c| c.lits.iter().copied())
        .collect();
    soft.sort();
    for lit in soft {
        writeln!(w, "1 {} 0", lit)?;
    }

    let hard = formula.constraints.iter().filter(|c| c.is_clause()).map(|c| &c.lits);
    for clause in formula.clauses.iter().chain(hard) {
        write!(w, "h ")?;
        write_clause(w, clause)?;
    }
    Ok(())
}

/// Renders with `render`, then writes the result to `path` in one go.
pub fn write_file<P, F>(path: P, render: F) -> Result<(), Error>
where
    P: AsRef<Path>,
    F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
{
    let path = path.as_ref();
    let mut buffer = Vec::new();
    render(&mut buffer).map_err(|e| Error::io("write", path.display().to_string(), e))?;
    fs::write(path, buffer).map_err(|e| Error::io("write", path.display().to_string(), e))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
