//! Readers for the KNF formula format and for plain variable-order files.
//!
//! # KNF Format
//!
//! ```text
//! c comment
//! p knf <num_vars> <num_clauses>
//! 1 -2 3 0          # standard clause
//! k 2 1 2 3 4 0     # at least 2 of {1, 2, 3, 4}
//! ```
//!
//! The header tag may be `cnf` or `knf`. Each clause or constraint occupies one line
//! and must end with `0`. A line starting with `%` ends the input (SATLIB convention).

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, OrderError, ParseError, ParseErrorKind};
use crate::formula::{CardinalityConstraint, Formula};
use crate::types::{Lit, Var, MAX_VAR};

/// Reads the whole stream, then parses it as KNF.
pub fn read_formula<R: Read>(mut reader: R) -> Result<Formula, Error> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| Error::io("parse", "<input>", e))?;
    Ok(parse_formula(&text)?)
}

pub fn read_formula_file<P: AsRef<Path>>(path: P) -> Result<Formula, Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::io("parse", path.display().to_string(), e))?;
    Ok(parse_formula(&text)?)
}

pub fn parse_formula(text: &str) -> Result<Formula, ParseError> {
    let mut formula: Option<Formula> = None;

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let mut tokens = line.split_whitespace().peekable();
        let Some(&first) = tokens.peek() else {
            continue;
        };

        if first.starts_with('c') {
            continue;
        }
        if first.starts_with('%') {
            break;
        }

        if first == "p" {
            if formula.is_some() {
                return Err(ParseError::new(line_no, ParseErrorKind::DuplicateHeader));
            }
            formula = Some(parse_header(line, line_no)?);
            continue;
        }

        let Some(formula) = formula.as_mut() else {
            return Err(ParseError::new(line_no, ParseErrorKind::MissingHeader));
        };

        if first == "k" {
            tokens.next();
            let bound = match tokens.next() {
                Some(token) => parse_int(token, line_no)?,
                None => return Err(ParseError::new(line_no, ParseErrorKind::MissingBound)),
            };
            if bound < 1 {
                return Err(ParseError::new(line_no, ParseErrorKind::NonPositiveBound(bound)));
            }
            let bound = u32::try_from(bound)
                .map_err(|_| ParseError::new(line_no, ParseErrorKind::InvalidInteger(bound.to_string())))?;
            let lits = parse_literals(tokens, formula.num_vars, line_no)?;
            formula.constraints.push(CardinalityConstraint::new(bound, lits));
        } else {
            let lits = parse_literals(tokens, formula.num_vars, line_no)?;
            formula.clauses.push(lits);
        }
    }

    let formula = formula.ok_or(ParseError::new(0, ParseErrorKind::MissingHeader))?;

    let parsed = formula.clauses.len() + formula.constraints.len();
    if parsed != formula.declared_clauses {
        log::warn!(
            "Header declares {} clauses but {} were parsed",
            formula.declared_clauses,
            parsed
        );
    }
    log::debug!(
        "Parsed formula: {} vars, {} clauses, {} cardinality constraints",
        formula.num_vars,
        formula.clauses.len(),
        formula.constraints.len()
    );

    Ok(formula)
}

fn parse_header(line: &str, line_no: usize) -> Result<Formula, ParseError> {
    let malformed = || ParseError::new(line_no, ParseErrorKind::MalformedHeader(line.trim().to_string()));
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 4 || !matches!(parts[1], "cnf" | "knf") {
        return Err(malformed());
    }
    let num_vars = parts[2].parse::<u32>().map_err(|_| malformed())?;
    if num_vars > MAX_VAR {
        return Err(malformed());
    }
    let declared_clauses = parts[3].parse::<usize>().map_err(|_| malformed())?;
    let mut formula = Formula::new(num_vars);
    formula.declared_clauses = declared_clauses;
    Ok(formula)
}

fn parse_int(token: &str, line_no: usize) -> Result<i64, ParseError> {
    token
        .parse::<i64>()
        .map_err(|_| ParseError::new(line_no, ParseErrorKind::InvalidInteger(token.to_string())))
}

/// Parses `lit... 0`, checking every literal against `num_vars`.
fn parse_literals<'a>(
    tokens: impl Iterator<Item = &'a str>,
    num_vars: u32,
    line_no: usize,
) -> Result<Vec<Lit>, ParseError> {
    let mut lits = Vec::new();
    let mut terminated = false;

    for token in tokens {
        if terminated {
            // Something after the terminating zero.
            return Err(ParseError::new(line_no, ParseErrorKind::MissingTerminator));
        }
        let value = parse_int(token, line_no)?;
        if value == 0 {
            terminated = true;
            continue;
        }
        if value.unsigned_abs() > num_vars as u64 {
            return Err(ParseError::new(
                line_no,
                ParseErrorKind::LiteralOutOfRange { lit: value, num_vars },
            ));
        }
        lits.push(Lit::from_dimacs(value as i32));
    }

    if !terminated {
        return Err(ParseError::new(line_no, ParseErrorKind::MissingTerminator));
    }
    Ok(lits)
}

/// Reads a whitespace-separated sequence of variable ids, possibly spread over many lines.
///
/// Signs are ignored. Repeated ids are rejected; completeness is checked later by
/// [`Ordering::from_sequence`][crate::order::Ordering::from_sequence].
pub fn parse_order_sequence(text: &str) -> Result<Vec<Var>, OrderError> {
    let mut seen = std::collections::HashSet::new();
    let mut vars = Vec::new();
    for token in text.split_whitespace() {
        let value = token.parse::<i64>().map_err(|_| OrderError::NotABijection {
            num_vars: 0,
            reason: format!("invalid variable id `{}`", token),
        })?;
        if value == 0 || value.unsigned_abs() > u32::MAX as u64 {
            return Err(OrderError::NotABijection {
                num_vars: 0,
                reason: format!("invalid variable id `{}`", token),
            });
        }
        let var = Var::new(value.unsigned_abs() as u32);
        if !seen.insert(var) {
            return Err(OrderError::NotABijection {
                num_vars: 0,
                reason: format!("variable {} appears twice", var.id()),
            });
        }
        vars.push(var);
    }
    Ok(vars)
}
