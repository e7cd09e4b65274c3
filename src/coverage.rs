//! Coverage curve of an ordering.
//!
//! Restrict the standard clauses to the constrained variables (dropping clauses left
//! empty), then introduce the constrained variables one by one in rank order. The curve
//! records, before each introduction and once at the end, how many restricted clauses
//! have all their variables introduced. An ordering that keeps related variables
//! together covers clauses early and its curve rises quickly.

use std::fmt::Write as _;

use crate::formula::Formula;
use crate::order::Ordering;
use crate::types::Var;

const COLORS: [&str; 11] = [
    "darkestblue",
    "redpurple",
    "browngreen",
    "clearorange",
    "darkpurple",
    "greypurple",
    "redorange",
    "softblue",
    "softgreen",
    "clearyellow",
    "mildgray",
];

const MARKS: [&str; 7] = ["x", "o", "diamond", "square", "star", "+", "triangle"];

/// Strategies with a fixed plot style; all others share the style of index 0.
const PLOT_STRATEGIES: [&str; 5] = ["occurrence", "proximity", "PAMO", "natural", "graph"];

/// Number of covered clauses before each constrained variable (in rank order) and at the end.
///
/// The result has one entry more than there are constrained variables and never decreases.
pub fn coverage(formula: &Formula, ordering: &Ordering) -> Vec<usize> {
    let mut constrained = formula.constrained_vars();
    let mut is_constrained = vec![false; formula.num_vars as usize];
    for var in &constrained {
        is_constrained[var.index()] = true;
    }

    // Per restricted clause: number of distinct variables not yet introduced.
    let mut remaining: Vec<usize> = Vec::new();
    let mut occurrences: Vec<Vec<usize>> = vec![Vec::new(); formula.num_vars as usize];
    for clause in &formula.clauses {
        let mut vars: Vec<Var> = clause
            .iter()
            .map(|lit| lit.var())
            .filter(|v| is_constrained[v.index()])
            .collect();
        vars.sort_unstable();
        vars.dedup();
        if vars.is_empty() {
            continue;
        }
        for var in &vars {
            occurrences[var.index()].push(remaining.len());
        }
        remaining.push(vars.len());
    }
    log::debug!(
        "Coverage over {} constrained variables and {} clauses",
        constrained.len(),
        remaining.len()
    );

    ordering.sort(&mut constrained);
    let mut covered = 0;
    let mut curve = Vec::with_capacity(constrained.len() + 1);
    for var in constrained {
        curve.push(covered);
        for &clause in &occurrences[var.index()] {
            remaining[clause] -= 1;
            if remaining[clause] == 0 {
                covered += 1;
            }
        }
    }
    curve.push(covered);
    curve
}

/// Plot style index for a strategy name.
pub fn plot_index(strategy: &str) -> usize {
    PLOT_STRATEGIES.iter().position(|&s| s == strategy).unwrap_or(0)
}

/// Formats `curve` as a pgfplots `\addplot` command.
pub fn format_pgfplot(curve: &[usize], index: usize) -> String {
    let mut line = format!(
        "\\addplot[only marks, color={},mark={},opacity=0.5] coordinates {{ ",
        COLORS[index % COLORS.len()],
        MARKS[index % MARKS.len()]
    );
    for (i, covered) in curve.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = write!(line, "({},{})", i, covered);
    }
    line.push_str("};");
    line
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn example() -> Formula {
        let mut formula = Formula::new(4);
        formula.add_clause([1, 2]);
        formula.add_constraint(2, [1, 2, 3, 4]);
        formula
    }

    #[test]
    fn test_natural_example() {
        let curve = coverage(&example(), &Ordering::natural(4));
        assert_eq!(curve, vec![0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_order_matters() {
        let mut formula = Formula::new(6);
        formula.add_clause([1, 6]);
        formula.add_clause([2, -5]);
        formula.add_clause([3, 4]);
        formula.add_constraint(3, [1, 2, 3, 4, 5, 6]);

        let natural = coverage(&formula, &Ordering::natural(6));
        assert_eq!(natural, vec![0, 0, 0, 0, 1, 2, 3]);

        let paired = Ordering::from_sequence(6, [1, 6, 2, 5, 3, 4].map(Var::new).to_vec()).unwrap();
        assert_eq!(coverage(&formula, &paired), vec![0, 0, 1, 1, 2, 2, 3]);
    }

    #[test]
    fn test_unconstrained_literals_dropped() {
        let mut formula = Formula::new(5);
        formula.add_clause([1, 5]);
        formula.add_clause([4, 5]);
        formula.add_clause([1, 1, 2]);
        formula.add_constraint(2, [1, 2, 3]);
        // Restricted clauses: {1}, {1, 2}; the second clause disappears.
        let curve = coverage(&formula, &Ordering::natural(5));
        assert_eq!(curve, vec![0, 1, 2, 2]);
    }

    #[test]
    fn test_no_constraints() {
        let mut formula = Formula::new(2);
        formula.add_clause([1, 2]);
        assert_eq!(coverage(&formula, &Ordering::natural(2)), vec![0]);
    }

    #[test]
    fn test_pgfplot() {
        assert_eq!(plot_index("graph"), 4);
        assert_eq!(plot_index("random_fixed"), 0);
        assert_eq!(
            format_pgfplot(&[0, 1], plot_index("proximity")),
            "\\addplot[only marks, color=redpurple,mark=o,opacity=0.5] coordinates { (0,0)(1,1)};"
        );
    }
}
