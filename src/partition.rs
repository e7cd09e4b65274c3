//! Partitions of the variable set into groups (communities).
//!
//! A partition of `1..=n` is a sequence of non-empty, pairwise disjoint groups
//! whose union is exactly `1..=n`.

use std::fmt;

use crate::types::Var;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Partition {
    groups: Vec<Vec<Var>>,
}

impl Partition {
    /// Creates a partition from groups as given, without reordering them.
    pub fn from_groups(groups: Vec<Vec<Var>>) -> Self {
        Self { groups }
    }

    /// Creates the canonical form: every group sorted, then groups sorted by content.
    ///
    /// Two partitions with the same groups are equal after canonicalisation,
    /// regardless of the order in which the groups were discovered.
    pub fn canonical(mut groups: Vec<Vec<Var>>) -> Self {
        for group in groups.iter_mut() {
            group.sort_unstable();
        }
        groups.sort();
        Self { groups }
    }

    /// The discrete partition: every variable alone.
    pub fn discrete(num_vars: u32) -> Self {
        Self {
            groups: (1..=num_vars).map(|v| vec![Var::new(v)]).collect(),
        }
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn groups(&self) -> &[Vec<Var>] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [Vec<Var>] {
        &mut self.groups
    }

    /// `Σ |len(group) − ideal|` over all groups.
    pub fn deviation(&self, ideal_group_size: usize) -> usize {
        self.groups.iter().map(|g| g.len().abs_diff(ideal_group_size)).sum()
    }

    /// Whether every variable of `1..=num_vars` lies in exactly one group.
    pub fn covers(&self, num_vars: u32) -> bool {
        let mut seen = vec![false; num_vars as usize];
        for &var in self.groups.iter().flatten() {
            if var.id() > num_vars || seen[var.index()] {
                return false;
            }
            seen[var.index()] = true;
        }
        seen.into_iter().all(|s| s)
    }

    /// All variables, group after group, in their existing order.
    pub fn concat(&self) -> Vec<Var> {
        self.groups.iter().flatten().copied().collect()
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            for (j, var) in group.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", var.id())?;
            }
        }
        write!(f, "}}")
    }
}
