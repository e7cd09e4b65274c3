//! Variable ordering strategies.
//!
//! Every strategy produces an [`Ordering`]: a bijection `rank: Var → 1..=num_vars`.
//! The result is always validated, so a strategy that drops or repeats a variable
//! fails with [`OrderError::NotABijection`] instead of silently producing a bad rank.
//!
//! # Strategies
//!
//! - **Natural**: `rank(v) = v`.
//! - **Random**: a uniform permutation drawn from a seeded `ChaCha8Rng`.
//! - **Occurrence**: descending weighted occurrence count (clause occurrences plus
//!   the bound of every constraint the variable appears in), ties by ascending id.
//! - **Graph**: community detection on the variable incidence graph; variables of
//!   the same community end up next to each other. See [`GraphConfig`].
//! - **External**: an opaque program that prints an order.
//! - **File**: an order read from a file.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::str::FromStr;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::community::{CommunityDetector, Louvain};
use crate::error::OrderError;
use crate::formula::Formula;
use crate::graph::IncidenceGraph;
use crate::parser::parse_order_sequence;
use crate::partition::Partition;
use crate::types::Var;
use crate::writer::write_knf;

/// A total order over the variables `1..=num_vars`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    /// Variables in rank order (`sequence[0]` has rank 1).
    sequence: Vec<Var>,
    /// `ranks[v.index()]` is the 1-based rank of `v`.
    ranks: Vec<u32>,
}

impl Ordering {
    /// The identity order.
    pub fn natural(num_vars: u32) -> Self {
        Self {
            sequence: (1..=num_vars).map(Var::new).collect(),
            ranks: (1..=num_vars).collect(),
        }
    }

    /// Builds an ordering from variables listed in rank order.
    pub fn from_sequence(num_vars: u32, sequence: Vec<Var>) -> Result<Self, OrderError> {
        let fail = |reason: String| OrderError::NotABijection { num_vars, reason };
        if sequence.len() != num_vars as usize {
            return Err(fail(format!("{} variables listed", sequence.len())));
        }
        let mut ranks = vec![0; num_vars as usize];
        for (pos, &var) in sequence.iter().enumerate() {
            if var.id() > num_vars {
                return Err(fail(format!("variable {} out of range", var.id())));
            }
            if ranks[var.index()] != 0 {
                return Err(fail(format!("variable {} listed twice", var.id())));
            }
            ranks[var.index()] = pos as u32 + 1;
        }
        Ok(Self { sequence, ranks })
    }

    /// Builds an ordering from `ranks[i]` = rank of variable `i + 1`.
    pub fn from_ranks(ranks: Vec<u32>) -> Result<Self, OrderError> {
        let num_vars = ranks.len() as u32;
        let fail = |reason: String| OrderError::NotABijection { num_vars, reason };
        let mut sequence: Vec<Option<Var>> = vec![None; ranks.len()];
        for (i, &rank) in ranks.iter().enumerate() {
            if rank == 0 || rank > num_vars {
                return Err(fail(format!("rank {} out of range", rank)));
            }
            let slot = &mut sequence[rank as usize - 1];
            if slot.is_some() {
                return Err(fail(format!("rank {} assigned twice", rank)));
            }
            *slot = Some(Var::new(i as u32 + 1));
        }
        let sequence = sequence.into_iter().flatten().collect();
        Ok(Self { sequence, ranks })
    }

    pub fn num_vars(&self) -> u32 {
        self.ranks.len() as u32
    }

    /// 1-based rank of `var`.
    pub fn rank(&self, var: Var) -> u32 {
        self.ranks[var.index()]
    }

    /// Variables in rank order.
    pub fn sequence(&self) -> &[Var] {
        &self.sequence
    }

    /// Sorts `vars` by rank, stably.
    pub fn sort(&self, vars: &mut [Var]) {
        vars.sort_by_key(|&v| self.rank(v));
    }
}

/// Settings of the community-detection strategy.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Upper bound on community-detection runs (seeds `0..max_iterations`).
    pub max_iterations: usize,
    /// Wall-clock budget, checked before each run.
    pub timeout: Duration,
    /// Order each community by descending clause occurrences instead of by id.
    pub sort_variables: bool,
    /// Weight edges by the number of clauses sharing the pair.
    pub multi_edges: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            timeout: Duration::from_secs(300),
            sort_variables: false,
            multi_edges: false,
        }
    }
}

/// An ordering tool run as a separate process.
///
/// The formula is written to `<workdir>/<name>.knf` and the program is run inside
/// `workdir` as `program args... <name>.knf`. It prints the variables, whitespace-separated
/// and in rank order, on stdout. With `order_file` set it is run as
/// `program args... <name>.knf <name>.order` and writes them to that file instead.
#[derive(Debug, Clone)]
pub struct ExternalStrategy {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    pub order_file: bool,
}

impl ExternalStrategy {
    pub fn new(name: impl Into<String>, command: &str, workdir: impl Into<PathBuf>) -> Self {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts.next().unwrap_or_default();
        Self {
            name: name.into(),
            program,
            args: parts.collect(),
            workdir: workdir.into(),
            order_file: false,
        }
    }

    /// Default proximity tool.
    pub fn proximity(workdir: impl Into<PathBuf>) -> Self {
        Self::new("proximity", "./tools/proximity/proximity", workdir)
    }

    /// Default proximity tool with at-most-one detection.
    pub fn pamo(workdir: impl Into<PathBuf>) -> Self {
        Self {
            order_file: true,
            ..Self::new("PAMO", "sh tools/PAMO.sh", workdir)
        }
    }

    fn run(&self, formula: &Formula) -> Result<Vec<Var>, OrderError> {
        let fail = |reason: String| OrderError::External {
            program: self.program.clone(),
            reason,
        };
        if self.program.is_empty() {
            return Err(fail("no program given".to_string()));
        }

        // Paths handed to the program are relative to `workdir`, its current directory.
        let input = format!("{}.knf", self.name);
        let input_path = self.workdir.join(&input);
        let mut text = Vec::new();
        write_knf(&mut text, formula).map_err(|e| fail(e.to_string()))?;
        fs::write(&input_path, text).map_err(|e| fail(format!("cannot write {}: {}", input_path.display(), e)))?;

        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(&input).current_dir(&self.workdir);
        let order = self.order_file.then(|| format!("{}.order", self.name));
        if let Some(order) = &order {
            let order_path = self.workdir.join(order);
            if order_path.exists() {
                fs::remove_file(&order_path)
                    .map_err(|e| fail(format!("cannot remove stale {}: {}", order_path.display(), e)))?;
            }
            command.arg(order);
        }

        log::info!("Running external ordering `{} {}`", self.program, self.args.join(" "));
        let output = command.output().map_err(|e| fail(e.to_string()))?;
        if !output.status.success() {
            return Err(fail(format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let text = match &order {
            Some(order) => {
                let order_path = self.workdir.join(order);
                fs::read_to_string(&order_path)
                    .map_err(|e| fail(format!("cannot read {}: {}", order_path.display(), e)))?
            }
            None => String::from_utf8(output.stdout).map_err(|e| fail(e.to_string()))?,
        };
        parse_order_sequence(&text)
    }
}

/// How to compute the variable order.
#[derive(Debug, Clone)]
pub enum Strategy {
    Natural,
    Random { seed: u64 },
    Occurrence,
    Graph(GraphConfig),
    External(ExternalStrategy),
    File(PathBuf),
}

impl Strategy {
    pub fn name(&self) -> &str {
        match self {
            Strategy::Natural => "natural",
            Strategy::Random { .. } => "random_fixed",
            Strategy::Occurrence => "occurrence",
            Strategy::Graph(_) => "graph",
            Strategy::External(ext) => &ext.name,
            Strategy::File(_) => "file",
        }
    }
}

/// Strategy names as accepted on the command line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StrategyKind {
    Natural,
    /// `random_fixed`, or `random_fixed_<seed>` with the seed built in.
    Random(Option<u64>),
    Occurrence,
    Graph,
    /// Graph ordering with every community sorted by occurrences.
    GraphOcc,
    Proximity,
    Pamo,
    /// PAMO, falling back to occurrence ordering on formulas of a million clauses or more.
    PamoOccur,
    File,
}

impl StrategyKind {
    /// Occurrence limit implied by the name itself.
    pub fn implied_occ_limit(self) -> Option<usize> {
        match self {
            StrategyKind::PamoOccur => Some(1_000_000),
            _ => None,
        }
    }
}

impl FromStr for StrategyKind {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "natural" => StrategyKind::Natural,
            "random_fixed" => StrategyKind::Random(None),
            "occurrence" | "occurence" => StrategyKind::Occurrence,
            "graph" => StrategyKind::Graph,
            "graphOcc" => StrategyKind::GraphOcc,
            "proximity" => StrategyKind::Proximity,
            "PAMO" => StrategyKind::Pamo,
            "PAMO+Occur" => StrategyKind::PamoOccur,
            "file" => StrategyKind::File,
            _ => {
                let seed = s
                    .strip_prefix("random_fixed_")
                    .and_then(|seed| seed.parse::<u64>().ok())
                    .ok_or_else(|| OrderError::UnknownStrategy(s.to_string()))?;
                StrategyKind::Random(Some(seed))
            }
        };
        Ok(kind)
    }
}

/// Computes the variable order of `formula` with the given strategy.
pub fn compute_order(formula: &Formula, strategy: &Strategy) -> Result<Ordering, OrderError> {
    let ordering = match strategy {
        Strategy::Natural => Ordering::natural(formula.num_vars),
        Strategy::Random { seed } => random_order(formula.num_vars, *seed)?,
        Strategy::Occurrence => occurrence_order(formula)?,
        Strategy::Graph(config) => graph_order(formula, config, &Louvain::default())?,
        Strategy::External(ext) => Ordering::from_sequence(formula.num_vars, ext.run(formula)?)?,
        Strategy::File(path) => {
            let text = fs::read_to_string(path).map_err(|e| OrderError::External {
                program: path.display().to_string(),
                reason: e.to_string(),
            })?;
            Ordering::from_sequence(formula.num_vars, parse_order_sequence(&text)?)?
        }
    };
    log::debug!(
        "Variable order ({}): {:?}",
        strategy.name(),
        ordering.sequence().iter().map(|v| v.id()).collect::<Vec<_>>()
    );
    Ok(ordering)
}

/// Uniform random ranks, reproducible for a given seed.
pub fn random_order(num_vars: u32, seed: u64) -> Result<Ordering, OrderError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut ranks: Vec<u32> = (1..=num_vars).collect();
    ranks.shuffle(&mut rng);
    Ordering::from_ranks(ranks)
}

/// Descending weighted occurrence count, ties broken by ascending id.
pub fn occurrence_order(formula: &Formula) -> Result<Ordering, OrderError> {
    let counts = formula.weighted_occurrences();
    let mut vars: Vec<Var> = formula.variables().collect();
    vars.sort_by_key(|v| std::cmp::Reverse(counts[v.index()]));
    Ordering::from_sequence(formula.num_vars, vars)
}

/// Outcome of the repeated community search.
#[derive(Debug, Clone)]
pub struct CommunitySearch {
    /// Canonical partitions attaining the largest group count, in discovery order.
    pub candidates: Vec<Partition>,
    pub iterations: usize,
    pub timed_out: bool,
}

impl CommunitySearch {
    /// Runs the detector with seeds `0, 1, ...` until `max_iterations` runs are done
    /// or the timeout has elapsed (checked between runs, never during one).
    pub fn run(
        graph: &IncidenceGraph,
        detector: &dyn CommunityDetector,
        max_iterations: usize,
        timeout: Duration,
    ) -> Result<Self, OrderError> {
        let start = Instant::now();
        let mut candidates: Vec<Partition> = Vec::new();
        let mut max_groups = 0;
        let mut iterations = 0;
        let mut timed_out = false;

        for i in 0..max_iterations {
            if start.elapsed() > timeout {
                timed_out = true;
                break;
            }
            let partition = detector.partition(graph, i as u64);
            let partition = Partition::canonical(partition.groups().to_vec());
            iterations += 1;
            log::debug!("Community run {}: {} groups", i, partition.num_groups());

            if partition.num_groups() > max_groups {
                max_groups = partition.num_groups();
                candidates.clear();
                candidates.push(partition);
            } else if partition.num_groups() == max_groups {
                candidates.push(partition);
            }
        }

        if iterations == 0 {
            return Err(if timed_out {
                OrderError::TimeoutExhausted(timeout)
            } else {
                OrderError::NoIterations
            });
        }
        if timed_out {
            log::warn!(
                "Community search timed out after {} of {} runs ({:?})",
                iterations,
                max_iterations,
                timeout
            );
        }
        log::info!(
            "Community search: {} runs, {} groups at most, {} candidates",
            iterations,
            max_groups,
            candidates.len()
        );

        Ok(Self {
            candidates,
            iterations,
            timed_out,
        })
    }

    /// Picks the candidate whose group sizes deviate least from `num_vars / groups`.
    ///
    /// The ideal size comes from the first candidate's group count and is used for all
    /// candidates. On equal deviation the earlier candidate wins.
    pub fn select(&self, num_vars: u32) -> Option<&Partition> {
        let first = self.candidates.first()?;
        let ideal_group_size = num_vars as usize / first.num_groups().max(1);
        let mut best: Option<(&Partition, usize)> = None;
        for candidate in &self.candidates {
            let deviation = candidate.deviation(ideal_group_size);
            if best.map_or(true, |(_, d)| deviation < d) {
                best = Some((candidate, deviation));
            }
        }
        best.map(|(p, _)| p)
    }
}

/// Community-detection order: the selected partition's groups, concatenated.
pub fn graph_order(
    formula: &Formula,
    config: &GraphConfig,
    detector: &dyn CommunityDetector,
) -> Result<Ordering, OrderError> {
    let graph = IncidenceGraph::new(formula, config.multi_edges);
    let search = CommunitySearch::run(&graph, detector, config.max_iterations, config.timeout)?;
    let mut partition = search.select(formula.num_vars).cloned().ok_or(OrderError::NoIterations)?;

    if !partition.covers(formula.num_vars) {
        return Err(OrderError::NotABijection {
            num_vars: formula.num_vars,
            reason: format!("partition {} does not cover every variable", partition),
        });
    }

    if config.sort_variables {
        let counts = formula.clause_occurrences();
        for group in partition.groups_mut() {
            // Groups are sorted by id, so the stable sort keeps ties by ascending id.
            group.sort_by_key(|v| std::cmp::Reverse(counts[v.index()]));
        }
    }

    Ordering::from_sequence(formula.num_vars, partition.concat())
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn ids(vars: &[Var]) -> Vec<u32> {
        vars.iter().map(|v| v.id()).collect()
    }

    fn example() -> Formula {
        let mut formula = Formula::new(4);
        formula.add_clause([1, 2]);
        formula.add_constraint(2, [1, 2, 3, 4]);
        formula
    }

    /// Returns a fixed sequence of partitions, one per seed.
    struct Scripted(Vec<Vec<Vec<u32>>>);

    impl CommunityDetector for Scripted {
        fn partition(&self, _graph: &IncidenceGraph, seed: u64) -> Partition {
            let groups = &self.0[seed as usize % self.0.len()];
            Partition::from_groups(
                groups
                    .iter()
                    .map(|g| g.iter().copied().map(Var::new).collect())
                    .collect(),
            )
        }
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!("occurence".parse::<StrategyKind>().unwrap(), StrategyKind::Occurrence);
        assert_eq!("random_fixed".parse::<StrategyKind>().unwrap(), StrategyKind::Random(None));
        assert_eq!(
            "random_fixed_42".parse::<StrategyKind>().unwrap(),
            StrategyKind::Random(Some(42))
        );
        assert_eq!("PAMO+Occur".parse::<StrategyKind>().unwrap().implied_occ_limit(), Some(1_000_000));
        assert!(matches!(
            "random_fixed_x".parse::<StrategyKind>(),
            Err(OrderError::UnknownStrategy(_))
        ));
        assert!(matches!("sifting".parse::<StrategyKind>(), Err(OrderError::UnknownStrategy(_))));
    }

    #[test]
    fn test_natural_identity() {
        let ordering = compute_order(&example(), &Strategy::Natural).unwrap();
        assert_eq!(ids(ordering.sequence()), vec![1, 2, 3, 4]);
        for v in 1..=4 {
            assert_eq!(ordering.rank(Var::new(v)), v);
        }
    }

    #[test]
    fn test_from_sequence_rejects() {
        let vars = |ids: &[u32]| ids.iter().copied().map(Var::new).collect::<Vec<_>>();
        assert!(Ordering::from_sequence(3, vars(&[1, 2])).is_err());
        assert!(Ordering::from_sequence(3, vars(&[1, 2, 2])).is_err());
        assert!(Ordering::from_sequence(3, vars(&[1, 2, 4])).is_err());
        assert!(Ordering::from_sequence(3, vars(&[3, 1, 2])).is_ok());
    }

    #[test]
    fn test_from_ranks() {
        let ordering = Ordering::from_ranks(vec![3, 1, 2]).unwrap();
        assert_eq!(ids(ordering.sequence()), vec![2, 3, 1]);
        assert!(Ordering::from_ranks(vec![1, 1, 2]).is_err());
        assert!(Ordering::from_ranks(vec![0, 1, 2]).is_err());
    }

    #[test]
    fn test_random_deterministic() {
        let a = random_order(16, 7).unwrap();
        let b = random_order(16, 7).unwrap();
        let c = random_order(16, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.num_vars(), 16);
    }

    #[test]
    fn test_occurrence_example() {
        let ordering = compute_order(&example(), &Strategy::Occurrence).unwrap();
        assert_eq!(ids(ordering.sequence()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_occurrence_higher_count_first() {
        let mut formula = Formula::new(5);
        formula.add_clause([5, 4]);
        formula.add_clause([5, -3]);
        formula.add_clause([-5, 1]);
        formula.add_constraint(3, [2, 3, 4, 1]);
        // counts: 1 -> 1+3, 2 -> 3, 3 -> 1+3, 4 -> 1+3, 5 -> 3
        let ordering = occurrence_order(&formula).unwrap();
        assert_eq!(ids(ordering.sequence()), vec![1, 3, 4, 2, 5]);
    }

    #[test]
    fn test_graph_order_two_cliques() {
        let mut formula = Formula::new(6);
        formula.add_clause([4, 5, 6]);
        formula.add_clause([1, 2, 3]);
        let ordering = graph_order(&formula, &GraphConfig::default(), &Louvain::default()).unwrap();
        assert_eq!(ids(ordering.sequence()), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_search_keeps_ties_of_max_groups() {
        let formula = Formula::new(6);
        let graph = IncidenceGraph::new(&formula, false);
        let detector = Scripted(vec![
            vec![vec![1, 2, 3], vec![4, 5, 6]],
            vec![vec![6, 5], vec![1, 2], vec![3, 4]],
            vec![vec![1], vec![2, 3, 4, 5], vec![6]],
            vec![vec![1, 2, 3, 4, 5, 6]],
        ]);
        let search = CommunitySearch::run(&graph, &detector, 4, Duration::from_secs(60)).unwrap();
        assert_eq!(search.iterations, 4);
        assert_eq!(search.candidates.len(), 2);
        assert_eq!(search.candidates[0].to_string(), "{1 2 | 3 4 | 5 6}");
        // ideal = 6 / 3 = 2: deviations 0 and 1 + 2 + 1
        assert_eq!(search.select(6).unwrap().to_string(), "{1 2 | 3 4 | 5 6}");
    }

    #[test]
    fn test_select_uses_first_candidate_ideal() {
        let group = |ids: &[u32]| ids.iter().copied().map(Var::new).collect::<Vec<_>>();
        let search = CommunitySearch {
            candidates: vec![
                Partition::canonical(vec![group(&[1]), group(&[2, 3, 4, 5, 6, 7])]),
                Partition::canonical(vec![group(&[1, 2, 3]), group(&[4, 5, 6, 7])]),
            ],
            iterations: 2,
            timed_out: false,
        };
        // ideal = 7 / 2 = 3: deviations 2 + 3 = 5 and 0 + 1 = 1
        assert_eq!(search.select(7).unwrap(), &search.candidates[1]);
    }

    #[test]
    fn test_select_first_on_equal_deviation() {
        let group = |ids: &[u32]| ids.iter().copied().map(Var::new).collect::<Vec<_>>();
        let search = CommunitySearch {
            candidates: vec![
                Partition::canonical(vec![group(&[1, 2]), group(&[3, 4])]),
                Partition::canonical(vec![group(&[1, 3]), group(&[2, 4])]),
            ],
            iterations: 2,
            timed_out: false,
        };
        assert_eq!(search.select(4).unwrap(), &search.candidates[0]);
    }

    #[test]
    fn test_sort_variables() {
        let mut formula = Formula::new(4);
        formula.add_clause([3, 4]);
        formula.add_clause([4, 1]);
        formula.add_clause([4, -2]);
        let detector = Scripted(vec![vec![vec![1, 2], vec![3, 4]]]);
        let config = GraphConfig {
            max_iterations: 1,
            sort_variables: true,
            ..Default::default()
        };
        // occurrences: 1 -> 1, 2 -> 1, 3 -> 1, 4 -> 3
        let ordering = graph_order(&formula, &config, &detector).unwrap();
        assert_eq!(ids(ordering.sequence()), vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_incomplete_partition_rejected() {
        let formula = Formula::new(3);
        let detector = Scripted(vec![vec![vec![1, 2]]]);
        let config = GraphConfig {
            max_iterations: 1,
            ..Default::default()
        };
        let err = graph_order(&formula, &config, &detector).unwrap_err();
        assert!(matches!(err, OrderError::NotABijection { .. }));
    }

    #[test]
    fn test_zero_iterations() {
        let formula = Formula::new(3);
        let config = GraphConfig {
            max_iterations: 0,
            ..Default::default()
        };
        let err = graph_order(&formula, &config, &Louvain::default()).unwrap_err();
        assert!(matches!(err, OrderError::NoIterations));

        let graph = IncidenceGraph::new(&formula, false);
        // Elapsed time may still read zero at the first check.
        match CommunitySearch::run(&graph, &Louvain::default(), 5, Duration::ZERO) {
            Err(OrderError::TimeoutExhausted(_)) => {}
            Ok(search) => assert!(search.iterations >= 1),
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn test_order_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.txt");
        fs::write(&path, "4 2\n3 1\n").unwrap();
        let ordering = compute_order(&example(), &Strategy::File(path.clone())).unwrap();
        assert_eq!(ids(ordering.sequence()), vec![4, 2, 3, 1]);

        fs::write(&path, "4 2 3\n").unwrap();
        assert!(compute_order(&example(), &Strategy::File(path)).is_err());
    }

    /// Sleeps through every run, so the timeout is spent after the first one.
    struct Slow(Duration);

    impl CommunityDetector for Slow {
        fn partition(&self, _graph: &IncidenceGraph, _seed: u64) -> Partition {
            std::thread::sleep(self.0);
            Partition::from_groups(vec![vec![Var::new(1), Var::new(2)], vec![Var::new(3)]])
        }
    }

    #[test]
    fn test_timeout_keeps_completed_runs() {
        let formula = Formula::new(3);
        let graph = IncidenceGraph::new(&formula, false);
        let detector = Slow(Duration::from_millis(50));
        let search = CommunitySearch::run(&graph, &detector, 10, Duration::from_millis(10)).unwrap();
        assert_eq!(search.iterations, 1);
        assert!(search.timed_out);
        assert_eq!(search.candidates.len(), 1);

        let config = GraphConfig {
            max_iterations: 10,
            timeout: Duration::from_millis(10),
            ..Default::default()
        };
        let ordering = graph_order(&formula, &config, &detector).unwrap();
        assert_eq!(ids(ordering.sequence()), vec![1, 2, 3]);
    }

    /// An external strategy running `sh <script>` with `body` as the script.
    fn script(dir: &std::path::Path, body: &str) -> ExternalStrategy {
        fs::write(dir.join("order.sh"), body).unwrap();
        ExternalStrategy::new("tool", "sh order.sh", dir)
    }

    #[test]
    fn test_external_stdout() {
        let dir = tempfile::tempdir().unwrap();
        // Fails unless it was handed the formula.
        let ext = script(dir.path(), "grep -q '^p knf 4 2$' \"$1\" || exit 3\necho 4 3\necho 2 1\n");
        let ordering = compute_order(&example(), &Strategy::External(ext)).unwrap();
        assert_eq!(ids(ordering.sequence()), vec![4, 3, 2, 1]);
        assert!(dir.path().join("tool.knf").exists());
    }

    #[test]
    fn test_external_order_file() {
        let dir = tempfile::tempdir().unwrap();
        let ext = ExternalStrategy {
            order_file: true,
            ..script(dir.path(), "echo 2 1 4 3 > \"$2\"\n")
        };
        let ordering = compute_order(&example(), &Strategy::External(ext)).unwrap();
        assert_eq!(ids(ordering.sequence()), vec![2, 1, 4, 3]);
        assert!(ExternalStrategy::pamo(dir.path()).order_file);
    }

    #[test]
    fn test_external_duplicate_id() {
        let dir = tempfile::tempdir().unwrap();
        let ext = script(dir.path(), "echo 1 2 2 4\n");
        let err = compute_order(&example(), &Strategy::External(ext)).unwrap_err();
        assert!(matches!(err, OrderError::NotABijection { .. }));
    }

    #[test]
    fn test_external_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let ext = script(dir.path(), "echo 1 2 4\n");
        let err = compute_order(&example(), &Strategy::External(ext)).unwrap_err();
        assert!(matches!(err, OrderError::NotABijection { .. }));
    }

    #[test]
    fn test_external_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ext = script(dir.path(), "echo 1 2 3 4\necho broken >&2\nexit 3\n");
        let err = compute_order(&example(), &Strategy::External(ext)).unwrap_err();
        match err {
            OrderError::External { program, reason } => {
                assert_eq!(program, "sh");
                assert!(reason.contains("broken"), "{}", reason);
            }
            e => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn test_external_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let ext = ExternalStrategy::new("missing", "./definitely-not-here", dir.path());
        let err = compute_order(&example(), &Strategy::External(ext)).unwrap_err();
        assert!(matches!(err, OrderError::External { .. }));
    }
}
