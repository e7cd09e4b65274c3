//! One run: parse, order, reorder or rename, encode, write.
//!
//! Everything a run needs travels in a [`RunConfig`]; nothing is kept between runs.

use std::path::{Path, PathBuf};

use crate::coverage::{coverage, format_pgfplot, plot_index};
use crate::encode::{encode_with, Scheme, VarPool};
use crate::error::{Error, OrderError};
use crate::formula::Formula;
use crate::order::{compute_order, ExternalStrategy, GraphConfig, Ordering, Strategy, StrategyKind};
use crate::parser::read_formula_file;
use crate::reorder::{reorder_constraints, RenameMap};
use crate::writer::{write_file, write_knf, write_order, write_wcnf, CompiledFormula};

/// Settings shared by the strategies, used to turn a [`StrategyKind`] into a [`Strategy`].
#[derive(Debug, Clone)]
pub struct StrategyOptions {
    /// Seed for `random_fixed` without a built-in seed.
    pub seed: u64,
    pub graph: GraphConfig,
    /// Command line replacing the default proximity or PAMO program.
    pub external: Option<String>,
    /// Working directory of external programs.
    pub workdir: PathBuf,
    pub order_file: Option<PathBuf>,
}

impl Default for StrategyOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            graph: GraphConfig::default(),
            external: None,
            workdir: PathBuf::from("."),
            order_file: None,
        }
    }
}

impl StrategyOptions {
    pub fn strategy(&self, kind: StrategyKind) -> Result<Strategy, OrderError> {
        // An overriding command keeps the output convention of the tool it replaces.
        let external = |default: ExternalStrategy| match &self.external {
            Some(command) => ExternalStrategy {
                order_file: default.order_file,
                ..ExternalStrategy::new(default.name, command, &self.workdir)
            },
            None => default,
        };
        let strategy = match kind {
            StrategyKind::Natural => Strategy::Natural,
            StrategyKind::Random(seed) => Strategy::Random {
                seed: seed.unwrap_or(self.seed),
            },
            StrategyKind::Occurrence => Strategy::Occurrence,
            StrategyKind::Graph => Strategy::Graph(self.graph.clone()),
            StrategyKind::GraphOcc => Strategy::Graph(GraphConfig {
                sort_variables: true,
                ..self.graph.clone()
            }),
            StrategyKind::Proximity => Strategy::External(external(ExternalStrategy::proximity(&self.workdir))),
            StrategyKind::Pamo | StrategyKind::PamoOccur => {
                Strategy::External(external(ExternalStrategy::pamo(&self.workdir)))
            }
            StrategyKind::File => match &self.order_file {
                Some(path) => Strategy::File(path.clone()),
                None => return Err(OrderError::UnknownStrategy("file (no order file given)".to_string())),
            },
        };
        Ok(strategy)
    }
}

/// Output of the `encode` stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Constraints compiled with the configured scheme.
    #[default]
    Cnf,
    /// Weighted CNF, no encoding.
    Wcnf,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub strategy: Strategy,
    pub scheme: Scheme,
    /// Relabel constrained variables instead of moving literals.
    pub rename: bool,
    /// Formulas declaring at least this many clauses use occurrence ordering
    /// instead of graph or external ordering; 0 disables the limit.
    pub occ_limit: usize,
    pub format: OutputFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Natural,
            scheme: Scheme::SeqCounter,
            rename: false,
            occ_limit: 0,
            format: OutputFormat::Cnf,
        }
    }
}

impl RunConfig {
    /// The strategy actually used on `formula`, after the occurrence limit.
    pub fn effective_strategy(&self, formula: &Formula) -> Strategy {
        let expensive = matches!(self.strategy, Strategy::Graph(_) | Strategy::External(_));
        if expensive && self.occ_limit > 0 && formula.declared_clauses >= self.occ_limit {
            log::info!(
                "{} declared clauses reach the limit of {}, using occurrence ordering instead of {}",
                formula.declared_clauses,
                self.occ_limit,
                self.strategy.name()
            );
            return Strategy::Occurrence;
        }
        self.strategy.clone()
    }
}

/// Computes the ordering of `formula`, honouring the occurrence limit.
pub fn order(formula: &Formula, config: &RunConfig) -> Result<(Strategy, Ordering), Error> {
    let strategy = config.effective_strategy(formula);
    let ordering = compute_order(formula, &strategy)?;
    log::info!("Computed {} ordering over {} variables", strategy.name(), ordering.num_vars());
    Ok((strategy, ordering))
}

/// Applies `ordering` to the constraints, by renaming or by reordering literals.
pub fn arrange(formula: &Formula, ordering: &Ordering, rename: bool) -> Formula {
    if rename {
        RenameMap::new(formula, ordering).rename_formula(formula)
    } else {
        reorder_constraints(formula, ordering)
    }
}

/// Encodes every constraint of an already arranged formula.
pub fn compile(formula: &Formula, scheme: Scheme) -> Result<CompiledFormula, Error> {
    let mut pool = VarPool::new(formula.num_vars);
    let encoded = formula
        .constraints
        .iter()
        .enumerate()
        .map(|(index, constraint)| encode_with(constraint, index, scheme, &mut pool))
        .collect::<Result<Vec<_>, _>>()?;

    let compiled = CompiledFormula {
        num_vars: pool.top(),
        clauses: formula.clauses.clone(),
        encoded,
        passthrough: scheme.is_passthrough(),
    };
    log::info!(
        "Encoded {} constraints with {}: {} auxiliary variables, {} clauses",
        formula.constraints.len(),
        scheme,
        compiled.num_vars - formula.num_vars,
        compiled.num_clauses()
    );
    Ok(compiled)
}

/// Full `encode` run from `input` to `output`.
pub fn run(input: &Path, output: &Path, config: &RunConfig) -> Result<(), Error> {
    let formula = read_formula_file(input)?;
    let (_, ordering) = order(&formula, config)?;
    let arranged = arrange(&formula, &ordering, config.rename);
    match config.format {
        OutputFormat::Cnf => {
            let compiled = compile(&arranged, config.scheme)?;
            write_file(output, |w| compiled.write(w))
        }
        OutputFormat::Wcnf => write_file(output, |w| write_wcnf(w, &arranged)),
    }
}

/// `order` run: the ordering line, or the formula with reordered constraints.
pub fn run_order(input: &Path, config: &RunConfig, reorder: bool) -> Result<Vec<u8>, Error> {
    let formula = read_formula_file(input)?;
    let (_, ordering) = order(&formula, config)?;
    let mut buffer = Vec::new();
    let rendered = if reorder {
        write_knf(&mut buffer, &reorder_constraints(&formula, &ordering))
    } else {
        write_order(&mut buffer, &ordering)
    };
    rendered.map_err(|e| Error::io("write", "<buffer>", e))?;
    Ok(buffer)
}

/// `coverage` run: the coverage curve as a pgfplots line.
pub fn run_coverage(input: &Path, config: &RunConfig) -> Result<String, Error> {
    let formula = read_formula_file(input)?;
    let (_, ordering) = order(&formula, config)?;
    let curve = coverage(&formula, &ordering);
    // Styled by the requested strategy, even after the occurrence-limit fallback.
    Ok(format_pgfplot(&curve, plot_index(config.strategy.name())))
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::encode::Encoded;
    use crate::parser::parse_formula;

    #[test]
    fn test_occ_limit_fallback() {
        let formula = parse_formula("p knf 3 2\n1 2 0\nk 2 1 2 3 0\n").unwrap();
        let config = RunConfig {
            strategy: Strategy::Graph(GraphConfig::default()),
            occ_limit: 2,
            ..Default::default()
        };
        assert!(matches!(config.effective_strategy(&formula), Strategy::Occurrence));

        let config = RunConfig { occ_limit: 3, ..config };
        assert!(matches!(config.effective_strategy(&formula), Strategy::Graph(_)));

        let config = RunConfig {
            strategy: Strategy::Random { seed: 1 },
            occ_limit: 1,
            ..Default::default()
        };
        assert!(matches!(config.effective_strategy(&formula), Strategy::Random { .. }));
    }

    #[test]
    fn test_strategy_options() {
        let options = StrategyOptions {
            seed: 9,
            external: Some("./my-tool --fast".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            options.strategy(StrategyKind::Random(None)).unwrap(),
            Strategy::Random { seed: 9 }
        ));
        assert!(matches!(
            options.strategy(StrategyKind::Random(Some(3))).unwrap(),
            Strategy::Random { seed: 3 }
        ));
        let Strategy::Graph(config) = options.strategy(StrategyKind::GraphOcc).unwrap() else {
            panic!("expected graph strategy");
        };
        assert!(config.sort_variables);
        let Strategy::External(ext) = options.strategy(StrategyKind::Pamo).unwrap() else {
            panic!("expected external strategy");
        };
        assert_eq!(ext.name, "PAMO");
        assert_eq!(ext.program, "./my-tool");
        assert_eq!(ext.args, vec!["--fast".to_string()]);
        assert!(ext.order_file);
        let Strategy::External(ext) = options.strategy(StrategyKind::Proximity).unwrap() else {
            panic!("expected external strategy");
        };
        assert!(!ext.order_file);
        assert!(options.strategy(StrategyKind::File).is_err());
    }

    #[test]
    fn test_compile_tracks_top() {
        let formula = parse_formula("p knf 5 3\n1 -5 0\nk 2 1 2 3 0\nk 2 3 4 5 0\n").unwrap();
        let compiled = compile(&formula, Scheme::Totalizer).unwrap();
        assert!(compiled.num_vars > 5);
        assert_eq!(compiled.clauses.len(), 1);
        assert_eq!(compiled.encoded.len(), 2);
        let max_used = compiled
            .encoded
            .iter()
            .flat_map(|e| match e {
                Encoded::Clauses(clauses) => clauses.clone(),
                Encoded::Constraint(_) => vec![],
            })
            .flatten()
            .map(|l| l.var().id())
            .max()
            .unwrap();
        assert_eq!(max_used, compiled.num_vars);
    }

    #[test]
    fn test_passthrough_header_is_knf() {
        let formula = parse_formula("p knf 3 2\n1 2 0\nk 1 2 3 0\n").unwrap();
        let compiled = compile(&formula, Scheme::Passthrough).unwrap();
        let mut out = Vec::new();
        compiled.write(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "p knf 3 2\n1 2 0\n2 3 0\n");

        let compiled = compile(&formula, Scheme::Totalizer).unwrap();
        assert_eq!(compiled.tag(), "cnf");
    }

    #[test]
    fn test_compile_reports_index() {
        let formula = parse_formula("p knf 3 2\nk 2 1 2 0\nk 4 1 2 3 0\n").unwrap();
        let err = compile(&formula, Scheme::SeqCounter).unwrap_err();
        assert_eq!(err.to_string(), "encode: constraint #1 requires 4 of only 3 literals");
    }

    #[test]
    fn test_arrange() {
        let formula = parse_formula("p knf 4 2\n-4 1 0\nk 2 1 2 4 0\n").unwrap();
        let ordering = Ordering::from_ranks(vec![3, 4, 2, 1]).unwrap();
        let reordered = arrange(&formula, &ordering, false);
        let dimacs = |f: &Formula| f.constraints[0].lits.iter().map(|l| l.to_dimacs()).collect::<Vec<_>>();
        assert_eq!(dimacs(&reordered), vec![4, 1, 2]);
        assert_eq!(reordered.clauses, formula.clauses);

        // by rank: 4 1 2 -> ids 1 2 4
        let renamed = arrange(&formula, &ordering, true);
        assert_eq!(dimacs(&renamed), vec![1, 2, 4]);
        assert_eq!(renamed.clauses[0].iter().map(|l| l.to_dimacs()).collect::<Vec<_>>(), vec![-1, 2]);
    }
}
