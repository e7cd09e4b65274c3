use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use simplelog::LevelFilter;

use knf_order::encode::Scheme;
use knf_order::order::{GraphConfig, StrategyKind};
use knf_order::pipeline::{self, OutputFormat, RunConfig, StrategyOptions};
use knf_order::writer::write_file;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// More log output (repeat for more).
    #[arg(long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Order the variables, then compile every cardinality constraint to CNF.
    Encode {
        /// Input KNF formula.
        #[arg(value_name = "KNF")]
        input: PathBuf,

        /// Output formula.
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Encoding scheme.
        #[arg(short = 'e', long = "encoding", value_name = "SCHEME", default_value = "seqcounter")]
        scheme: Scheme,

        /// Relabel constrained variables by rank instead of reordering literals.
        #[arg(short, long)]
        rename: bool,

        /// Write weighted CNF instead of encoding the constraints.
        #[arg(short = 'm', long)]
        wcnf: bool,

        #[command(flatten)]
        order: OrderArgs,
    },

    /// Print the variable order, or the formula with reordered constraints.
    Order {
        #[arg(value_name = "KNF")]
        input: PathBuf,

        /// Output file (stdout if omitted).
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Emit the formula with constraint literals in rank order.
        #[arg(long)]
        reorder: bool,

        #[command(flatten)]
        order: OrderArgs,
    },

    /// Print the coverage curve of the order as a pgfplots line.
    Coverage {
        #[arg(value_name = "KNF")]
        input: PathBuf,

        #[command(flatten)]
        order: OrderArgs,
    },
}

#[derive(Debug, Args)]
struct OrderArgs {
    /// Ordering strategy: natural, random_fixed[_SEED], occurrence, graph, graphOcc,
    /// proximity, PAMO, PAMO+Occur, file.
    #[arg(short = 'v', long = "ordering", value_name = "STRATEGY", default_value = "natural")]
    strategy: StrategyKind,

    /// Random seed.
    #[arg(short, long, value_name = "INT", default_value_t = 0)]
    seed: u64,

    /// Community detection runs of the graph strategy.
    #[arg(long, value_name = "INT", default_value_t = 50)]
    iterations: usize,

    /// Time budget of the graph strategy.
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    timeout: u64,

    /// Sort every community by occurrences.
    #[arg(long)]
    sort_variables: bool,

    /// Weight incidence graph edges by the number of shared clauses.
    #[arg(long)]
    multi_edges: bool,

    /// Use occurrence ordering when the header declares at least this many clauses (0: never).
    #[arg(short = 'l', long, value_name = "INT", default_value_t = 0)]
    occ_limit: usize,

    /// Read the order from a file (overrides the strategy).
    #[arg(short = 't', long, value_name = "FILE")]
    order_file: Option<PathBuf>,

    /// Command line of the external ordering program. It gets the formula path and prints
    /// the order on stdout; for PAMO it also gets an order file path and writes the order there.
    #[arg(long, value_name = "CMD")]
    external: Option<String>,

    /// Working directory of the external ordering program.
    #[arg(long, value_name = "DIR", default_value = ".")]
    workdir: PathBuf,
}

impl OrderArgs {
    fn config(&self) -> color_eyre::Result<RunConfig> {
        let options = StrategyOptions {
            seed: self.seed,
            graph: GraphConfig {
                max_iterations: self.iterations,
                timeout: Duration::from_secs(self.timeout),
                sort_variables: self.sort_variables,
                multi_edges: self.multi_edges,
            },
            external: self.external.clone(),
            workdir: self.workdir.clone(),
            order_file: self.order_file.clone(),
        };
        let kind = if self.order_file.is_some() {
            StrategyKind::File
        } else {
            self.strategy
        };
        let occ_limit = match kind.implied_occ_limit() {
            Some(limit) if self.occ_limit == 0 => limit,
            _ => self.occ_limit,
        };
        Ok(RunConfig {
            strategy: options.strategy(kind)?,
            occ_limit,
            ..Default::default()
        })
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => LevelFilter::Warn,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    match cli.command {
        Command::Encode {
            input,
            output,
            scheme,
            rename,
            wcnf,
            order,
        } => {
            let config = RunConfig {
                scheme,
                rename,
                format: if wcnf { OutputFormat::Wcnf } else { OutputFormat::Cnf },
                ..order.config()?
            };
            pipeline::run(&input, &output, &config)?;
        }
        Command::Order {
            input,
            output,
            reorder,
            order,
        } => {
            let rendered = pipeline::run_order(&input, &order.config()?, reorder)?;
            match output {
                Some(path) => write_file(path, |w| w.write_all(&rendered))?,
                None => std::io::stdout().lock().write_all(&rendered)?,
            }
        }
        Command::Coverage { input, order } => {
            println!("{}", pipeline::run_coverage(&input, &order.config()?)?);
        }
    }

    log::info!("Done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
