use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use log::LevelFilter;

use mpl2dzn::{Config, Mpl, ProblemSpec, Session};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser)]
#[command(about = "Convert an MPL problem file to DZN and run MiniZinc on it")]
struct Cli {
    /// Problem file (.mpl, or .json)
    input: Option<PathBuf>,
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Solver executable
    #[arg(long)]
    minizinc: Option<PathBuf>,
    /// Solver backend passed as --solver
    #[arg(long)]
    solver: Option<String>,
    /// Wall-clock limit in milliseconds
    #[arg(long)]
    time_limit: Option<u64>,
    /// Invoke the solver with only the model and data files
    #[arg(long, conflicts_with_all = ["solver", "time_limit"])]
    plain: bool,
    /// Directory holding the model and the generated data file
    #[arg(long)]
    work_dir: Option<PathBuf>,
    /// Model file name, relative to the work directory
    #[arg(long)]
    model: Option<PathBuf>,
    /// Data file name, relative to the work directory
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write the data file and stop
    #[arg(long)]
    no_solve: bool,
    /// Print the parsed problem as JSON and stop
    #[arg(long, conflicts_with = "mpl")]
    dump_json: bool,
    /// Print the problem in canonical MPL form and stop
    #[arg(long)]
    mpl: bool,
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> anyhow::Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        Ok(self.apply(config))
    }

    /// Layers the command line over a loaded config: `--plain` first, then each explicit flag.
    fn apply(&self, mut config: Config) -> Config {
        if self.plain {
            config = config.plain()
        }
        if let Some(minizinc) = &self.minizinc {
            config.minizinc = minizinc.clone()
        }
        if let Some(solver) = &self.solver {
            config.solver = Some(solver.clone())
        }
        if let Some(limit) = self.time_limit {
            config.time_limit_ms = Some(limit)
        }
        if let Some(dir) = &self.work_dir {
            config.work_dir = dir.clone()
        }
        if let Some(model) = &self.model {
            config.model_file = model.clone()
        }
        if let Some(output) = &self.output {
            config.data_file = output.clone()
        }
        config
    }
}

fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<ExitCode> {
    if cli.dump_json || cli.mpl {
        let Some(input) = &cli.input else {
            anyhow::bail!(mpl2dzn::Error::MissingInputPath)
        };
        let spec = ProblemSpec::read(input)?;
        if cli.dump_json {
            writeln!(out, "{}", serde_json::to_string_pretty(&spec)?)?
        } else {
            write!(out, "{}", Mpl(&spec))?
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = cli.config()?;
    if cli.no_solve {
        let session = Session::without_probe(&config);
        let data = session.convert(cli.input.as_deref())?;
        writeln!(out, "{}", data.display())?;
        return Ok(ExitCode::SUCCESS);
    }

    let session = Session::start(&config)?;
    let outcome = session.run(cli.input.as_deref())?;
    if outcome.is_success() {
        write!(out, "{}", outcome.render())?;
        Ok(ExitCode::SUCCESS)
    } else {
        eprint!("{}", outcome.render());
        Ok(ExitCode::FAILURE)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    run(&cli, &mut io::stdout().lock())
}
