//! narrplan CLI: narrative plan validation harness.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use narrplan::config::{BenchConfig, Overrides};
use narrplan::domain::Domain;
use narrplan::pipeline::{Harness, Job};
use narrplan::schema;

#[derive(Parser)]
#[command(name = "narrplan", version, about = "Validate model-written narrative plans with an ASP solver")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/narrplan/config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Solver executable.
    #[arg(long, global = true)]
    solver: Option<String>,

    /// Solver horizon (default: number of actions + 1).
    #[arg(long, global = true)]
    maxstep: Option<usize>,

    /// Kill the solver after this many seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Batch worker threads.
    #[arg(long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

/// Domain and fact-file locations shared by most subcommands.
#[derive(Args)]
struct Target {
    /// Domain: aladdin, western or secret_agent.
    #[arg(long)]
    domain: Domain,

    /// Domain program directory (default: <domains_root>/<domain>/<asp_version>).
    #[arg(long)]
    domain_dir: Option<PathBuf>,

    /// Instance directory.
    #[arg(long)]
    instance_dir: PathBuf,
}

impl Target {
    fn domain_dir(&self, config: &BenchConfig) -> PathBuf {
        self.domain_dir
            .clone()
            .unwrap_or_else(|| config.domain_dir(self.domain))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print a domain's action schema table.
    Actions {
        #[arg(long)]
        domain: Domain,
    },

    /// Print the symbol table loaded for a domain instance.
    Symbols {
        #[command(flatten)]
        target: Target,
    },

    /// Parse a model response and print the parse result.
    Parse {
        #[command(flatten)]
        target: Target,

        /// Response file, or `-` for stdin.
        #[arg(long, default_value = "-")]
        input: PathBuf,
    },

    /// Parse a model response and print the solver constraints.
    Constraints {
        #[command(flatten)]
        target: Target,

        /// Response file, or `-` for stdin.
        #[arg(long, default_value = "-")]
        input: PathBuf,
    },

    /// Run one full evaluation and print the run record.
    Validate {
        #[command(flatten)]
        target: Target,

        /// Response file, or `-` for stdin.
        #[arg(long, default_value = "-")]
        input: PathBuf,
    },

    /// Evaluate many responses against one instance, one JSON record per line.
    Batch {
        #[command(flatten)]
        target: Target,

        /// Response files, or directories of them.
        #[arg(required = true)]
        responses: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = BenchConfig::discover(cli.config.as_deref())?;
    config.apply(&Overrides {
        solver: cli.solver,
        maxstep: cli.maxstep,
        timeout_secs: cli.timeout_secs,
        workers: cli.workers,
    });
    let harness = Harness::new(&config);

    match cli.command {
        Commands::Actions { domain } => {
            println!("{:>4}  {:<22} arity", "id", "name");
            for (id, s) in schema::table(domain) {
                println!("{id:>4}  {:<22} {}", s.name, s.arity);
            }
        }

        Commands::Symbols { target } => {
            let parser = harness.parser(target.domain, &target.domain_dir(&config), &target.instance_dir)?;
            print_json(parser.symbols())?;
        }

        Commands::Parse { target, input } => {
            let parser = harness.parser(target.domain, &target.domain_dir(&config), &target.instance_dir)?;
            let result = parser.parse(&read_input(&input)?);
            print_json(&result)?;
        }

        Commands::Constraints { target, input } => {
            let parser = harness.parser(target.domain, &target.domain_dir(&config), &target.instance_dir)?;
            let result = parser.parse(&read_input(&input)?);
            if let Some(failure) = result.failure() {
                print_json(&result)?;
                miette::bail!("plan did not parse: {:?}: {}", failure.kind, failure.message);
            }
            print!("{}", harness.build_constraints(&parser, &result)?);
        }

        Commands::Validate { target, input } => {
            let job = Job {
                label: input.display().to_string(),
                domain: target.domain,
                domain_dir: target.domain_dir(&config),
                instance_dir: target.instance_dir.clone(),
                response: read_input(&input)?,
            };
            print_json(&harness.evaluate(&job))?;
        }

        Commands::Batch { target, responses } => {
            let domain_dir = target.domain_dir(&config);
            let mut jobs = Vec::new();
            for path in expand(&responses)? {
                jobs.push(Job {
                    label: path.display().to_string(),
                    domain: target.domain,
                    domain_dir: domain_dir.clone(),
                    instance_dir: target.instance_dir.clone(),
                    response: std::fs::read_to_string(&path).into_diagnostic()?,
                });
            }
            for record in harness.evaluate_batch(&jobs) {
                println!("{}", serde_json::to_string(&record).into_diagnostic()?);
            }
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).into_diagnostic()?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).into_diagnostic()
    }
}

/// Files as given; directories contribute their files, sorted.
fn expand(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(path)
                .into_diagnostic()?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            files.sort();
            out.extend(files);
        } else {
            out.push(path.clone());
        }
    }
    Ok(out)
}
