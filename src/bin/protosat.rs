use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;

use protosat::bench::{format_of, run_dataset};
use protosat::cnf::dimacs::write_file;
use protosat::instance::{coloring, random_graph};
use protosat::solver::varisat::solve_embedded;
use protosat::{
    LitTranslator, Numbering, SatEncoding, SatFormat, Solution, SolverConfig, SolverResult,
    SolverRunner, Status,
};

#[derive(Debug, Parser)]
#[command(name = "protosat")]
#[command(about = "Build, emit and solve DIMACS SAT/MaxSAT instances")]
struct Cli {
    /// -v info, -vv debug, -vvv trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Emit a random graph-coloring instance.
    Gen {
        #[arg(long, default_value_t = 10)]
        nodes: usize,
        #[arg(long, default_value_t = 20)]
        edges: usize,
        #[arg(long, default_value_t = 3)]
        colors: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Add soft clauses penalizing each used color (WCNF output).
        #[arg(long)]
        minimize: bool,
        /// Number literals sorted by (variable, index).
        #[arg(long)]
        sorted: bool,
        #[arg(long)]
        emit: PathBuf,
        /// Solve in-process after writing (CNF only).
        #[arg(long)]
        check: bool,
    },
    /// Run an external solver on a CNF/WCNF file.
    Solve {
        path: PathBuf,
        #[arg(long)]
        solver: PathBuf,
        #[arg(long, value_enum)]
        format: Option<SatFormat>,
        /// Seconds, 0 for no limit.
        #[arg(long, default_value_t = 0)]
        timeout: u64,
        #[arg(long)]
        time_bin: Option<PathBuf>,
        #[arg(long, default_value = ".")]
        working_dir: PathBuf,
        /// Print the raw solver output.
        #[arg(long)]
        raw: bool,
        /// Extra solver arguments, after `--`.
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Decode a saved solver output file.
    Decode {
        path: PathBuf,
        #[arg(long, value_enum, default_value = "cnf")]
        format: SatFormat,
    },
    /// Solve every .cnf/.wcnf file under a directory and write a CSV.
    Bench {
        dir: PathBuf,
        #[arg(long)]
        solver: PathBuf,
        #[arg(long, default_value_t = 0)]
        timeout: u64,
        #[arg(long)]
        time_bin: Option<PathBuf>,
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        progress: bool,
        #[arg(last = true)]
        args: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Cmd::Gen {
            nodes,
            edges,
            colors,
            seed,
            minimize,
            sorted,
            emit,
            check,
        } => gen_cmd(nodes, edges, colors, seed, minimize, sorted, &emit, check)?,
        Cmd::Solve {
            path,
            solver,
            format,
            timeout,
            time_bin,
            working_dir,
            raw,
            args,
        } => {
            let format = match format.or_else(|| format_of(&path)) {
                Some(f) => f,
                None => bail!("can't infer format of {}, pass --format", path.display()),
            };
            let mut config = SolverConfig::new(solver)
                .with_timeout_secs(timeout)
                .with_working_dir(working_dir)
                .with_args(args);
            if let Some(bin) = time_bin {
                config = config.with_time_bin(bin);
            }
            let result = SolverRunner::new(config).solve(&path, format);
            print_result(&result, raw);
        }
        Cmd::Decode { path, format } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let sol = Solution::parse(format, &text)?;
            print_solution(&sol);
        }
        Cmd::Bench {
            dir,
            solver,
            timeout,
            time_bin,
            csv,
            progress,
            args,
        } => {
            let mut config = SolverConfig::new(solver)
                .with_timeout_secs(timeout)
                .with_args(args);
            if let Some(bin) = time_bin {
                config = config.with_time_bin(bin);
            }
            let rows = run_dataset(&dir, &SolverRunner::new(config), &csv, progress)?;
            let solved = rows.iter().filter(|r| r.status == "success").count();
            println!("BENCH: {}/{} solved, csv={}", solved, rows.len(), csv.display());
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn gen_cmd(
    nodes: usize,
    edges: usize,
    colors: usize,
    seed: u64,
    minimize: bool,
    sorted: bool,
    emit: &Path,
    check: bool,
) -> Result<()> {
    let graph = random_graph(nodes, edges, seed)?;
    let inst = coloring(nodes, &graph, colors, minimize)?;
    let numbering = if sorted {
        Numbering::Sorted
    } else {
        Numbering::Registration
    };
    let translator = LitTranslator::from_encoding(&inst.encoding, numbering)?;
    let enc = SatEncoding::from_proto(&inst.encoding, &translator)?;
    let format = if minimize { SatFormat::Wcnf } else { SatFormat::Cnf };
    write_file(emit, &enc, format)?;
    info!(path = %emit.display(), "instance written");
    println!(
        "GEN: wrote {} | format={} vars={} clauses={} top={}",
        emit.display(),
        format.extension(),
        enc.literal_count(),
        enc.clause_count(),
        enc.top()
    );

    if check {
        if minimize {
            bail!("--check solves plain CNF only, drop --minimize");
        }
        let sol = solve_embedded(&enc)?;
        print_solution(&sol);
        if sol.status == Status::OptimumFound {
            let colors = inst.decode(&sol, &translator)?;
            let shown = colors
                .iter()
                .map(|c| c.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()))
                .collect::<Vec<_>>()
                .join(" ");
            println!("colors: {shown}");
        }
    }
    Ok(())
}

fn print_result(result: &SolverResult, raw: bool) {
    if raw {
        println!("{}", result.output);
    }
    println!(
        "SOLVE: status={} real_ms={} user_ms={} sys_ms={}",
        result.status.as_str(),
        opt(result.times.real_ms),
        opt(result.times.user_ms),
        opt(result.times.sys_ms)
    );
    if let Some(err) = &result.error {
        println!("error: {err}");
    }
    if let Some(sol) = &result.solution {
        print_solution(sol);
    }
}

fn print_solution(sol: &Solution) {
    println!(
        "answer={} cost={} vars={}",
        sol.status,
        sol.cost,
        sol.assignments.len()
    );
}

fn opt(v: Option<u64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "-".to_string())
}
