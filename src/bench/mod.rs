use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::cnf::SatFormat;
use crate::solver::{ProcessStatus, SolverRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchRow {
    pub path: String,
    pub status: String,
    pub answer: String,
    pub format: String,
    pub real_ms: Option<u64>,
    pub user_ms: Option<u64>,
    pub sys_ms: Option<u64>,
    pub cost: Option<u64>,
    pub vars: Option<usize>,
}

impl BenchRow {
    pub fn csv_header() -> &'static str {
        "path,status,answer,format,real_ms,user_ms,sys_ms,cost,vars"
    }

    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{}",
            esc_csv(&self.path),
            self.status,
            self.answer,
            self.format,
            opt(self.real_ms),
            opt(self.user_ms),
            opt(self.sys_ms),
            opt(self.cost),
            opt(self.vars),
        )
    }
}

/// Solves one `.cnf`/`.wcnf` file; the format comes from the extension.
pub fn run_one(path: &Path, runner: &SolverRunner) -> BenchRow {
    let mut row = BenchRow {
        path: path.to_string_lossy().to_string(),
        status: String::new(),
        answer: String::new(),
        format: String::new(),
        real_ms: None,
        user_ms: None,
        sys_ms: None,
        cost: None,
        vars: None,
    };

    let Some(format) = format_of(path) else {
        row.status = "unsupported".to_string();
        return row;
    };
    row.format = format.extension().to_string();

    let result = runner.solve(path, format);
    row.status = result.status.as_str().to_string();
    row.real_ms = result.times.real_ms;
    row.user_ms = result.times.user_ms;
    row.sys_ms = result.times.sys_ms;
    if let (ProcessStatus::Success, Some(sol)) = (result.status, result.solution.as_ref()) {
        row.answer = sol.status.as_str().to_lowercase().replace(' ', "_");
        row.vars = Some(sol.assignments.len());
        if format == SatFormat::Wcnf {
            row.cost = Some(sol.cost);
        }
    }
    row
}

/// Runs every instance under `dir` (recursively, sorted) and streams one CSV
/// row per instance to `csv_path`.
pub fn run_dataset(
    dir: &Path,
    runner: &SolverRunner,
    csv_path: &Path,
    progress: bool,
) -> std::io::Result<Vec<BenchRow>> {
    let paths = discover_paths(dir)?;
    let mut csv = File::create(csv_path)?;
    writeln!(csv, "{}", BenchRow::csv_header())?;
    csv.flush()?;

    let mut rows = Vec::new();
    for path in paths {
        let row = run_one(&path, runner);
        if progress {
            println!(
                "path={} status={} answer={} real_ms={} cost={}",
                row.path,
                row.status,
                row.answer,
                row.real_ms.unwrap_or_default(),
                opt(row.cost)
            );
        }
        writeln!(csv, "{}", row.to_csv_line())?;
        csv.flush()?;
        rows.push(row);
    }

    info!(instances = rows.len(), csv = %csv_path.display(), "dataset finished");
    Ok(rows)
}

pub fn discover_paths(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::<PathBuf>::new();
    collect_paths(dir, &mut out)?;
    out.sort();
    Ok(out)
}

fn collect_paths(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let p = entry.path();
        if p.is_dir() {
            collect_paths(&p, out)?;
            continue;
        }
        if format_of(&p).is_some() {
            out.push(p);
        }
    }
    Ok(())
}

pub fn format_of(path: &Path) -> Option<SatFormat> {
    path.extension()
        .and_then(|x| x.to_str())
        .and_then(SatFormat::from_extension)
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn esc_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
