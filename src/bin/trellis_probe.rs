use std::env;
use std::time::Instant;

use sysinfo::{get_current_pid, ProcessExt, ProcessRefreshKind, System, SystemExt};
use trellis_search::models::table::TableModel;
use trellis_search::{LazySearch, NaiveSearch, ViterbiSearch};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("trellis_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    eprintln!("\n{}", "=".repeat(80));
    eprintln!("Trellis Search Scaling Probe");
    eprintln!("{}", "=".repeat(80));
    eprintln!();
    eprintln!("Runs both search engines over synthetic trellises of growing length and");
    eprintln!("width to verify:");
    eprintln!(
        "  • Correctness: engines agree on winners and costs (up to length {})",
        options.verify_limit
    );
    eprintln!("  • Performance: wall-clock time and memory usage scale appropriately");
    eprintln!("  • Recovery: the lazy engine survives periodic breakages");
    eprintln!();
    eprintln!("Metrics explained:");
    eprintln!("  • wall_s: Wall-clock time in seconds (lower is better)");
    eprintln!("  • rss_delta_kib: Memory delta in KiB (measures memory efficiency)");
    eprintln!("  • status: 'passed' = engines agree, 'not_checked' = too large to verify");
    eprintln!();
    eprintln!("{}", "=".repeat(80));
    eprintln!();

    let mut sys = System::new();
    let mut measurements = Vec::new();

    eprintln!("[1/3] Lazy engine sweep...");
    measurements.extend(run_engine_sweep("lazy", &options, &mut sys));
    eprintln!();

    eprintln!("[2/3] Naive engine sweep...");
    measurements.extend(run_engine_sweep("naive", &options, &mut sys));
    eprintln!();

    eprintln!("[3/3] Lazy engine with periodic breakages...");
    measurements.extend(run_breakage_sweep(&mut sys));
    eprintln!();

    print_summary(&measurements, &options);
    options.format.write(&measurements);
}

struct Options {
    format: OutputFormat,
    verify_limit: usize,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Csv;
        let mut verify_limit = 512usize;

        while let Some(arg) = args.next() {
            let arg = arg.into();
            if arg == "--help" || arg == "-h" {
                Options::print_help();
                std::process::exit(0);
            } else if let Some(value) = arg.strip_prefix("--format=") {
                format = OutputFormat::from_str(value)?;
            } else if arg == "--format" {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value after --format".to_string())?
                    .into();
                format = OutputFormat::from_str(&value)?;
            } else if let Some(value) = arg.strip_prefix("--verify-limit=") {
                verify_limit = value
                    .parse::<usize>()
                    .map_err(|_| "verify limit must be a positive integer".to_string())?;
            } else if arg == "--verify-limit" {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value after --verify-limit".to_string())?
                    .into();
                verify_limit = value
                    .parse::<usize>()
                    .map_err(|_| "verify limit must be a positive integer".to_string())?;
            } else {
                return Err(format!("unrecognized argument '{arg}'"));
            }
        }

        Ok(Self {
            format,
            verify_limit,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --bin trellis_probe [-- <options>]

Options:
  --format <csv|table>          Output format (default: csv)
  --verify-limit <N>            Maximum trellis length to cross-check between engines (default: 512)
  -h, --help                    Print this help message

Examples:
  cargo run --bin trellis_probe
  cargo run --bin trellis_probe -- --format table --verify-limit 256
"
        );
    }
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Csv,
    Table,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, measurements: &[Measurement]) {
        match self {
            OutputFormat::Csv => write_csv(measurements),
            OutputFormat::Table => write_table(measurements),
        }
    }
}

#[derive(Clone)]
struct Measurement {
    scenario: &'static str,
    size_desc: String,
    wall_s: f64,
    rss_delta_kib: u64,
    status: Status,
    detail: Option<String>,
}

#[derive(Clone, Copy)]
enum Status {
    NotChecked,
    Passed,
    Failed,
}

impl Status {
    fn label(&self) -> &'static str {
        match self {
            Status::NotChecked => "not_checked",
            Status::Passed => "passed",
            Status::Failed => "failed",
        }
    }
}

const WIDTH: usize = 8;
const LENGTHS: &[usize] = &[64, 256, 1024, 4096, 16384, 65536];

/// Deterministic synthetic trellis: `length` columns of `width` candidates,
/// non-negative patterned costs, most pairwise edges present. `break_every`
/// drops every edge into columns at that period to force restarts.
fn build_model(length: usize, width: usize, break_every: Option<usize>) -> TableModel {
    let mut model = TableModel::new();
    let mut keys = vec![0usize; length * width];
    for (i, key) in keys.iter_mut().enumerate() {
        let (t, j) = (i / width, i % width);
        *key = model.add_candidate(Some(((t * 7 + j * 13) % 11) as f64));
    }
    for t in 1..length {
        if break_every.is_some_and(|period| t % period == 0) {
            continue;
        }
        for i in 0..width {
            for j in 0..width {
                if (i + j + t) % 13 == 0 {
                    continue;
                }
                let cost = ((i * 5 + j * 3 + t) % 17) as f64 / 2.0;
                model.link(keys[(t - 1) * width + i], keys[t * width + j], cost);
            }
        }
    }
    model
}

fn populate<F>(length: usize, width: usize, mut add: F)
where
    F: FnMut(usize, usize),
{
    for t in 0..length {
        for j in 0..width {
            add(t, t * width + j);
        }
    }
}

fn run_engine_sweep(
    engine: &'static str,
    options: &Options,
    sys: &mut System,
) -> Vec<Measurement> {
    let total = LENGTHS.len();
    LENGTHS
        .iter()
        .enumerate()
        .map(|(idx, &length)| {
            eprint!("      [{}/{}] length {length}... ", idx + 1, total);
            let m = measure(engine, format!("len={length} width={WIDTH}"), sys, || {
                let model = build_model(length, WIDTH, None);
                let (winner, cost, path_len) = match engine {
                    "lazy" => {
                        let mut search = LazySearch::new(model);
                        populate(length, WIDTH, |t, key| {
                            search.add_state(t, key);
                        });
                        let winner = search.search_winner(length - 1);
                        let cost = winner.and_then(|id| search.accumulated_cost(id));
                        (winner, cost, search.search_path(length - 1).count())
                    }
                    _ => {
                        let mut search = NaiveSearch::new(model);
                        populate(length, WIDTH, |t, key| {
                            search.add_state(t, key);
                        });
                        let winner = search.search_winner(length - 1);
                        let cost = winner.and_then(|id| search.accumulated_cost(id));
                        (winner, cost, search.search_path(length - 1).count())
                    }
                };
                if winner.is_none() || path_len != length {
                    return (
                        Status::Failed,
                        Some(format!("winner={winner:?} path_len={path_len}")),
                    );
                }
                if length > options.verify_limit {
                    return (Status::NotChecked, cost.map(|c| format!("cost={c:.1}")));
                }
                verify_engines_agree(length)
            });
            eprintln!("{:.3}s", m.wall_s);
            m
        })
        .collect()
}

fn run_breakage_sweep(sys: &mut System) -> Vec<Measurement> {
    let total = LENGTHS.len();
    LENGTHS
        .iter()
        .enumerate()
        .map(|(idx, &length)| {
            eprint!("      [{}/{}] length {length}... ", idx + 1, total);
            let m = measure(
                "lazy_breakage",
                format!("len={length} width={WIDTH} break_every=50"),
                sys,
                || {
                    let model = build_model(length, WIDTH, Some(50));
                    let mut search = LazySearch::new(model);
                    populate(length, WIDTH, |t, key| {
                        search.add_state(t, key);
                    });
                    let winner = search.search_winner(length - 1);
                    let path_len = search.search_path(length - 1).count();
                    if winner.is_none() || path_len != length {
                        return (
                            Status::Failed,
                            Some(format!("winner={winner:?} path_len={path_len}")),
                        );
                    }
                    (Status::Passed, Some(format!("path_len={path_len}")))
                },
            );
            eprintln!("{:.3}s", m.wall_s);
            m
        })
        .collect()
}

/// Rebuild the trellis in both engines and compare winners and costs at
/// every time step.
fn verify_engines_agree(length: usize) -> (Status, Option<String>) {
    let mut lazy = LazySearch::new(build_model(length, WIDTH, None));
    populate(length, WIDTH, |t, key| {
        lazy.add_state(t, key);
    });
    let mut naive = NaiveSearch::new(build_model(length, WIDTH, None));
    populate(length, WIDTH, |t, key| {
        naive.add_state(t, key);
    });

    lazy.search_winner(length - 1);
    naive.search_winner(length - 1);
    for t in 0..length {
        let (lw, nw) = (lazy.search_winner(t), naive.search_winner(t));
        if lw != nw {
            return (
                Status::Failed,
                Some(format!("winner mismatch at t={t}: lazy={lw:?} naive={nw:?}")),
            );
        }
        let lc = lw.and_then(|id| lazy.accumulated_cost(id));
        let nc = nw.and_then(|id| naive.accumulated_cost(id));
        if lc != nc {
            return (
                Status::Failed,
                Some(format!("cost mismatch at t={t}: lazy={lc:?} naive={nc:?}")),
            );
        }
    }
    (Status::Passed, None)
}

fn measure<F>(scenario: &'static str, size_desc: String, sys: &mut System, compute: F) -> Measurement
where
    F: FnOnce() -> (Status, Option<String>),
{
    let before = rss_kib(sys);
    let start = Instant::now();
    let (status, detail) = compute();
    let duration = start.elapsed();
    let after = rss_kib(sys);

    Measurement {
        scenario,
        size_desc,
        wall_s: duration.as_secs_f64(),
        rss_delta_kib: after.saturating_sub(before),
        status,
        detail,
    }
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    if let Some(p) = sys.process(get_current_pid().unwrap()) {
        p.memory()
    } else {
        0
    }
}

fn write_csv(measurements: &[Measurement]) {
    println!("scenario,size_desc,wall_s,rss_delta_kib,status,detail");
    for m in measurements {
        let detail = m
            .detail
            .as_ref()
            .map(|s| s.replace('"', "'"))
            .unwrap_or_default();
        println!(
            "{},{},{:.3},{},{},\"{}\"",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.status.label(),
            detail
        );
    }
}

fn write_table(measurements: &[Measurement]) {
    println!(
        "{:<14} {:<34} {:>8} {:>14} {:<12}",
        "scenario", "size", "wall_s", "rss_delta_kib", "status"
    );
    for m in measurements {
        println!(
            "{:<14} {:<34} {:>8.3} {:>14} {:<12}",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.status.label()
        );
    }
}

fn print_summary(measurements: &[Measurement], options: &Options) {
    eprintln!("\n{}", "=".repeat(80));
    eprintln!("Probe Summary");
    eprintln!("{}", "=".repeat(80));

    let mut passed = 0;
    let mut failed = 0;
    let mut not_checked = 0;
    for m in measurements {
        match m.status {
            Status::Passed => passed += 1,
            Status::Failed => failed += 1,
            Status::NotChecked => not_checked += 1,
        }
    }

    eprintln!("  Total runs: {}", measurements.len());
    eprintln!("  ✓ Passed: {passed}");
    eprintln!("  ✗ Failed: {failed}");
    eprintln!(
        "  ○ Not checked (length > {}): {not_checked}",
        options.verify_limit
    );

    if failed > 0 {
        eprintln!("\nFailed runs:");
        for m in measurements {
            if matches!(m.status, Status::Failed) {
                eprintln!(
                    "  ✗ {} ({}): {}",
                    m.scenario,
                    m.size_desc,
                    m.detail.as_deref().unwrap_or("no detail")
                );
            }
        }
        std::process::exit(1);
    }
    eprintln!();
}
