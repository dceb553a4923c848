//! Development driver: perft sweeps, divide, bench and one-shot analysis.
//! Deliberately not a UCI front end.

use indicatif::{ProgressBar, ProgressStyle};
use meridian::logger::init_logging;
use meridian::moves::attacks::Attacks;
use meridian::moves::notation::san;
use meridian::moves::perft::{perft, perft_divide};
use meridian::position::{Position, START_FEN};
use meridian::search::{Engine, Limits};
use std::time::{Duration, Instant};

const BENCH_DEPTH: i32 = 7;
const BENCH_FENS: &[&str] = &[
    START_FEN,
    // Kiwipete
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    // Fine 70
    "8/k7/3p4/p2P1p2/P2P1P2/8/8/K7 w - - 0 1",
    // Open middlegame
    "r1bq1rk1/pp2bppp/2n1pn2/3p4/3P4/2NBPN2/PP3PPP/R1BQ1RK1 w - - 0 9",
];

fn main() {
    // Keep the guard alive so the log drains on exit.
    let _log_guard = init_logging("logs", "meridian.log");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut args = args.iter().map(String::as_str);

    match args.next() {
        Some("perft") => {
            let depth = parse_depth(args.next());
            let fen = collect_fen(args);
            run_perft(&fen, depth);
        }
        Some("divide") => {
            let depth = parse_depth(args.next());
            let fen = collect_fen(args);
            run_divide(&fen, depth);
        }
        Some("analyze") => {
            let mut depth = None;
            let mut move_time = None;
            let mut rest = Vec::new();
            let mut iter = args.peekable();
            while let Some(arg) = iter.next() {
                match arg {
                    "--depth" => depth = iter.next().and_then(|v| v.parse().ok()),
                    "--movetime" => {
                        move_time = iter
                            .next()
                            .and_then(|v| v.parse().ok())
                            .map(Duration::from_millis)
                    }
                    other => rest.push(other),
                }
            }
            let fen = if rest.is_empty() {
                START_FEN.to_string()
            } else {
                rest.join(" ")
            };
            run_analyze(&fen, depth, move_time);
        }
        Some("bench") => run_bench(),
        _ => {
            eprintln!("usage: meridian <perft|divide|analyze|bench> ...");
            eprintln!("  perft <depth> [fen]");
            eprintln!("  divide <depth> [fen]");
            eprintln!("  analyze [--depth N] [--movetime MS] [fen]");
            eprintln!("  bench");
        }
    }
}

fn parse_depth(arg: Option<&str>) -> u32 {
    arg.and_then(|v| v.parse().ok()).unwrap_or(5)
}

fn collect_fen<'a>(args: impl Iterator<Item = &'a str>) -> String {
    let rest: Vec<&str> = args.collect();
    if rest.is_empty() {
        START_FEN.to_string()
    } else {
        rest.join(" ")
    }
}

fn load(fen: &str) -> Position {
    match Position::from_fen(fen) {
        Ok(position) => position,
        Err(err) => {
            eprintln!("bad FEN `{}`: {}", fen, err);
            std::process::exit(1);
        }
    }
}

fn run_perft(fen: &str, depth: u32) {
    let mut position = load(fen);
    let mut attacks = Attacks::new();
    println!("{}", position.ascii());

    let bar = ProgressBar::new(depth as u64).with_style(
        ProgressStyle::with_template("perft [{bar:24}] depth {pos}/{len}")
            .expect("static template"),
    );
    for d in 1..=depth {
        let start = Instant::now();
        let nodes = perft(&mut position, &mut attacks, d);
        let secs = start.elapsed().as_secs_f64().max(1e-9);
        bar.inc(1);
        bar.println(format!(
            "depth {:2}  nodes {:>14}  time {:>8.3}s  nps {:>12.0}",
            d,
            nodes,
            secs,
            nodes as f64 / secs
        ));
    }
    bar.finish();
}

fn run_divide(fen: &str, depth: u32) {
    let mut position = load(fen);
    let mut attacks = Attacks::new();
    let rows = perft_divide(&mut position, &mut attacks, depth);
    let mut total = 0u64;
    for (mv, nodes) in &rows {
        println!("{}: {}", mv, nodes);
        total += nodes;
    }
    println!("total: {}", total);
}

fn run_analyze(fen: &str, depth: Option<i32>, move_time: Option<Duration>) {
    let mut position = load(fen);
    let mut attacks = Attacks::new();
    println!("{}", position.ascii());

    let mut engine = Engine::default();
    let mut limits = match move_time {
        Some(duration) => Limits::move_time(duration),
        None => Limits::default(),
    };
    if let Some(depth) = depth {
        limits.depth = depth;
    } else if move_time.is_none() {
        limits.depth = 9;
    }
    engine.set_limits(limits);

    let best = engine.get_move(&mut position);
    for report in engine.reports() {
        println!(
            "depth {:2}  value {:>6}  nodes {:>12}  time {:>7}ms  pv {}",
            report.depth,
            report.value,
            report.nodes,
            report.elapsed.as_millis(),
            report
                .pv
                .iter()
                .map(|mv| mv.to_coordinate())
                .collect::<Vec<_>>()
                .join(" ")
        );
    }
    if best.is_some() {
        println!(
            "best move: {} ({})",
            san(&mut position, &mut attacks, best),
            best
        );
    } else {
        println!("no legal move");
    }
}

fn run_bench() {
    let mut total_nodes = 0u64;
    let start = Instant::now();
    for fen in BENCH_FENS {
        let mut position = load(fen);
        let mut engine = Engine::default();
        engine.set_limits(Limits::depth(BENCH_DEPTH));
        let best = engine.get_move(&mut position);
        total_nodes += engine.nodes();
        println!("{:>72}  best {}  nodes {}", fen, best, engine.nodes());
    }
    let secs = start.elapsed().as_secs_f64().max(1e-9);
    println!(
        "bench: {} nodes in {:.3}s ({:.0} nps)",
        total_nodes,
        secs,
        total_nodes as f64 / secs
    );
}
