use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::error;
use rayon::prelude::*;

use sokoban_solver::{
    parse_collection, parse_level, replay, solve_with, Level, SolveResult, SolverConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Level files in XSB format; a file may hold several levels
    #[arg(required_unless_present = "text")]
    files: Vec<PathBuf>,

    /// Inline level, rows separated by newlines or a literal `\n`
    #[arg(short, long)]
    text: Vec<String>,

    /// TOML file with `max_nodes` and `time_limit_ms`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after expanding this many states
    #[arg(long)]
    max_nodes: Option<u64>,

    /// Stop after this many milliseconds per level
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Replay each solution and check that it solves the level
    #[arg(long)]
    verify: bool,

    /// Worker threads; defaults to one per core
    #[arg(short, long)]
    jobs: Option<usize>,
}

#[derive(Debug)]
struct Task {
    label: String,
    level: Level,
}

fn load_config(args: &Args) -> Result<SolverConfig> {
    let mut config = match &args.config {
        Some(path) => SolverConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SolverConfig::default(),
    };
    if args.max_nodes.is_some() {
        config.max_nodes = args.max_nodes;
    }
    if args.time_limit_ms.is_some() {
        config.time_limit_ms = args.time_limit_ms;
    }
    config.validate()?;
    Ok(config)
}

fn load_text_task(index: usize, text: &str) -> Result<Task> {
    let text = text.replace("\\n", "\n");
    let instance =
        parse_level(&text).with_context(|| format!("Failed to parse inline level #{}", index + 1))?;
    Ok(Task {
        label: format!("text #{}", index + 1),
        level: Level {
            name: None,
            instance,
        },
    })
}

fn load_tasks(path: &PathBuf) -> Result<Vec<Task>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read level file {}", path.display()))?;
    let levels = parse_collection(&text)
        .with_context(|| format!("Failed to parse level file {}", path.display()))?;

    Ok(levels
        .into_iter()
        .enumerate()
        .map(|(i, level)| {
            let label = match &level.name {
                Some(name) => format!("{} #{} ({})", path.display(), i + 1, name),
                None => format!("{} #{}", path.display(), i + 1),
            };
            Task { label, level }
        })
        .collect())
}

fn report(task: &Task, result: &sokoban_solver::Result<SolveResult>, verify: bool) -> bool {
    let map = task.level.instance.map();
    println!(
        "{}: {}x{}, {} boxes",
        task.label,
        map.rows(),
        map.cols(),
        map.goals().len()
    );

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            error!("{}: {}", task.label, e);
            return false;
        }
    };

    let stats = result.stats();
    match result {
        SolveResult::Solved(solution) => {
            println!(
                "  solution ({} pushes, {} moves):",
                solution.pushes,
                solution.moves.len()
            );
            println!("  {}", solution.moves);
            if verify {
                match replay(&task.level.instance, &solution.moves) {
                    Ok(outcome) if outcome.solved => println!("  verified"),
                    Ok(_) => {
                        error!("{}: replay does not solve the level", task.label);
                        return false;
                    }
                    Err(e) => {
                        error!("{}: replay failed: {}", task.label, e);
                        return false;
                    }
                }
            }
        }
        SolveResult::Unsolvable(_) => println!("  no solution"),
        SolveResult::TimedOut(_) => println!("  timed out"),
    }
    println!(
        "  expanded {}, generated {}, deadlocks {}, dead squares {}, {:.3}s",
        stats.expanded,
        stats.generated,
        stats.pruned_deadlock,
        stats.pruned_dead_square,
        stats.elapsed.as_secs_f64()
    );
    true
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let mut ok = true;
    let mut tasks = Vec::new();
    for path in &args.files {
        match load_tasks(path) {
            Ok(mut loaded) => tasks.append(&mut loaded),
            Err(e) => {
                error!("{:#}", e);
                ok = false;
            }
        }
    }
    for (i, text) in args.text.iter().enumerate() {
        match load_text_task(i, text) {
            Ok(task) => tasks.push(task),
            Err(e) => {
                error!("{:#}", e);
                ok = false;
            }
        }
    }

    // Each solve owns its tables and OPEN/CLOSED sets; results keep input order.
    let results: Vec<_> = tasks
        .par_iter()
        .map(|task| solve_with(&task.level.instance, &config))
        .collect();

    for (task, result) in tasks.iter().zip(&results) {
        ok &= report(task, result, args.verify);
    }

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_flag_replaces_files() {
        let args = Args::try_parse_from(["sokoban_solver", "--text", "#####\\n#@$.#\\n#####"])
            .unwrap();
        assert!(args.files.is_empty());
        assert_eq!(args.text.len(), 1);

        let task = load_text_task(0, &args.text[0]).unwrap();
        assert_eq!(task.label, "text #1");
        assert_eq!(task.level.instance.boxes().len(), 1);
        let result = solve_with(&task.level.instance, &SolverConfig::default()).unwrap();
        assert_eq!(result.solution().map(|s| s.moves.as_str()), Some("R"));
    }

    #[test]
    fn test_files_or_text_required() {
        assert!(Args::try_parse_from(["sokoban_solver"]).is_err());
        assert!(Args::try_parse_from(["sokoban_solver", "levels/original.xsb"]).is_ok());
    }

    #[test]
    fn test_bad_inline_level_reports_index() {
        let err = load_text_task(1, "#####\\n#@$x#\\n#####").unwrap_err();
        assert!(format!("{:#}", err).contains("inline level #2"));
    }
}
