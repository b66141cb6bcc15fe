use itertools::Itertools;
use mimalloc::MiMalloc;
use std::io::{self, Read};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use truth_tree::{ProverConfig, Session};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const USAGE: &str = "usage: truth-tree [--greedy] [SENTENCE...]

Sentences are read from the arguments, or from stdin when none are given. Separate them with
newlines or `;`; the last one is the conclusion.";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let (flags, sentences): (Vec<_>, Vec<_>) =
        std::env::args().skip(1).partition(|arg| arg.starts_with("--"));
    let mut config = ProverConfig::default();
    for flag in &flags {
        match flag.as_str() {
            "--greedy" => config = ProverConfig::bruteforce(false),
            "--help" => {
                println!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            _ => {
                eprintln!("unknown flag {flag}\n\n{USAGE}");
                return ExitCode::FAILURE;
            }
        }
    }

    let text = if sentences.is_empty() {
        let mut s = String::new();
        if let Err(err) = io::stdin().read_to_string(&mut s) {
            eprintln!("failed to read stdin: {err}");
            return ExitCode::FAILURE;
        }
        s
    } else {
        sentences.join("\n")
    };

    let mut session = Session::new();
    let job = match session.submit(&text, config) {
        Ok(job) => job,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    println!("symbols: {}", job.argument().symbols().iter().join(", "));
    let result = match job.wait() {
        Ok(result) => result,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    print!("{}", result.tree.outline(result.top_node));
    println!(
        "{} ({} nodes, {} steps)",
        if result.valid { "valid" } else { "invalid" },
        result.node_count(),
        result.steps
    );
    ExitCode::SUCCESS
}
