use std::{ffi::OsString, fs, io, path::PathBuf, process::ExitCode};

use clap::{CommandFactory, Parser};
use sqbra::{
    error::{Error, ErrorKind},
    interpreter::{checker::write_report, evaluator::core::Context},
    parse_program, run_with_context, tokenize_program,
};
use tracing_subscriber::EnvFilter;

/// Exit status for command-line misuse.
const USAGE_ERROR: u8 = 64;

/// Interpreter for the SquareBracket scripting language.
#[derive(Parser, Debug)]
#[command(name = "sqbra", about, long_about = None, disable_version_flag = true)]
struct Args {
    /// Print the parsed statement tree instead of running the program
    /// (also accepted as `-pt`).
    #[arg(long)]
    print_tree: bool,

    /// Only run the syntax check and print a report.
    #[arg(short, long)]
    check: bool,

    /// Store the numbers following the path in the `args` list.
    #[arg(short = 'I', long)]
    inputs: bool,

    /// Print the interpreter version.
    #[arg(short, long)]
    version: bool,

    /// The program to run.
    path: Option<PathBuf>,

    /// Numbers for the `args` list.
    #[arg(allow_negative_numbers = true)]
    numbers: Vec<f64>,
}

fn main() -> ExitCode {
    install_tracing();
    let args = Args::parse_from(normalized_args());

    if args.version {
        println!("SquareBracket Interpreter (Version {})", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let Some(path) = args.path.as_ref() else {
        eprintln!("No source file given.\n");
        let _ = Args::command().print_help();
        return ExitCode::from(USAGE_ERROR);
    };

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to read the source file '{}': {e}", path.display());
            return exit_code(ErrorKind::Io);
        },
    };

    if args.check {
        return check(&source);
    }

    let mut context = Context::new();
    if args.inputs {
        context = context.with_arguments(args.numbers.clone());
    }

    let result = if args.print_tree {
        parse_program(&source, &mut context).map(|program| println!("{program:#?}"))
    } else {
        run_with_context(&source, &mut context)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

/// Rewrites the single-dash `-pt` spelling into `--print-tree`.
fn normalized_args() -> Vec<OsString> {
    std::env::args_os()
        .map(|arg| {
            if arg == "-pt" {
                OsString::from("--print-tree")
            } else {
                arg
            }
        })
        .collect()
}

fn check(source: &str) -> ExitCode {
    let lines = match tokenize_program(source) {
        Ok(lines) => lines,
        Err(e) => return report(&Error::from(e)),
    };
    match write_report(&lines, &mut io::stdout().lock()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => exit_code(ErrorKind::Syntax),
        Err(e) => {
            eprintln!("Failed to write the report: {e}");
            exit_code(ErrorKind::Io)
        },
    }
}

fn report(error: &Error) -> ExitCode {
    eprintln!("{error}");
    exit_code(error.kind())
}

fn exit_code(kind: ErrorKind) -> ExitCode {
    ExitCode::from(u8::try_from(kind.exit_code()).unwrap_or(1))
}

fn install_tracing() {
    let filter = EnvFilter::try_from_env("SQBRA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter)
                                     .with_writer(io::stderr)
                                     .with_target(false)
                                     .try_init();
}
