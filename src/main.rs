use clap::{ArgAction, Parser};
use lc3_vm::emulator::Emulator;
use lc3_vm::errors::ExecutionError;
use lc3_vm::terminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Runs assembled LC-3 program images, starting execution at x3000.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Program images: big endian `.ORIG` address followed by big endian words
    #[arg(required = true)]
    images: Vec<PathBuf>,
    /// Log more details to stderr, repeat for more (`LC3_LOG` overrides)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env("LC3_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(emu: &mut Emulator) -> Result<(), ExecutionError> {
    let lock = terminal::set_terminal_raw();
    let console = emu.console_mut();
    console.set_translate_newlines(lock.is_active());
    if !lock.is_active() {
        console.read_from_stdin();
    }
    emu.execute()
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut emu = Emulator::new();
    for image in &args.images {
        if let Err(e) = emu.load_image_file(image) {
            eprintln!("Failed to load image: {e}");
            return ExitCode::FAILURE;
        }
    }

    match run(&mut emu) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
