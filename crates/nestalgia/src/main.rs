//! Headless NES emulator binary.
//!
//! Runs a ROM for a number of frames and optionally writes a PNG
//! screenshot, an execution trace, or a JSON state snapshot.

use std::error::Error;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use nestalgia::{capture, trace, Nes, NesConfig};

struct CliArgs {
    rom_path: Option<PathBuf>,
    frames: u32,
    screenshot_path: Option<PathBuf>,
    record_dir: Option<PathBuf>,
    trace_path: Option<PathBuf>,
    state_path: Option<PathBuf>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        rom_path: None,
        frames: 60,
        screenshot_path: None,
        record_dir: None,
        trace_path: None,
        state_path: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rom" => {
                i += 1;
                cli.rom_path = args.get(i).map(PathBuf::from);
            }
            "--frames" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.frames = s.parse().unwrap_or(60);
                }
            }
            "--screenshot" => {
                i += 1;
                cli.screenshot_path = args.get(i).map(PathBuf::from);
            }
            "--record" => {
                i += 1;
                cli.record_dir = args.get(i).map(PathBuf::from);
            }
            "--trace" => {
                i += 1;
                cli.trace_path = args.get(i).map(PathBuf::from);
            }
            "--state" => {
                i += 1;
                cli.state_path = args.get(i).map(PathBuf::from);
            }
            "--help" | "-h" => {
                eprintln!("Usage: nestalgia --rom <file> [OPTIONS]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --rom <file>         iNES ROM file (.nes)");
                eprintln!("  --frames <n>         Number of frames to run [default: 60]");
                eprintln!("  --screenshot <file>  Save a PNG of the final frame");
                eprintln!("  --record <dir>       Record every frame as a PNG");
                eprintln!("  --trace <file>       Write an execution trace ('-' for stdout)");
                eprintln!("  --state <file>       Dump a JSON state snapshot at the end");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn run(cli: &CliArgs) -> Result<(), Box<dyn Error>> {
    let Some(rom_path) = &cli.rom_path else {
        return Err("no ROM given (use --rom <file>)".into());
    };
    let rom_data = fs::read(rom_path)?;
    let mut nes = Nes::new(&NesConfig { rom_data })?;

    if let Some(dir) = &cli.record_dir {
        capture::record(&mut nes, dir, cli.frames)?;
    } else if let Some(trace_path) = &cli.trace_path {
        let mut out: Box<dyn Write> = if trace_path.as_os_str() == "-" {
            Box::new(io::stdout().lock())
        } else {
            Box::new(BufWriter::new(fs::File::create(trace_path)?))
        };
        for _ in 0..cli.frames {
            trace::trace_frame(&mut nes, &mut out)?;
        }
        out.flush()?;
    } else {
        for _ in 0..cli.frames {
            nes.run_frame()?;
        }
    }

    if let Some(path) = &cli.screenshot_path {
        capture::save_screenshot(&nes, path)?;
    }
    if let Some(path) = &cli.state_path {
        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &nes.snapshot())?;
    }

    Ok(())
}

fn main() {
    let cli = parse_args();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
