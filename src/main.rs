//! CLI entrypoint for `autocrack`.
//!
//! Validates the hash file and wordlist, asks the cracking tool which modes
//! fit the hashes, then attacks each mode in isolation while the crack log
//! filters out `(hash, mode)` pairs already cracked in earlier runs. Prints
//! a summary of this run and optionally writes CSV/TXT exports.
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use autocrack::{
    corpus::load_hashes,
    crack_log::{CrackLog, DEFAULT_LOG_FILE},
    engine::{Engine, Interrupted, Progress},
    export::{save_cracked_csv, save_hash_clear_txt},
    interrupt,
    io::DEFAULT_MMAP_THRESHOLD_BYTES,
    report::{render_candidates, render_mode_label, render_mode_result, render_summary},
    tool::{CrackTool, DEFAULT_ATTACK_MODE, DEFAULT_HASHCAT_BIN, Hashcat},
};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::{LevelFilter, error};

const EXIT_FATAL: i32 = 1;
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser, Debug)]
#[command(
    name = "autocrack",
    version,
    about = "Run hashcat across every compatible hash mode, skipping pairs already cracked"
)]
struct Args {
    /// File with one hash per line ('#' starts a comment)
    hash_file: PathBuf,

    /// Wordlist for the dictionary attack
    wordlist: PathBuf,

    /// Path to the crack log
    #[arg(long = "log-file", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Cracking tool executable
    #[arg(long = "hashcat", default_value = DEFAULT_HASHCAT_BIN)]
    hashcat: PathBuf,

    /// Attack mode passed to the cracking tool
    #[arg(short = 'a', long = "attack-mode", default_value_t = DEFAULT_ATTACK_MODE)]
    attack_mode: u8,

    /// Directory for per-mode temporary files (defaults to the system temp dir)
    #[arg(long = "temp-dir")]
    temp_dir: Option<PathBuf>,

    /// Override mmap threshold in bytes for reading the hash file. If zero, disable mmap.
    #[arg(long = "mmap-threshold", default_value_t = DEFAULT_MMAP_THRESHOLD_BYTES)]
    mmap_threshold: u64,

    /// Path to the output directory for CSV/TXT exports
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Suppress banner and final summary (per-mode lines still print)
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

const ASCII_TITLE: &str = r#"
   __ _ _   _| |_ ___   ___ _ __ __ _  ___| | __
  / _` | | | | __/ _ \ / __| '__/ _` |/ __| |/ /
 | (_| | |_| | || (_) | (__| | | (_| | (__|   <
  \__,_|\__,_|\__\___/ \___|_|  \__,_|\___|_|\_\
"#;

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn verify_input_file(kind: &str, path: &Path) -> Result<()> {
    let meta = match fs::metadata(path) {
        Ok(m) if m.is_file() => m,
        _ => bail!("{} '{}' does not exist or is empty", kind, path.display()),
    };
    if meta.len() == 0 {
        bail!("{} '{}' does not exist or is empty", kind, path.display());
    }
    Ok(())
}

fn verify_inputs(args: &Args) -> Result<()> {
    verify_input_file("hash file", &args.hash_file)?;
    verify_input_file("wordlist", &args.wordlist)?;
    if let Some(dir) = &args.temp_dir {
        if !dir.is_dir() {
            bail!("temp dir not found: {}", dir.display());
        }
    }
    Ok(())
}

fn fatal(msg: impl std::fmt::Display) -> ! {
    error!("{}", msg);
    std::process::exit(EXIT_FATAL);
}

fn main() {
    // Usage errors share the fatal exit code; help and version still exit 0.
    let args = match Args::try_parse() {
        Ok(a) => a,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(EXIT_FATAL);
        }
    };
    init_logger(args.verbose);
    match args.color {
        ColorChoice::Always => {
            colored::control::set_override(true);
        }
        ColorChoice::Never => {
            colored::control::set_override(false);
        }
        ColorChoice::Auto => {}
    }
    if let Err(e) = verify_inputs(&args) {
        fatal(e);
    }
    interrupt::install();

    let mut crack_log = CrackLog::load(&args.log_file);
    log::info!(
        "crack log {} holds {} entr(ies)",
        crack_log.path().display(),
        crack_log.len()
    );

    if !args.quiet {
        println!("{}", ASCII_TITLE.bold().green());
    }
    let tool = Hashcat::new(&args.hashcat).with_attack_mode(args.attack_mode);
    println!(
        "→ Enumerating possible modes with `{} --show {}` …",
        tool.program().display(),
        args.hash_file.display()
    );
    let modes = match tool.enumerate(&args.hash_file) {
        Ok(m) => m,
        Err(e) => fatal(e),
    };
    if interrupt::requested() {
        std::process::exit(EXIT_INTERRUPTED);
    }
    if modes.is_empty() {
        fatal("no candidate modes found; either the hash file is invalid or the tool's output format changed");
    }

    let threshold = if args.mmap_threshold == 0 {
        u64::MAX
    } else {
        args.mmap_threshold
    };
    let hashes = match load_hashes(&args.hash_file, threshold) {
        Ok(h) if !h.is_empty() => h,
        Ok(_) => fatal(format!(
            "hash file '{}' contains no hashes",
            args.hash_file.display()
        )),
        Err(e) => fatal(format!("failed to load hashes: {:#}", e)),
    };

    print!("{}", render_candidates(&modes));
    println!("\n→ Starting isolated crack attempts, one subset per mode …\n");

    let temp_dir = args.temp_dir.clone().unwrap_or_else(std::env::temp_dir);
    let mut engine = Engine::with_temp_dir(&tool, &mut crack_log, &args.wordlist, temp_dir);
    let run = engine.run(&hashes, &modes, |p| match p {
        Progress::Starting { mode, .. } => {
            print!("{}", render_mode_label(mode));
            let _ = std::io::stdout().flush();
        }
        Progress::Finished(report) => println!("{}", render_mode_result(report)),
    });
    let summary = match run {
        Ok(s) => s,
        Err(e) if e.downcast_ref::<Interrupted>().is_some() => {
            println!();
            error!("interrupted; crack log is up to date");
            std::process::exit(EXIT_INTERRUPTED);
        }
        Err(e) => {
            println!();
            fatal(format!("{:#}", e));
        }
    };

    if !args.quiet {
        print!("{}", render_summary(&summary, &hashes, &crack_log));
    }

    if let Some(outdir) = args.output {
        if let Err(e) = fs::create_dir_all(&outdir) {
            fatal(format!(
                "failed to create output directory {}: {}",
                outdir.display(),
                e
            ));
        }
        let ts = chrono::Local::now().format("%Y.%m.%d_%H.%M.%S");
        let csv = outdir.join(format!("autocrack_cracked_{}.csv", ts));
        let txt = outdir.join(format!("autocrack_hash_clear_{}.txt", ts));
        if let Err(e) = save_cracked_csv(&summary, &csv) {
            fatal(format!("failed to write {}: {}", csv.display(), e));
        }
        if let Err(e) = save_hash_clear_txt(&crack_log, &txt) {
            fatal(format!("failed to write {}: {}", txt.display(), e));
        }
    }

    if !args.quiet {
        println!("\nAll done :D");
    }
}
