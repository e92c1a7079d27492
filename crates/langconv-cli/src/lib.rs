// langconv-cli: shared utilities for CLI tools.

use std::path::PathBuf;
use std::process;

use langconv_fst::DirSource;
use langconv_machine::{
    FstReplacementMachine, NullReplacementMachine, ReplacementMachine, ZhReplacementMachine,
};

/// Default machine directory name within compiled machine packages.
const MACHINE_SUBDIR: &str = "fst";

/// Find the directory holding compiled `.pfst` machines.
///
/// Search order:
/// 1. `machine_path` argument (if provided)
/// 2. `LANGCONV_MACHINE_PATH` environment variable
/// 3. `~/.langconv/fst`
/// 4. `/usr/share/langconv/fst`
/// 5. Current working directory
pub fn find_machine_dir(machine_path: Option<&str>) -> Result<PathBuf, String> {
    let search_paths = build_search_paths(machine_path);

    for dir in &search_paths {
        if dir.is_dir() {
            return Ok(dir.clone());
        }
    }

    Err(format!(
        "could not find a machine directory in any of the search paths:\n{}",
        search_paths
            .iter()
            .map(|p| format!("  - {}", p.display()))
            .collect::<Vec<_>>()
            .join("\n")
    ))
}

/// Build the list of directories to search for compiled machines.
fn build_search_paths(machine_path: Option<&str>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Explicit path from argument
    if let Some(p) = machine_path {
        paths.push(PathBuf::from(p));
    }

    // 2. LANGCONV_MACHINE_PATH environment variable
    if let Ok(env_path) = std::env::var("LANGCONV_MACHINE_PATH") {
        paths.push(PathBuf::from(&env_path));
        paths.push(PathBuf::from(&env_path).join(MACHINE_SUBDIR));
    }

    // 3. Home directory path
    if let Some(home) = home_dir() {
        paths.push(home.join(".langconv").join(MACHINE_SUBDIR));
    }

    // 4. System path
    paths.push(PathBuf::from("/usr/share/langconv").join(MACHINE_SUBDIR));

    // 5. Current directory (fallback for local development)
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd);
    }

    paths
}

/// Get the user's home directory.
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Build the replacement machine for `base` from the machines in `dir`.
///
/// `zh` selects the Chinese machine with its restricted code-pair table.
/// A base with fewer than two codes gets the identity machine. Anything
/// else loads a generic FST machine over the listed codes.
pub fn load_machine(
    dir: PathBuf,
    base: &str,
    codes: &[String],
) -> Result<Box<dyn ReplacementMachine>, String> {
    let source = DirSource::new(dir);
    if base == "zh" {
        return ZhReplacementMachine::new(&source)
            .map(|m| Box::new(m) as Box<dyn ReplacementMachine>)
            .map_err(|e| format!("failed to load zh machines: {e}"));
    }
    if codes.len() < 2 {
        return Ok(Box::new(NullReplacementMachine::new(base)));
    }
    let codes: Vec<&str> = codes.iter().map(String::as_str).collect();
    FstReplacementMachine::new(&source, base, &codes)
        .map(|m| Box::new(m) as Box<dyn ReplacementMachine>)
        .map_err(|e| format!("failed to load {base} machines: {e}"))
}

/// Parse a `--machine-path=PATH` or `-m PATH` argument from command line args.
///
/// Returns `(machine_path, remaining_args)`.
pub fn parse_machine_path(args: &[String]) -> (Option<String>, Vec<String>) {
    let mut machine_path = None;
    let mut remaining = Vec::new();
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(val) = arg.strip_prefix("--machine-path=") {
            machine_path = Some(val.to_string());
        } else if arg == "--machine-path" || arg == "-m" {
            if i + 1 < args.len() {
                machine_path = Some(args[i + 1].clone());
                skip_next = true;
            } else {
                eprintln!("error: {} requires a value", arg);
                process::exit(1);
            }
        } else {
            remaining.push(arg.clone());
        }
    }

    (machine_path, remaining)
}

/// Parse a `--NAME=VALUE` or `--NAME VALUE` option, returning the value
/// and the remaining args.
pub fn parse_option(args: &[String], name: &str) -> (Option<String>, Vec<String>) {
    let flag = format!("--{name}");
    let prefix = format!("--{name}=");
    let mut value = None;
    let mut remaining = Vec::new();
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(val) = arg.strip_prefix(&prefix) {
            value = Some(val.to_string());
        } else if *arg == flag {
            if i + 1 < args.len() {
                value = Some(args[i + 1].clone());
                skip_next = true;
            } else {
                eprintln!("error: {} requires a value", arg);
                process::exit(1);
            }
        } else {
            remaining.push(arg.clone());
        }
    }

    (value, remaining)
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}
