// langconv-bracket: Show how a bracketing machine partitions text.
//
// Reads text from stdin (one line per input) and prints the alternating
// safe/unsafe segments found by one bracketing machine:
//   S: segment    (converts losslessly)
//   U: segment    (needs round-trip markup)
//
// Usage:
//   langconv-bracket --dest CODE --invert CODE [OPTIONS]
//
// Options:
//   -m, --machine-path PATH  Directory containing compiled .pfst machines
//   --dest CODE              Destination variant code
//   --invert CODE            Original variant code (defaults to --dest)
//   -h, --help               Print help

use std::io::{self, BufRead, Write};

use langconv_fst::{DirSource, Fst, FstSource};
use langconv_machine::fst_machine::brack_name;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (machine_path, args) = langconv_cli::parse_machine_path(&args);

    if langconv_cli::wants_help(&args) {
        println!("langconv-bracket: Show how a bracketing machine partitions text.");
        println!();
        println!("Usage: langconv-bracket --dest CODE --invert CODE [OPTIONS]");
        println!();
        println!("Reads text from stdin (one line per input). Prints:");
        println!("  S: segment    (converts losslessly)");
        println!("  U: segment    (needs round-trip markup)");
        println!();
        println!("Options:");
        println!("  -m, --machine-path PATH  Directory containing compiled .pfst machines");
        println!("  --dest CODE              Destination variant code");
        println!("  --invert CODE            Original variant code (default: --dest)");
        println!("  -h, --help               Print this help");
        return;
    }

    let (dest, args) = langconv_cli::parse_option(&args, "dest");
    let (invert, _args) = langconv_cli::parse_option(&args, "invert");

    let dest = dest.unwrap_or_else(|| langconv_cli::fatal("--dest is required"));
    let invert = invert.unwrap_or_else(|| dest.clone());

    let dir = langconv_cli::find_machine_dir(machine_path.as_deref())
        .unwrap_or_else(|e| langconv_cli::fatal(&e));
    let name = brack_name(&dest, &invert);
    let source = DirSource::new(dir);
    let bytes = source
        .load_bytes(&name)
        .unwrap_or_else(|e| langconv_cli::fatal(&format!("failed to load {name}: {e}")));
    let fst = Fst::compile(name, bytes, true)
        .unwrap_or_else(|e| langconv_cli::fatal(&format!("invalid machine: {e}")));

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("error reading stdin: {e}");
                break;
            }
        };

        match fst.split(&line, 0, line.len()) {
            Ok(segments) => {
                for (i, segment) in segments.iter().enumerate() {
                    if segment.is_empty() {
                        continue;
                    }
                    let tag = if i % 2 == 0 { "S" } else { "U" };
                    let _ = writeln!(out, "{tag}: {segment}");
                }
            }
            Err(e) => langconv_cli::fatal(&format!("bracketing failed: {e}")),
        }
    }
}
