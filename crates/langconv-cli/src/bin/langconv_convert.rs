// langconv-convert: Convert text between language variants.
//
// Reads text from stdin (one line per input) and prints each line
// converted to the destination variant, serialized as an HTML fragment.
// Spans that cannot be converted losslessly are wrapped in elements
// carrying round-trip metadata.
//
// Usage:
//   langconv-convert --base CODE --dest CODE [OPTIONS]
//
// Options:
//   -m, --machine-path PATH  Directory containing compiled .pfst machines
//   --base CODE              Base language code (zh selects the Chinese machine)
//   --dest CODE              Destination variant code
//   --invert CODE            Original variant code (defaults to --dest,
//                            which makes the converter guess per span)
//   --codes A,B,C            Variant codes for a generic base language
//   -h, --help               Print help

use std::io::{self, BufRead, Write};

use langconv_core::Document;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (machine_path, args) = langconv_cli::parse_machine_path(&args);

    if langconv_cli::wants_help(&args) {
        println!("langconv-convert: Convert text between language variants.");
        println!();
        println!("Usage: langconv-convert --base CODE --dest CODE [OPTIONS]");
        println!();
        println!("Reads text from stdin (one line per input) and prints each line");
        println!("converted to the destination variant as an HTML fragment.");
        println!();
        println!("Options:");
        println!("  -m, --machine-path PATH  Directory containing compiled .pfst machines");
        println!("  --base CODE              Base language code");
        println!("  --dest CODE              Destination variant code");
        println!("  --invert CODE            Original variant code (default: --dest)");
        println!("  --codes A,B,C            Variant codes for a generic base language");
        println!("  -h, --help               Print this help");
        return;
    }

    let (base, args) = langconv_cli::parse_option(&args, "base");
    let (dest, args) = langconv_cli::parse_option(&args, "dest");
    let (invert, args) = langconv_cli::parse_option(&args, "invert");
    let (codes, _args) = langconv_cli::parse_option(&args, "codes");

    let base = base.unwrap_or_else(|| langconv_cli::fatal("--base is required"));
    let dest = dest.unwrap_or_else(|| langconv_cli::fatal("--dest is required"));
    let invert = invert.unwrap_or_else(|| dest.clone());
    let codes: Vec<String> = codes
        .map(|c| c.split(',').map(str::to_owned).collect())
        .unwrap_or_else(|| vec![base.clone()]);

    let dir = langconv_cli::find_machine_dir(machine_path.as_deref())
        .unwrap_or_else(|e| langconv_cli::fatal(&e));
    let machine = langconv_cli::load_machine(dir, &base, &codes)
        .unwrap_or_else(|e| langconv_cli::fatal(&e));

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

        let mut doc = Document::new();
        match machine.convert(&mut doc, &line, &dest, &invert) {
            Ok(fragment) => {
                let _ = writeln!(out, "{}", doc.serialize_fragment(&fragment));
            }
            Err(e) => langconv_cli::fatal(&format!("conversion failed: {e}")),
        }
    }
}
