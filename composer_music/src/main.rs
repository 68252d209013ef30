// Melody composer CLI entry point.
//
// Runs one composition request and reports the result. The remaining
// arguments are joined into the command string, so both
// `compose compose C minor` and `compose "compose C minor"` work.
//
// Usage:
//   compose [OPTIONS] <command words...>
//     --config <PATH>       JSON config file (see config.rs)
//     --output-dir <DIR>    Override the output directory
//     --json                Print the full result as JSON
//
// Requires OPENAI_API_KEY in the environment.

use std::path::PathBuf;

use composer_music::{Composer, ComposerConfig};

struct Args {
    config_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    json: bool,
    command: String,
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = parse_args();

    let mut config = match &args.config_path {
        Some(path) => ComposerConfig::load(path).unwrap_or_else(|e| {
            eprintln!("{e}");
            std::process::exit(1);
        }),
        None => ComposerConfig::default(),
    };
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    let composer = Composer::from_config(config);
    let result = composer.compose_from_command(&args.command);

    if args.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize result: {e}");
                std::process::exit(1);
            }
        }
    } else {
        println!("{}", result.message);
        if let Some(path) = &result.filepath {
            println!("Wrote {path}");
        }
    }

    if !result.success {
        std::process::exit(1);
    }
}

/// Parse command-line arguments with plain `std::env::args()` matching.
fn parse_args() -> Args {
    let mut args = Args {
        config_path: None,
        output_dir: None,
        json: false,
        command: String::new(),
    };
    let argv: Vec<String> = std::env::args().collect();
    let mut words: Vec<&str> = Vec::new();
    let mut i = 1;

    while i < argv.len() {
        match argv[i].as_str() {
            "--config" => {
                i += 1;
                args.config_path = argv.get(i).map(PathBuf::from).or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                });
            }
            "--output-dir" => {
                i += 1;
                args.output_dir = argv.get(i).map(PathBuf::from).or_else(|| {
                    eprintln!("--output-dir requires a path");
                    std::process::exit(1);
                });
            }
            "--json" => args.json = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            word => words.push(word),
        }
        i += 1;
    }

    if words.is_empty() {
        print_usage();
        std::process::exit(1);
    }
    args.command = words.join(" ");
    args
}

fn print_usage() {
    println!("Usage: compose [OPTIONS] <command words...>");
    println!();
    println!("Example: compose compose C minor");
    println!();
    println!("Options:");
    println!("  --config <PATH>       JSON config file");
    println!("  --output-dir <DIR>    Output directory (default: output)");
    println!("  --json                Print the result as JSON");
    println!("  --help, -h            Show this help");
    println!();
    println!("Environment:");
    println!("  OPENAI_API_KEY        Credential for the completion service");
}
