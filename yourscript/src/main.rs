use clap::{Arg, ArgAction, Command};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use yourscript::{Config, ParseOptions, YourScript};

fn main() {
    if let Err(e) = run() {
        eprintln!("yourscript: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("yourscript")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate JavaScript sources between keyword subsets")
        .arg(
            Arg::new("input")
                .help("Source file to translate (default: stdin)")
                .index(1),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .short('f')
                .help("Subset to translate from (default: javascript)"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .short('t')
                .help("Subset to translate to (default: yourscript)"),
        )
        .arg(
            Arg::new("lexems")
                .long("lexems")
                .short('l')
                .help("Folder of <subset>.json keyword files (default: built-in subsets)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("JSON configuration file with lexemsFolder, from and to")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Write the translation to this file instead of stdout")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("list-subsets")
                .long("list-subsets")
                .help("Print the available subsets and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log translation details to stderr")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_tracing(matches.get_flag("verbose"));

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(folder) = matches.get_one::<PathBuf>("lexems") {
        config.lexems_folder = Some(folder.clone());
    }

    let yourscript = YourScript::new(config)?;

    if matches.get_flag("list-subsets") {
        for subset in yourscript.lexems().subsets() {
            println!("{}", subset);
        }
        return Ok(());
    }

    let source = match matches.get_one::<String>("input").map(String::as_str) {
        Some(path) if path != "-" => fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path, e))?,
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let options = ParseOptions {
        from: matches.get_one::<String>("from").cloned(),
        to: matches.get_one::<String>("to").cloned(),
    };
    debug!(?options, bytes = source.len(), "Translating");

    let translated = yourscript.parse(&source, &options)?;

    match matches.get_one::<PathBuf>("output") {
        Some(path) => {
            fs::write(path, &translated)
                .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
            info!(output = %path.display(), "Wrote translation");
        }
        None => io::stdout().write_all(translated.as_bytes())?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "yourscript=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
