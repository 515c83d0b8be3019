//! headergen CLI
//!
//! Usage:
//!   headergen [OPTIONS]
//!
//! Options:
//!   -b, --base <DIR>      Directory layout paths are resolved against
//!   -l, --layout <FILE>   Layout file (TOML format)
//!   -c, --config <FILE>   Template configuration (JSON), relative to the base
//!   -w, --warnings        Show every unresolved or circular reference
//!   -v, --verbose         Debug logging on stderr
//!   -h, --help            Print help

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use headergen::source::{FsSource, TemplateSource};
use headergen::{GeneratedFile, GenerationReport, Generator, Layout, Mode, TemplateConfig};

#[derive(Parser)]
#[command(name = "headergen")]
#[command(about = "Generate modular and single-file headers from templates")]
struct Cli {
    /// Directory layout paths are resolved against
    #[arg(short, long)]
    base: Option<PathBuf>,

    /// Layout file (TOML format)
    #[arg(short, long)]
    layout: Option<PathBuf>,

    /// Template configuration (JSON), relative to the base; defaults to the layout's `config_file`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show every unresolved or circular reference after generation
    #[arg(short, long)]
    warnings: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load layout
    let mut layout = match &cli.layout {
        Some(path) => match Layout::from_file(path) {
            Ok(layout) => layout,
            Err(e) => {
                eprintln!("Error loading layout '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Layout::default(),
    };
    if let Some(base) = cli.base {
        layout = layout.with_base_dir(base);
    }
    if let Some(config_file) = cli.config {
        layout = layout.with_config_file(config_file);
    }

    // Load fragments and headers
    let config_path = layout.config_path();
    let config = match TemplateConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            let source = std::fs::read_to_string(&config_path).unwrap_or_default();
            eprintln!("{}", e.format(&source, &config_path.display().to_string()));
            std::process::exit(1);
        }
    };

    let report = match Generator::new(&config, &layout, FsSource).run_with(print_progress) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.warnings {
        print_diagnostics(&report);
    }

    println!("Header generation complete!");
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "headergen=debug"
    } else {
        "headergen=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_progress(file: &GeneratedFile) {
    match file.mode {
        Mode::Modular => println!("Generated {}", file.path.display()),
        Mode::Uber => println!("Generated uber header: {}", file.path.display()),
    }
}

/// Print each diagnostic against the text of the template it came from
fn print_diagnostics(report: &GenerationReport) {
    for diagnostic in report.diagnostics() {
        match FsSource.load(Path::new(&diagnostic.origin)) {
            Ok(source) => eprint!("{}", diagnostic.format(&source)),
            Err(_) => eprintln!("warning: {}", diagnostic),
        }
    }
}
