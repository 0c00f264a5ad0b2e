//! Weave CLI

use std::path::PathBuf;

use weavec::{load_config, report, tracing_setup, Pipeline, PipelineError};

fn main() {
    tracing_setup::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut dump: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut module: Option<String> = None;
    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        if (arg == "--config" || arg == "--module") && i + 1 < args.len() {
            if arg == "--config" {
                config_path = Some(PathBuf::from(&args[i + 1]));
            } else {
                module = Some(args[i + 1].clone());
            }
            i += 2;
            continue;
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            config_path = Some(PathBuf::from(path));
        } else if let Some(name) = arg.strip_prefix("--module=") {
            module = Some(name.to_string());
        } else if !arg.starts_with('-') && dump.is_none() {
            dump = Some(PathBuf::from(arg));
        } else {
            eprintln!("error: unexpected argument `{arg}`");
            print_usage();
            std::process::exit(1);
        }
        i += 1;
    }

    let Some(dump) = dump else {
        eprintln!("error: missing dump path");
        print_usage();
        std::process::exit(1);
    };

    let mut config = match config_path {
        Some(path) => load_config(&path).unwrap_or_else(|error| fail(&error)),
        None => weavec::GeneratorConfig::default(),
    };
    if let Some(name) = module {
        config = config.with_module_name(name);
    }

    let output = Pipeline::new(config)
        .run_file(&dump)
        .unwrap_or_else(|error| fail(&error));

    print!("{}", report::render_tree(&output.graph, &output.tree));
    for diagnostic in &output.diagnostics {
        eprintln!("{diagnostic}");
    }
    if output.has_errors() {
        std::process::exit(1);
    }
}

fn fail(error: &PipelineError) -> ! {
    match error.to_diagnostic() {
        Some(diagnostic) => eprintln!("{diagnostic}"),
        None => eprintln!("error: {error}"),
    }
    std::process::exit(1);
}

fn print_usage() {
    eprintln!("Weave binding generator");
    eprintln!();
    eprintln!("Usage: weavec <dump.jsonl> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <file.json>   Generator configuration and annotations");
    eprintln!("  --module <name>        Module name (overrides the configuration)");
    eprintln!();
    eprintln!("Set RUST_LOG (e.g. RUST_LOG=weave_bind=debug) for stage tracing.");
}
