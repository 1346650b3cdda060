use clap::Parser;
use fsdb_codegen::{grammar, GeneratorConfig};
use std::path::PathBuf;
use std::process;

/// fsdb: generate a typed data-access layer from path grammars
#[derive(Parser, Debug)]
#[command(name = "fsdb", version, about)]
struct Cli {
    /// YAML file providing package, root, output and statements
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Package (module) name of the generated code [default: dummy]
    #[arg(short, long)]
    package: Option<String>,

    /// Root folder name [default: data]
    #[arg(short, long)]
    root: Option<String>,

    /// Output directory [default: ./dummy]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Grammar file with one statement per line
    #[arg(short, long)]
    grammar: Option<PathBuf>,

    /// Grammar statements (e.g. "/group/:id/meta -> Meta")
    statements: Vec<String>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("ERROR:{e}");
            process::exit(1);
        }
    }
}

/// Returns whether every statement was generated.
fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let config = resolve_config(cli)?;
    log::debug!(
        "Generating {} statement(s) into {}",
        config.statements.len(),
        config.output.display()
    );

    let report = fsdb_codegen::generate(&config)?;
    for rejected in &report.rejected {
        eprintln!("ERROR:{rejected}");
    }
    for path in &report.written {
        println!("{}", path.display());
    }
    Ok(report.is_clean())
}

/// Layer flags over the config file over the defaults.
fn resolve_config(cli: Cli) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::from_yaml_file(path)?,
        None => GeneratorConfig::default(),
    };

    if let Some(package) = cli.package {
        config.package = package;
    }
    if let Some(root) = cli.root {
        config.root = root;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(path) = cli.grammar {
        let statements = grammar::parse_grammar_file(&path)
            .map_err(|e| format!("Failed to read grammar file '{}': {e}", path.display()))?;
        config.statements.extend(statements);
    }
    config.statements.extend(cli.statements);

    Ok(config)
}
