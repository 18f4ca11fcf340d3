//! `inspector`: evaluate queries against a demo trading algorithm

mod config;
mod demo;
mod render;

use clap::{Parser, Subcommand};
use config::{Config, OutputFormat};
use demo::DemoAlgorithm;
use inspector_capabilities::{resolve, Platform};
use inspector_command::{Command, CommandContext, CommandResult, InspectorCommand};
use inspector_eval::Evaluator;
use inspector_synth::synthesize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config as EditorConfig, Editor};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read config `{path}`: {source}")]
    ConfigRead {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config `{path}`: {source}")]
    ConfigParse {
        path: String,
        source: serde_json::Error,
    },

    #[error("invalid command: {0}")]
    Command(serde_json::Error),

    #[error("failed to encode result: {0}")]
    Encode(serde_json::Error),

    #[error("line editor failed: {0}")]
    Readline(#[from] ReadlineError),
}

#[derive(Parser)]
#[command(name = "inspector", version, about = "Evaluate expressions against a live algorithm")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the detected platform (windows, unix)
    #[arg(long, global = true)]
    platform: Option<Platform>,

    /// Evaluate without the demo algorithm attached
    #[arg(long, global = true)]
    no_live_object: bool,

    /// Output format
    #[arg(long, global = true, value_enum)]
    output: Option<OutputFormat>,

    /// Log filter, e.g. `inspector_eval=debug`
    #[arg(long, global = true)]
    log: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one query
    Eval {
        /// Expression to evaluate, e.g. `algorithm.Portfolio.Cash`
        query: String,
    },

    /// Run a JSON-encoded command, e.g. `{"query": "1 + 1"}`
    Run {
        /// Command JSON
        json: String,
    },

    /// Evaluate queries interactively
    Repl,

    /// Show the capability set and unit skeleton queries are compiled with
    Capabilities,
}

impl Cli {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(platform) = self.platform {
            config.platform = Some(platform);
        }
        if self.no_live_object {
            config.live_object = false;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(filter) = &self.log {
            config.log_filter = Some(filter.clone());
        }
        config
    }
}

fn init_logging(config: &Config) {
    let filter = match &config.log_filter {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn context(config: &Config) -> CommandContext {
    let ctx = CommandContext::new(Evaluator::default(), config.platform());
    if config.live_object {
        ctx.with_live_object(DemoAlgorithm::new().into_object())
    } else {
        ctx
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => cli.apply(config),
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    match run(&cli.command, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command succeeded
fn run(command: &Commands, config: &Config) -> Result<bool, CliError> {
    match command {
        Commands::Eval { query } => {
            let result = InspectorCommand::new(query.clone()).run(&context(config));
            print_result(&result, config.output)?;
            Ok(result.success())
        }
        Commands::Run { json } => {
            let command = InspectorCommand::from_json(json).map_err(CliError::Command)?;
            let result = command.run(&context(config));
            print_result(&result, OutputFormat::Json)?;
            Ok(result.success())
        }
        Commands::Repl => {
            repl(config)?;
            Ok(true)
        }
        Commands::Capabilities => {
            show_capabilities(config)?;
            Ok(true)
        }
    }
}

fn print_result(result: &CommandResult<InspectorCommand>, output: OutputFormat) -> Result<(), CliError> {
    match output {
        OutputFormat::Json => println!("{}", result.to_json().map_err(CliError::Encode)?),
        OutputFormat::Text => println!("{}", render::render_text(result)),
    }
    Ok(())
}

fn show_capabilities(config: &Config) -> Result<(), CliError> {
    let set = resolve(config.live_object, config.platform());
    match config.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&set).map_err(CliError::Encode)?)
        }
        OutputFormat::Text => {
            println!("variant: {:?}", set.variant());
            println!("libraries:");
            for library in set.libraries() {
                println!("  {}", library);
            }
            println!();
            print!("{}", synthesize("<query>", &set).source);
        }
    }
    Ok(())
}

const REPL_HELP: &str = "\
Enter an expression to evaluate it.
  :help   show this message
  :quit   exit";

fn repl(config: &Config) -> Result<(), CliError> {
    let ctx = context(config);
    let editor_config = EditorConfig::builder().auto_add_history(true).build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(editor_config)?;

    println!(
        "inspector repl ({}, {})",
        ctx.platform,
        if ctx.live.is_some() { "live algorithm attached" } else { "no live object" }
    );
    println!("Type :help for help");

    loop {
        match rl.readline("inspector> ") {
            Ok(line) => {
                let line = line.trim();
                match line {
                    "" => continue,
                    ":quit" | ":q" => break,
                    ":help" => println!("{}", REPL_HELP),
                    query => {
                        let result = InspectorCommand::new(query).run(&ctx);
                        print_result(&result, config.output)?;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "inspector",
            "--no-live-object",
            "--platform",
            "windows",
            "--output",
            "json",
            "eval",
            "1 + 1",
        ]);
        let config = cli.apply(Config::default());
        assert!(!config.live_object);
        assert_eq!(config.platform(), Platform::Windows);
        assert_eq!(config.output, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Eval { ref query } if query == "1 + 1"));
    }

    #[test]
    fn test_eval_without_live_object() {
        let config = Config {
            live_object: false,
            ..Config::default()
        };
        assert!(run(&Commands::Eval { query: "2 * 21".into() }, &config).unwrap());
        assert!(!run(&Commands::Eval { query: "algorithm.Name".into() }, &config).unwrap());
    }

    #[test]
    fn test_run_rejects_malformed_command() {
        let err = run(&Commands::Run { json: "{}".into() }, &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::Command(_)));
    }
}
