use anyhow::{anyhow, Context as _, Result};
use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::conditions::{Context, Value};
use crate::config::{self, Config, ContainerSet, ContainerState, Outcome};
use crate::engine::Engine;

use super::exit_codes;
use super::output::{self, CheckData, DecisionData, OutputMode, ShowData, TypeData};

#[derive(Parser)]
#[command(name = "ccond")]
#[command(about = "Evaluate container display conditions against an entity context")]
#[command(version)]
pub struct Cli {
    /// Path to config file (overrides CCOND_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (auto-enabled when stdout is piped)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Force text output even when stdout is piped
    #[arg(long, global = true, conflicts_with = "json")]
    pub no_json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate every container's conditions and report errors
    Check,

    /// Evaluate containers against an entity context
    Eval {
        /// JSON object of facts, read from a file or "-" for stdin
        #[arg(short = 'x', long)]
        context: Option<String>,

        /// Set a single fact; VALUE is parsed as JSON, falling back to a string
        #[arg(short, long = "fact", value_name = "FACT=VALUE", action = clap::ArgAction::Append)]
        facts: Vec<String>,

        /// Only evaluate the named container
        #[arg(short = 'n', long)]
        container: Option<String>,
    },

    /// List registered condition types
    Types,

    /// Show a container's translated condition tree
    Show {
        /// Container name
        name: String,

        /// Also print the canonical condition specification
        #[arg(long)]
        spec: bool,
    },
}

pub fn execute(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let output_mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet);

    match cli.command {
        Commands::Check => {
            let path = config::get_config_path_with_override(config_path)?;
            let (config, engine) = load(config_path, output_mode);
            let errors = config::verify(&config, &engine);

            if output_mode.is_json() {
                if errors.is_empty() {
                    output::print_json(&CheckData {
                        path: path.display().to_string(),
                        containers: config.containers.len(),
                        errors,
                    });
                    return Ok(());
                }
                fail(
                    output_mode,
                    exit_codes::CONFIG_ERROR,
                    &format!("configuration has {} error(s)", errors.len()),
                    Vec::new(),
                    errors,
                );
            }

            if errors.is_empty() {
                if !output_mode.is_quiet() {
                    println!(
                        "✓ {} container(s) valid: {}",
                        config.containers.len(),
                        path.display()
                    );
                }
                return Ok(());
            }

            println!(
                "✗ Configuration has {} error(s): {}",
                errors.len(),
                path.display()
            );
            println!();
            for error in &errors {
                println!("  - {}", error);
            }
            std::process::exit(exit_codes::CONFIG_ERROR);
        }

        Commands::Eval {
            context,
            facts,
            container,
        } => {
            let (config, engine) = load(config_path, output_mode);
            let ctx = match build_context(context.as_deref(), &facts) {
                Ok(ctx) => ctx,
                Err(e) => fail(
                    output_mode,
                    exit_codes::INVALID_ARGS,
                    &format!("{:#}", e),
                    Vec::new(),
                    Vec::new(),
                ),
            };

            let set = ContainerSet::build(&config, &engine);
            let outcomes: Vec<(&str, Outcome)> = match container.as_deref() {
                Some(name) => match set.get(name) {
                    Some(c) => vec![(c.name.as_str(), c.evaluate(&ctx))],
                    None => fail(
                        output_mode,
                        exit_codes::CONTAINER_NOT_FOUND,
                        &format!("container '{}' not found", name),
                        set.iter().map(|c| c.name.clone()).collect(),
                        Vec::new(),
                    ),
                },
                None => set.evaluate(&ctx),
            };

            let fail_closed = config.settings.fail_closed;
            let undecided = outcomes
                .iter()
                .filter(|(_, o)| matches!(o, Outcome::Undecided(_)))
                .count();

            if output_mode.is_json() {
                let data: Vec<DecisionData> = outcomes
                    .iter()
                    .map(|(name, outcome)| decision_data(name, outcome, fail_closed))
                    .collect();
                output::print_json(&data);
            } else if !output_mode.is_quiet() {
                for (name, outcome) in &outcomes {
                    print_outcome(name, outcome, fail_closed);
                }
            }

            if undecided > 0 {
                std::process::exit(exit_codes::EVAL_ERROR);
            }
            Ok(())
        }

        Commands::Types => {
            let (_, engine) = load(config_path, output_mode);
            let factory = engine.factory();

            let types: Vec<TypeData> = factory
                .tags()
                .into_iter()
                .filter_map(|tag| {
                    factory.kind(tag).map(|kind| TypeData {
                        tag: tag.to_string(),
                        kind: kind.tag(),
                        fact: kind.fact(),
                        description: kind.description(),
                    })
                })
                .collect();

            if output_mode.is_json() {
                output::print_json(&types);
            } else if !output_mode.is_quiet() {
                let width = types.iter().map(|t| t.tag.len()).max().unwrap_or(0);
                for t in &types {
                    let alias = if t.tag != t.kind {
                        format!(" (alias of {})", t.kind)
                    } else {
                        String::new()
                    };
                    println!(
                        "{:<width$}  fact: {:<16} {}{}",
                        t.tag,
                        t.fact,
                        t.description,
                        alias,
                        width = width
                    );
                }
            }
            Ok(())
        }

        Commands::Show { name, spec } => {
            let (config, engine) = load(config_path, output_mode);
            let set = ContainerSet::build(&config, &engine);

            let Some(container) = set.get(&name) else {
                fail(
                    output_mode,
                    exit_codes::CONTAINER_NOT_FOUND,
                    &format!("container '{}' not found", name),
                    set.iter().map(|c| c.name.clone()).collect(),
                    Vec::new(),
                );
            };

            let tree = match &container.state {
                ContainerState::Ready(tree) => tree,
                ContainerState::Broken(e) => fail(
                    output_mode,
                    exit_codes::CONFIG_ERROR,
                    &format!("container '{}' has invalid conditions: {}", name, e),
                    Vec::new(),
                    Vec::new(),
                ),
            };

            let canonical: Option<JsonValue> = if spec {
                Some(
                    engine
                        .to_spec(tree)
                        .with_context(|| format!("Failed to serialize container '{}'", name))?,
                )
            } else {
                None
            };

            if output_mode.is_json() {
                output::print_json(&ShowData {
                    container: name,
                    tree: tree.to_string(),
                    spec: canonical,
                });
            } else if !output_mode.is_quiet() {
                println!("{}", tree);
                if let Some(canonical) = canonical {
                    println!();
                    println!("{}", serde_json::to_string_pretty(&canonical)?);
                }
            }
            Ok(())
        }
    }
}

/// load config and boot the engine, exiting with CONFIG_ERROR on failure
fn load(config_path: Option<&Path>, mode: OutputMode) -> (Config, Engine) {
    let result = config::load_with_override(config_path)
        .and_then(|config| config::build_engine(&config).map(|engine| (config, engine)));

    match result {
        Ok(loaded) => loaded,
        Err(e) => fail(
            mode,
            exit_codes::CONFIG_ERROR,
            &format!("{:#}", e),
            Vec::new(),
            Vec::new(),
        ),
    }
}

/// merge the context document (if any) with individual --fact overrides
fn build_context(source: Option<&str>, facts: &[String]) -> Result<Context> {
    let mut ctx = match source {
        Some(source) => {
            let text = read_source(source)?;
            let json: JsonValue = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse context from {}", describe(source)))?;
            Context::from_json(&json)
                .with_context(|| format!("Invalid context in {}", describe(source)))?
        }
        None => Context::new(),
    };

    for fact in facts {
        let (name, raw) = parse_fact(fact)?;
        ctx = ctx.with(name, raw);
    }

    Ok(ctx)
}

fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read context from stdin")?;
        return Ok(text);
    }

    fs::read_to_string(source).with_context(|| format!("Failed to read context file: {}", source))
}

fn describe(source: &str) -> String {
    if source == "-" {
        "stdin".to_string()
    } else {
        source.to_string()
    }
}

/// parse `fact=value`; the value is JSON when it parses as JSON, else a string
fn parse_fact(arg: &str) -> Result<(&str, Value)> {
    let (name, raw) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("invalid fact '{}': expected FACT=VALUE", arg))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("invalid fact '{}': empty fact name", arg));
    }

    let value = match serde_json::from_str::<JsonValue>(raw) {
        Ok(json) => Value::from_json(&json)
            .with_context(|| format!("invalid value for fact '{}'", name))?,
        Err(_) => Value::String(raw.to_string()),
    };

    Ok((name, value))
}

fn decision_data(name: &str, outcome: &Outcome, fail_closed: bool) -> DecisionData {
    let error = match outcome {
        Outcome::Undecided(e) => Some(e.to_string()),
        Outcome::Broken(e) => Some(e.clone()),
        Outcome::Active | Outcome::Inactive => None,
    };

    DecisionData {
        container: name.to_string(),
        outcome: outcome.label(),
        active: outcome.is_active(fail_closed),
        error,
    }
}

fn print_outcome(name: &str, outcome: &Outcome, fail_closed: bool) {
    let mark = if outcome.is_active(fail_closed) {
        "✓"
    } else {
        "✗"
    };

    match outcome {
        Outcome::Undecided(e) => println!("{} {}: {} ({})", mark, name, outcome.label(), e),
        Outcome::Broken(e) => println!("{} {}: {} ({})", mark, name, outcome.label(), e),
        Outcome::Active | Outcome::Inactive => println!("{} {}: {}", mark, name, outcome.label()),
    }
}

/// report an error in the current output mode and exit with `code`
fn fail(
    mode: OutputMode,
    code: i32,
    message: &str,
    suggestions: Vec<String>,
    details: Vec<String>,
) -> ! {
    output::print_error(mode, code, message, suggestions, details);
    std::process::exit(code);
}
