mod schema;

pub use schema::{Config, ContainerDef, Settings, TypeAlias};

use anyhow::{anyhow, Context as _, Result};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::conditions::{Collection, ConditionKind, Context, EvalError, Factory, TranslateError};
use crate::engine::Engine;

const CONFIG_ENV_VAR: &str = "CCOND_CONFIG";

pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not find home directory"))?
        .join(".ccond")
        .join("config.json"))
}

/// resolve config path: explicit override, then env var, then default location
pub fn get_config_path_with_override(override_path: Option<&Path>) -> Result<PathBuf> {
    match override_path {
        Some(path) => Ok(path.to_path_buf()),
        None => get_config_path(),
    }
}

/// load config; a missing file at the default location yields an empty config
pub fn load_with_override(override_path: Option<&Path>) -> Result<Config> {
    let path = get_config_path_with_override(override_path)?;
    let explicit = override_path.is_some() || env::var(CONFIG_ENV_VAR).is_ok();

    if !path.exists() {
        if explicit {
            return Err(anyhow!("config file not found: {}", path.display()));
        }
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// parse config text (JSON or JSON5)
pub fn parse(content: &str) -> Result<Config> {
    json5::from_str(content).map_err(|e| anyhow!("invalid config: {}", e))
}

/// boot an engine with the built-in types plus the configured aliases
pub fn build_engine(config: &Config) -> Result<Engine> {
    let mut factory = Factory::with_defaults();

    for alias in &config.settings.aliases {
        let kind: ConditionKind = factory.kind(&alias.target).ok_or_else(|| {
            anyhow!(
                "alias '{}' targets unknown condition type '{}'",
                alias.tag,
                alias.target
            )
        })?;
        factory
            .register(alias.tag.as_str(), kind)
            .with_context(|| format!("Failed to register alias '{}'", alias.tag))?;
    }

    Ok(Engine::with_factory(factory))
}

/// verify a configuration and return a list of errors
pub fn verify(config: &Config, engine: &Engine) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, def) in config.containers.iter().enumerate() {
        let prefix = format!("containers[{}]", i);

        if def.name.trim().is_empty() {
            errors.push(format!("{}: container name must not be empty", prefix));
        } else if !seen.insert(def.name.as_str()) {
            errors.push(format!("{}: duplicate container name '{}'", prefix, def.name));
        }

        if let Err(e) = engine.translate(&def.conditions) {
            errors.push(format!("{} ({}): {}", prefix, def.name, e));
        }
    }

    errors
}

/// a container after translation: usable, or isolated with its error
#[derive(Debug)]
pub enum ContainerState {
    Ready(Collection),
    Broken(TranslateError),
}

#[derive(Debug)]
pub struct Container {
    pub name: String,
    pub state: ContainerState,
}

/// evaluation result for one container
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Active,
    Inactive,
    /// evaluation error; the condition could not be decided
    Undecided(EvalError),
    /// the container's conditions failed to translate
    Broken(String),
}

impl Outcome {
    /// whether the container should be shown; undecided follows `fail_closed`
    pub fn is_active(&self, fail_closed: bool) -> bool {
        match self {
            Outcome::Active => true,
            Outcome::Undecided(_) => !fail_closed,
            Outcome::Inactive | Outcome::Broken(_) => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Active => "active",
            Outcome::Inactive => "inactive",
            Outcome::Undecided(_) => "undecided",
            Outcome::Broken(_) => "broken",
        }
    }
}

/// all configured containers, each translated independently
#[derive(Debug)]
pub struct ContainerSet {
    containers: Vec<Container>,
}

impl ContainerSet {
    /// translate every container; a failing one does not affect the others
    pub fn build(config: &Config, engine: &Engine) -> Self {
        let containers = config
            .containers
            .iter()
            .map(|def| {
                let state = match engine.translate(&def.conditions) {
                    Ok(tree) => ContainerState::Ready(tree),
                    Err(e) => {
                        warn!(container = %def.name, error = %e, "container conditions rejected");
                        ContainerState::Broken(e)
                    }
                };
                Container {
                    name: def.name.clone(),
                    state,
                }
            })
            .collect();

        Self { containers }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.name == name)
    }

    pub fn broken_count(&self) -> usize {
        self.containers
            .iter()
            .filter(|c| matches!(c.state, ContainerState::Broken(_)))
            .count()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// evaluate every container against one context
    pub fn evaluate(&self, ctx: &Context) -> Vec<(&str, Outcome)> {
        self.containers
            .iter()
            .map(|c| (c.name.as_str(), c.evaluate(ctx)))
            .collect()
    }
}

impl Container {
    pub fn evaluate(&self, ctx: &Context) -> Outcome {
        match &self.state {
            ContainerState::Broken(e) => Outcome::Broken(e.to_string()),
            ContainerState::Ready(tree) => match tree.is_fulfilled(ctx) {
                Ok(true) => Outcome::Active,
                Ok(false) => Outcome::Inactive,
                Err(e) => {
                    warn!(container = %self.name, error = %e, "container condition undecided");
                    Outcome::Undecided(e)
                }
            },
        }
    }
}
