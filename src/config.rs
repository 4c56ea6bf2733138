use crate::domain::template::{self, CommandTemplate};
use crate::error::{DeployError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Represents the complete configuration for git-deploy.
///
/// Contains the push switch, production tagging settings, remote connections and
/// the command templates run on the remote.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Run `git push` and `git push --tags` before the remote commands
    #[serde(default = "default_push")]
    pub push: bool,

    #[serde(default)]
    pub production: ProductionConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub commands: CommandsConfig,
}

fn default_push() -> bool {
    true
}

fn default_production_enabled() -> bool {
    true
}

fn default_production_name() -> String {
    "production".to_string()
}

fn default_tag_pattern() -> String {
    "v[0-9]*".to_string()
}

/// Release tagging for the production remote.
///
/// When enabled, deploying to the remote called `name` requires HEAD to be on a
/// release tag; if it is not, the next tag is chosen and created.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProductionConfig {
    #[serde(default = "default_production_enabled")]
    pub enabled: bool,

    #[serde(default = "default_production_name")]
    pub name: String,

    /// Glob handed to `git describe --match`
    #[serde(default = "default_tag_pattern")]
    pub tag_pattern: String,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        ProductionConfig {
            enabled: default_production_enabled(),
            name: default_production_name(),
            tag_pattern: default_tag_pattern(),
        }
    }
}

/// Remote hosts commands can be deployed to.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct RemoteConfig {
    /// Remote used when none is given on the command line
    #[serde(default)]
    pub default: Option<String>,

    #[serde(default)]
    pub connections: BTreeMap<String, RemoteConnection>,
}

impl RemoteConfig {
    /// Look up a connection by remote name
    pub fn connection(&self, name: &str) -> Result<&RemoteConnection> {
        self.connections.get(name).ok_or_else(|| {
            DeployError::config(format!(
                "Unknown remote '{}' (no [remote.connections.{}] section)",
                name, name
            ))
        })
    }
}

/// A single deployment target
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RemoteConnection {
    /// SSH destination, `host` or `user@host`
    pub host: String,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub identity_file: Option<String>,

    /// Application directory the commands run in
    pub root: String,
}

/// The commands run on the remote, either labeled or as a plain list.
///
/// ```toml
/// [commands]
/// down = "php artisan down"
/// up = "php artisan up"
/// ```
///
/// or `commands = ["php artisan down", ["git fetch", "git pull"]]`. Labeled
/// tables keep their file order; a label set to `""` or `false` is disabled.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum CommandsConfig {
    Listed(Vec<CommandTemplate>),
    Labeled(toml::Table),
}

impl CommandsConfig {
    /// The configured templates in execution order
    pub fn templates(&self) -> Result<Vec<CommandTemplate>> {
        match self {
            CommandsConfig::Listed(templates) => Ok(templates.clone()),
            CommandsConfig::Labeled(table) => {
                let mut templates = Vec::with_capacity(table.len());
                for (label, value) in table {
                    if let toml::Value::Boolean(false) = value {
                        continue;
                    }
                    let template = value.clone().try_into::<CommandTemplate>().map_err(|e| {
                        DeployError::config(format!(
                            "commands.{} must be a string or a list of strings: {}",
                            label, e
                        ))
                    })?;
                    templates.push(template);
                }
                Ok(templates)
            }
        }
    }
}

/// Returns the default labeled command list.
fn default_commands() -> toml::Table {
    let mut table = toml::Table::new();
    for (label, command) in [
        ("down", "php artisan down"),
        ("checkout", "git checkout -f {branch|master}"),
        ("fetch", "git fetch {remote|origin}"),
        ("tags", "git fetch {remote|origin} --tags"),
        ("pull", "git pull -f {remote|origin} {branch|master}"),
        ("composer", "composer install {composer-args|--no-dev}"),
        ("up", "php artisan up"),
        ("queue", "php artisan queue:restart"),
    ] {
        table.insert(label.to_string(), toml::Value::String(command.to_string()));
    }
    table
}

impl Default for CommandsConfig {
    fn default() -> Self {
        CommandsConfig::Labeled(default_commands())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            push: default_push(),
            production: ProductionConfig::default(),
            remote: RemoteConfig::default(),
            commands: CommandsConfig::default(),
        }
    }
}

impl Config {
    /// Every placeholder name used by the commands or a remote root directory.
    ///
    /// One `--set-<name>` option is declared on the command line per name.
    pub fn placeholder_names(&self) -> Result<Vec<String>> {
        let mut templates: Vec<CommandTemplate> = self
            .remote
            .connections
            .values()
            .map(|connection| CommandTemplate::leaf(connection.root.clone()))
            .collect();
        templates.extend(self.commands.templates()?);
        Ok(template::placeholder_names(&templates))
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `deploy.toml` in current directory
/// 3. `.deploy.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed, or its commands are malformed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        read_config_file(Path::new(path))?
    } else if Path::new("./deploy.toml").exists() {
        read_config_file(Path::new("./deploy.toml"))?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".deploy.toml");
        if config_path.exists() {
            read_config_file(&config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parse and validate configuration text
pub fn parse_config(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str)
        .map_err(|e| DeployError::config(format!("Invalid configuration: {}", e)))?;

    // Surface malformed labeled commands at load time rather than mid-deploy
    config.commands.templates()?;

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        DeployError::config(format!("Cannot read {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_commands_keep_their_order() {
        let templates = Config::default().commands.templates().unwrap();
        assert_eq!(templates.len(), 8);
        assert_eq!(templates[0], CommandTemplate::leaf("php artisan down"));
        assert_eq!(templates[7], CommandTemplate::leaf("php artisan queue:restart"));
    }

    #[test]
    fn test_default_placeholder_names() {
        let names = Config::default().placeholder_names().unwrap();
        assert_eq!(names, vec!["branch", "remote", "composer-args"]);
    }

    #[test]
    fn test_labeled_commands_follow_file_order() {
        let config = parse_config(
            r#"
[commands]
zeta = "first"
alpha = "second"
middle = ["third", "fourth"]
"#,
        )
        .unwrap();
        let commands: Vec<String> = config
            .commands
            .templates()
            .unwrap()
            .iter()
            .flat_map(|t| t.flatten())
            .collect();
        assert_eq!(commands, vec!["first", "second", "third", "fourth"]);
    }

    #[test]
    fn test_disabled_labeled_command() {
        let config = parse_config(
            r#"
[commands]
down = "php artisan down"
queue = false
"#,
        )
        .unwrap();
        assert_eq!(config.commands.templates().unwrap().len(), 1);
    }

    #[test]
    fn test_listed_commands() {
        let config = parse_config(r#"commands = ["down", ["git fetch", "git pull"]]"#).unwrap();
        let templates = config.commands.templates().unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[1].flatten(), vec!["git fetch", "git pull"]);
    }

    #[test]
    fn test_malformed_labeled_command_rejected() {
        let err = parse_config("[commands]\nbad = 42\n").unwrap_err();
        assert!(err.to_string().contains("commands.bad"));
    }

    #[test]
    fn test_unknown_remote() {
        let config = Config::default();
        let err = config.remote.connection("staging").unwrap_err();
        assert!(err.to_string().contains("Unknown remote 'staging'"));
    }

    #[test]
    fn test_root_placeholders_are_declared() {
        let config = parse_config(
            r#"
commands = ["php artisan up"]

[remote.connections.production]
host = "deploy@example.com"
root = "/srv/{app|shop}"
"#,
        )
        .unwrap();
        assert_eq!(config.placeholder_names().unwrap(), vec!["app"]);
    }
}
