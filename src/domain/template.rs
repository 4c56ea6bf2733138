//! Command templates and `{name|default}` placeholder substitution.
//!
//! A template is either a single command string or a nested list of
//! templates. Placeholders look like `{branch}` or `{branch|master}`; the
//! value for `{branch}` is supplied on the command line as `--set-branch`.

use crate::error::{DeployError, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// `{ name }` or `{ name | default }`
const PLACEHOLDER_PATTERN: &str = r"\{\s*([^|{}\s]+)(?:\s*\|\s*([^|{}]*?))?\s*\}";

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is a valid regex")
    })
}

/// A single placeholder occurrence inside a command string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// The full matched token, braces included
    pub token: &'a str,
    pub name: &'a str,
    pub default: Option<&'a str>,
}

impl<'a> Placeholder<'a> {
    fn from_captures(caps: &Captures<'a>) -> Option<Self> {
        Some(Placeholder {
            token: caps.get(0)?.as_str(),
            name: caps.get(1)?.as_str(),
            default: caps.get(2).map(|m| m.as_str()),
        })
    }
}

/// Iterate the placeholders of a command string, left to right
pub fn placeholders(command: &str) -> impl Iterator<Item = Placeholder<'_>> {
    placeholder_regex()
        .captures_iter(command)
        .filter_map(|caps| Placeholder::from_captures(&caps))
}

/// Substitute every placeholder in a single command string.
///
/// The leftmost placeholder is resolved and every occurrence of its token
/// replaced, then the string is scanned again, so placeholders carried in by a
/// value are resolved too. The first placeholder with neither a value nor a
/// default aborts the substitution. A token that comes back after being
/// replaced would never settle and is reported as a loop.
pub fn substitute<F>(command: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut resolved = command.to_string();
    let mut replaced: HashSet<String> = HashSet::new();

    loop {
        let (token, value) = match placeholder_regex().captures(&resolved) {
            Some(caps) => {
                let Some(placeholder) = Placeholder::from_captures(&caps) else {
                    break;
                };
                let value = match lookup(placeholder.name) {
                    Some(value) => value,
                    None => match placeholder.default {
                        Some(default) => default.to_string(),
                        None => return Err(DeployError::missing_option(placeholder.name)),
                    },
                };
                (placeholder.token.to_string(), value)
            }
            None => break,
        };

        if !replaced.insert(token.clone()) {
            return Err(DeployError::SubstitutionLoop { token });
        }
        resolved = resolved.replace(&token, &value);
    }

    Ok(resolved)
}

/// A command, or an ordered group of commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandTemplate {
    Leaf(String),
    Sequence(Vec<CommandTemplate>),
}

impl CommandTemplate {
    pub fn leaf(command: impl Into<String>) -> Self {
        CommandTemplate::Leaf(command.into())
    }

    /// Entries without any command text are dropped from the command list
    pub fn is_empty(&self) -> bool {
        match self {
            CommandTemplate::Leaf(command) => command.trim().is_empty(),
            CommandTemplate::Sequence(items) => items.iter().all(CommandTemplate::is_empty),
        }
    }

    /// Resolve all placeholders, stopping at the first element that fails
    pub fn resolve<F>(&self, lookup: &F) -> Result<CommandTemplate>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            CommandTemplate::Leaf(command) => substitute(command, lookup).map(CommandTemplate::Leaf),
            CommandTemplate::Sequence(items) => items
                .iter()
                .map(|item| item.resolve(lookup))
                .collect::<Result<Vec<_>>>()
                .map(CommandTemplate::Sequence),
        }
    }

    /// The commands of this template in execution order
    pub fn flatten(&self) -> Vec<String> {
        let mut commands = Vec::new();
        self.flatten_into(&mut commands);
        commands
    }

    fn flatten_into(&self, commands: &mut Vec<String>) {
        match self {
            CommandTemplate::Leaf(command) => commands.push(command.clone()),
            CommandTemplate::Sequence(items) => {
                for item in items {
                    item.flatten_into(commands);
                }
            }
        }
    }

    /// Distinct placeholder names in order of first appearance
    pub fn placeholder_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, names: &mut Vec<String>) {
        match self {
            CommandTemplate::Leaf(command) => {
                for placeholder in placeholders(command) {
                    if !names.iter().any(|known| known == placeholder.name) {
                        names.push(placeholder.name.to_string());
                    }
                }
            }
            CommandTemplate::Sequence(items) => {
                for item in items {
                    item.collect_names(names);
                }
            }
        }
    }
}

impl From<&str> for CommandTemplate {
    fn from(command: &str) -> Self {
        CommandTemplate::Leaf(command.to_string())
    }
}

impl From<String> for CommandTemplate {
    fn from(command: String) -> Self {
        CommandTemplate::Leaf(command)
    }
}

impl<T: Into<CommandTemplate>> From<Vec<T>> for CommandTemplate {
    fn from(items: Vec<T>) -> Self {
        CommandTemplate::Sequence(items.into_iter().map(Into::into).collect())
    }
}

/// Distinct placeholder names across a list of templates
pub fn placeholder_names(templates: &[CommandTemplate]) -> Vec<String> {
    CommandTemplate::Sequence(templates.to_vec()).placeholder_names()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| values.get(name).cloned()
    }

    fn nothing(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_used_when_option_missing() {
        assert_eq!(
            substitute("git fetch {remote|origin}", &nothing).unwrap(),
            "git fetch origin"
        );
    }

    #[test]
    fn test_missing_option_without_default_fails() {
        let err = substitute("git fetch {remote}", &nothing).unwrap_err();
        assert!(matches!(err, DeployError::MissingOption { ref name } if name == "remote"));
    }

    #[test]
    fn test_supplied_option_wins_over_default() {
        let lookup = lookup_from(&[("branch", "release")]);
        assert_eq!(
            substitute("git pull -f {remote|origin} {branch|master}", &lookup).unwrap(),
            "git pull -f origin release"
        );
    }

    #[test]
    fn test_default_may_contain_dashes_and_spaces() {
        assert_eq!(
            substitute("composer install {composer-args|--no-dev --quiet}", &nothing).unwrap(),
            "composer install --no-dev --quiet"
        );
    }

    #[test]
    fn test_whitespace_inside_braces_is_ignored() {
        assert_eq!(substitute("echo { a | b }", &nothing).unwrap(), "echo b");
    }

    #[test]
    fn test_empty_default_is_a_default() {
        assert_eq!(substitute("ls {flags|}", &nothing).unwrap(), "ls ");
    }

    #[test]
    fn test_repeated_placeholder_resolves_each_occurrence() {
        let lookup = lookup_from(&[("x", "1")]);
        assert_eq!(substitute("{x}-{x}-{x|9}", &lookup).unwrap(), "1-1-1");
    }

    #[test]
    fn test_placeholder_inside_value_is_resolved() {
        let lookup = lookup_from(&[("a", "{b|x}")]);
        assert_eq!(substitute("echo {a}", &lookup).unwrap(), "echo x");

        let lookup = lookup_from(&[("a", "{b}"), ("b", "done")]);
        assert_eq!(substitute("echo {a}", &lookup).unwrap(), "echo done");
    }

    #[test]
    fn test_placeholder_inside_value_without_value_fails() {
        let lookup = lookup_from(&[("a", "{b}")]);
        let err = substitute("echo {a}", &lookup).unwrap_err();
        assert!(matches!(err, DeployError::MissingOption { ref name } if name == "b"));
    }

    #[test]
    fn test_value_reintroducing_its_token_is_a_loop() {
        let lookup = lookup_from(&[("a", "{a}")]);
        let err = substitute("echo {a}", &lookup).unwrap_err();
        assert!(matches!(err, DeployError::SubstitutionLoop { ref token } if token == "{a}"));

        let lookup = lookup_from(&[("a", "{b}"), ("b", "[{a}]")]);
        assert!(matches!(
            substitute("echo {a}", &lookup).unwrap_err(),
            DeployError::SubstitutionLoop { .. }
        ));
    }

    #[test]
    fn test_non_placeholders_left_alone() {
        assert_eq!(
            substitute("awk '{ print $1 }' {}", &nothing).unwrap(),
            "awk '{ print $1 }' {}"
        );
    }

    #[test]
    fn test_failure_stops_scanning() {
        let calls = RefCell::new(Vec::new());
        let lookup = |name: &str| {
            calls.borrow_mut().push(name.to_string());
            None
        };
        assert!(substitute("{first} {second}", &lookup).is_err());
        assert_eq!(*calls.borrow(), vec!["first".to_string()]);
    }

    #[test]
    fn test_resolve_sequence() {
        let template = CommandTemplate::from(vec!["down", "git checkout -f {branch|master}"]);
        let resolved = template.resolve(&nothing).unwrap();
        assert_eq!(resolved.flatten(), vec!["down", "git checkout -f master"]);
    }

    #[test]
    fn test_nested_sequence_short_circuits() {
        let calls = RefCell::new(Vec::new());
        let lookup = |name: &str| {
            calls.borrow_mut().push(name.to_string());
            (name == "a").then(|| "yes".to_string())
        };
        let template = CommandTemplate::Sequence(vec![
            CommandTemplate::from(vec!["ok {a}"]),
            CommandTemplate::leaf("bad {b}"),
            CommandTemplate::leaf("never {c}"),
        ]);

        let err = template.resolve(&lookup).unwrap_err();
        assert!(matches!(err, DeployError::MissingOption { ref name } if name == "b"));
        assert_eq!(*calls.borrow(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_resolve_is_idempotent_once_resolved() {
        let lookup = lookup_from(&[("branch", "main")]);
        let template = CommandTemplate::from(vec![
            CommandTemplate::leaf("git checkout {branch}"),
            CommandTemplate::from(vec!["git fetch {remote|origin}"]),
        ]);
        let once = template.resolve(&lookup).unwrap();
        let twice = once.resolve(&lookup).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_placeholder_names_are_distinct_and_ordered() {
        let templates = vec![
            CommandTemplate::leaf("git checkout -f {branch|master}"),
            CommandTemplate::from(vec!["git fetch {remote|origin}", "git pull {remote} {branch}"]),
            CommandTemplate::leaf("composer install {composer-args|--no-dev}"),
        ];
        assert_eq!(
            placeholder_names(&templates),
            vec!["branch", "remote", "composer-args"]
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(CommandTemplate::leaf("").is_empty());
        assert!(CommandTemplate::leaf("  ").is_empty());
        assert!(CommandTemplate::Sequence(vec![]).is_empty());
        assert!(CommandTemplate::from(vec![""]).is_empty());
        assert!(!CommandTemplate::leaf("php artisan up").is_empty());
    }

    #[test]
    fn test_placeholder_iterator() {
        let found: Vec<_> = placeholders("{a} and {b|c}").collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "a");
        assert_eq!(found[0].default, None);
        assert_eq!(found[1].token, "{b|c}");
        assert_eq!(found[1].default, Some("c"));
    }
}
