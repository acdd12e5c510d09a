//! Splits the text after `/standup` into leading flags and the status message.

use super::registry::{Parameter, ParameterRegistry, ARGUMENT_SEPARATOR, FLAG_PREFIX};

/// Flags in the order they were first given, keyed by lowercased alias.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    entries: Vec<(String, String)>,
}

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the argument for an alias. A repeated alias keeps its original
    /// position and takes the newer argument.
    pub fn insert(&mut self, alias: impl Into<String>, argument: impl Into<String>) {
        let alias = alias.into();
        let argument = argument.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == alias) {
            Some(entry) => entry.1 = argument,
            None => self.entries.push((alias, argument)),
        }
    }

    /// The argument given under any alias of `parameter`, if it was given at all.
    pub fn argument_for(&self, parameter: &Parameter) -> Option<&str> {
        self.entries
            .iter()
            .find(|(alias, _)| parameter.has_alias(alias))
            .map(|(_, argument)| argument.as_str())
    }

    pub fn contains(&self, parameter: &Parameter) -> bool {
        self.argument_for(parameter).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(alias, argument)| (alias.as_str(), argument.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of tokenizing a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Everything after the last consumed flag, trimmed.
    pub status: String,
    pub flags: Flags,
}

/// Consume leading `--flag[=argument]` tokens.
///
/// Parsing stops at the first token that is not a registered flag; that token
/// and everything after it is returned verbatim as the status.
pub fn tokenize(text: &str, registry: &ParameterRegistry) -> ParsedCommand {
    let mut flags = Flags::new();
    let mut rest = text.trim_start();

    while rest.starts_with(FLAG_PREFIX) {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token = &rest[..end];
        let (name, argument) = token
            .split_once(ARGUMENT_SEPARATOR)
            .unwrap_or((token, ""));
        let alias = name.to_lowercase();

        if registry.resolve(&alias).is_err() {
            tracing::debug!(token, "Unrecognized flag, treating remainder as status");
            break;
        }

        flags.insert(alias, argument);
        rest = rest[end..].trim_start();
    }

    ParsedCommand {
        status: rest.trim_end().to_string(),
        flags,
    }
}
