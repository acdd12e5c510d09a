//! Catalog of the options accepted after `/standup`.
//!
//! The catalog is declarative (see `parameters.json`) and loaded once at
//! startup. Behavior is bound to a parameter through its [`ParameterKind`],
//! never stored on the parameter itself.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Deserialize;
use thiserror::Error;

/// Every flag token starts with this prefix.
pub const FLAG_PREFIX: &str = "--";

/// Separates a flag name from its argument, as in `--expiry=3d`.
pub const ARGUMENT_SEPARATOR: char = '=';

const DEFAULT_CATALOG: &str = include_str!("parameters.json");

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate parameter key: {0}")]
    DuplicateKey(String),

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("parameter '{0}' has no known behavior")]
    UnknownKind(String),

    #[error("malformed parameter catalog: {0}")]
    Catalog(#[from] serde_json::Error),
}

/// The behavior a parameter triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Sets the expiry of the status being recorded.
    Expiry,
    /// Shows expired statuses for this report only.
    All,
    /// Hides expired statuses for this report only.
    NoExpired,
    /// Flips the room's persisted default for showing expired statuses.
    ToggleExpired,
    /// Prints usage.
    Help,
}

impl ParameterKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "expiry" => Some(Self::Expiry),
            "all" => Some(Self::All),
            "no-expired" => Some(Self::NoExpired),
            "toggle-expired" => Some(Self::ToggleExpired),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}

/// A recognized option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    /// Lowercased aliases, always including `--name`.
    pub aliases: BTreeSet<String>,
    /// May accompany a new status.
    pub usable_with_status: bool,
    /// May be given on its own, without a status.
    pub usable_without_status: bool,
    /// Show the report after the option has been handled.
    pub show_statuses_after: bool,
    pub short_description: String,
    pub long_description: String,
}

impl Parameter {
    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.contains(alias)
    }

    /// The `--name` form used in help output.
    pub fn canonical_alias(&self) -> String {
        canonical_alias_for(&self.name)
    }
}

/// One catalog entry as written in the declarative source. Every key is required.
#[derive(Debug, Deserialize)]
struct ParameterDefinition {
    name: String,
    aliases: Vec<String>,
    usable_with_status: bool,
    usable_without_status: bool,
    show_statuses: bool,
    short_description: String,
    long_description: String,
}

impl TryFrom<ParameterDefinition> for Parameter {
    type Error = RegistryError;

    fn try_from(def: ParameterDefinition) -> Result<Self, Self::Error> {
        let name = def.name.to_lowercase();
        let kind =
            ParameterKind::from_name(&name).ok_or_else(|| RegistryError::UnknownKind(name.clone()))?;

        let mut aliases: BTreeSet<String> =
            def.aliases.iter().map(|alias| alias.to_lowercase()).collect();
        aliases.insert(canonical_alias_for(&name));

        Ok(Parameter {
            name,
            kind,
            aliases,
            usable_with_status: def.usable_with_status,
            usable_without_status: def.usable_without_status,
            show_statuses_after: def.show_statuses,
            short_description: def.short_description,
            long_description: def.long_description,
        })
    }
}

/// `--name` for a canonical parameter name.
pub fn canonical_alias_for(name: &str) -> String {
    format!("{}{}", FLAG_PREFIX, name)
}

/// Immutable lookup table from alias to [`Parameter`].
#[derive(Debug, Default, Clone)]
pub struct ParameterRegistry {
    parameters: BTreeMap<String, Parameter>,
    aliases: HashMap<String, String>,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the catalog bundled with the binary.
    pub fn load_default() -> Result<Self, RegistryError> {
        Self::from_json(DEFAULT_CATALOG)
    }

    /// Build a registry from a JSON array of parameter definitions.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let definitions: Vec<ParameterDefinition> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition.try_into()?)?;
        }
        Ok(registry)
    }

    /// Add a parameter. Fails without modifying the registry if its name or any
    /// of its aliases is already taken.
    pub fn register(&mut self, mut parameter: Parameter) -> Result<(), RegistryError> {
        parameter.aliases.insert(canonical_alias_for(&parameter.name));

        if self.parameters.contains_key(&parameter.name) {
            return Err(RegistryError::DuplicateKey(parameter.name));
        }
        if let Some(taken) = parameter
            .aliases
            .iter()
            .find(|alias| self.aliases.contains_key(*alias))
        {
            return Err(RegistryError::DuplicateKey(taken.clone()));
        }

        for alias in &parameter.aliases {
            self.aliases.insert(alias.clone(), parameter.name.clone());
        }
        self.parameters.insert(parameter.name.clone(), parameter);
        Ok(())
    }

    /// Look up a parameter by one of its aliases (case-insensitive).
    pub fn resolve(&self, alias: &str) -> Result<&Parameter, RegistryError> {
        self.aliases
            .get(&alias.to_lowercase())
            .and_then(|name| self.parameters.get(name))
            .ok_or_else(|| RegistryError::UnknownParameter(alias.to_string()))
    }

    /// Look up a parameter the way a user names it in `--help=<query>`:
    /// either an alias (`--expires`) or a bare name (`expiry`).
    pub fn lookup(&self, query: &str) -> Result<&Parameter, RegistryError> {
        let query = query.trim();
        if query.starts_with(FLAG_PREFIX) {
            self.resolve(query)
        } else {
            self.resolve(&canonical_alias_for(query))
                .map_err(|_| RegistryError::UnknownParameter(query.to_string()))
        }
    }

    pub fn by_kind(&self, kind: ParameterKind) -> Option<&Parameter> {
        self.parameters.values().find(|parameter| parameter.kind == kind)
    }

    /// Parameters ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameter(name: &str, aliases: &[&str]) -> Parameter {
        Parameter {
            name: name.to_string(),
            kind: ParameterKind::from_name(name).unwrap_or(ParameterKind::Help),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            usable_with_status: false,
            usable_without_status: true,
            show_statuses_after: true,
            short_description: String::new(),
            long_description: String::new(),
        }
    }

    #[test]
    fn default_catalog_loads() {
        let registry = ParameterRegistry::load_default().unwrap();
        assert_eq!(registry.len(), 5);

        let expiry = registry.resolve("--expires").unwrap();
        assert_eq!(expiry.kind, ParameterKind::Expiry);
        assert!(expiry.usable_with_status);
        assert!(!expiry.usable_without_status);
    }

    #[test]
    fn canonical_alias_is_always_present() {
        let mut registry = ParameterRegistry::new();
        registry.register(parameter("all", &["--everything"])).unwrap();

        assert_eq!(canonical_alias_for("all"), "--all");
        assert_eq!(registry.resolve("--all").unwrap().name, "all");
        assert_eq!(registry.resolve("--everything").unwrap().name, "all");
    }

    #[test]
    fn shared_alias_is_rejected() {
        let mut registry = ParameterRegistry::new();
        registry.register(parameter("all", &["--a"])).unwrap();

        let err = registry.register(parameter("help", &["--a"])).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey(key) if key == "--a"));
        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("--help").is_err());
    }

    #[test]
    fn alias_matching_another_name_is_rejected() {
        let mut registry = ParameterRegistry::new();
        registry.register(parameter("all", &[])).unwrap();

        let err = registry.register(parameter("help", &["--all"])).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey(_)));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = ParameterRegistry::new();
        registry.register(parameter("all", &[])).unwrap();
        assert!(matches!(
            registry.register(parameter("all", &["--other"])),
            Err(RegistryError::DuplicateKey(_))
        ));
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let registry = ParameterRegistry::load_default().unwrap();
        assert_eq!(registry.resolve("--HELP").unwrap().kind, ParameterKind::Help);
    }

    #[test]
    fn unknown_alias_fails() {
        let registry = ParameterRegistry::load_default().unwrap();
        assert!(matches!(
            registry.resolve("--bogus"),
            Err(RegistryError::UnknownParameter(_))
        ));
    }

    #[test]
    fn lookup_accepts_bare_names_and_aliases() {
        let registry = ParameterRegistry::load_default().unwrap();
        assert_eq!(registry.lookup("expiry").unwrap().name, "expiry");
        assert_eq!(registry.lookup("--expires").unwrap().name, "expiry");
        assert!(registry.lookup("nope").is_err());
    }

    #[test]
    fn catalog_entry_missing_a_key_fails() {
        let json = r#"[{"name": "all", "aliases": []}]"#;
        assert!(matches!(
            ParameterRegistry::from_json(json),
            Err(RegistryError::Catalog(_))
        ));
    }

    #[test]
    fn catalog_entry_with_unknown_name_fails() {
        let json = r#"[{
            "name": "dance",
            "aliases": [],
            "usable_with_status": true,
            "usable_without_status": true,
            "show_statuses": false,
            "short_description": "",
            "long_description": ""
        }]"#;
        assert!(matches!(
            ParameterRegistry::from_json(json),
            Err(RegistryError::UnknownKind(name)) if name == "dance"
        ));
    }
}
