//! geometa configuration.
//!
//! Selects the MCF schema and the user profile. Defaults to the bundled
//! schema and an empty profile. Override via environment variables or
//! explicit construction.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use geometa_core::document::yaml_to_json_value;
use geometa_core::SchemaDefinitionError;
use geometa_schema::McfSchema;
use serde::{Deserialize, Serialize};

/// Environment variable naming a schema file that replaces the bundled one.
pub const SCHEMA_ENV: &str = "GEOMETA_SCHEMA";
/// Environment variable naming a YAML profile file.
pub const PROFILE_ENV: &str = "GEOMETA_PROFILE";

/// Where geometa finds its schema and profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometaConfig {
    /// Schema file overriding the bundled MCF core schema.
    pub schema_path: Option<PathBuf>,
    /// User profile applied to new documents.
    pub profile_path: Option<PathBuf>,
}

impl GeometaConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `GEOMETA_SCHEMA` (default: the bundled schema)
    /// - `GEOMETA_PROFILE` (default: no profile)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] if a variable names a path
    /// that does not exist.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            schema_path: env_path(SCHEMA_ENV)?,
            profile_path: env_path(PROFILE_ENV)?,
        })
    }

    /// Load the configured schema.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Schema`] if the schema is defective.
    pub fn load_schema(&self) -> Result<McfSchema, ConfigError> {
        let schema = match &self.schema_path {
            Some(path) => McfSchema::from_file(path)?,
            None => McfSchema::bundled()?,
        };
        Ok(schema)
    }

    /// Load the configured profile, or the empty profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Profile`] if the profile cannot be read or
    /// decoded.
    pub fn load_profile(&self) -> Result<Profile, ConfigError> {
        match &self.profile_path {
            Some(path) => Profile::from_file(path),
            None => Ok(Profile::default()),
        }
    }
}

fn env_path(var: &str) -> Result<Option<PathBuf>, ConfigError> {
    match std::env::var_os(var) {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => {
            let path = PathBuf::from(raw);
            if path.exists() {
                Ok(Some(path))
            } else {
                Err(ConfigError::MissingFile(var.to_string(), path))
            }
        }
    }
}

/// License reference written to `identification.license`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Personal defaults applied to every newly created document.
///
/// Existing documents are never touched by the profile.
///
/// ```yaml
/// contact:
///   organization: Natural Capital Project
///   individualname: Jane Doe
///   positionname: Analyst
///   email: jdoe@example.org
/// license:
///   name: CC-BY-4.0
///   url: https://creativecommons.org/licenses/by/4.0/
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Contact properties for the `default` contact section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<BTreeMap<String, String>>,
    /// License for the dataset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

impl Profile {
    /// Read a YAML profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Profile`] on read or decode failure.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let profile_error =
            |reason: String| ConfigError::Profile(path.display().to_string(), reason);
        let content = std::fs::read_to_string(path).map_err(|e| profile_error(e.to_string()))?;
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|e| profile_error(e.to_string()))?;
        let value = yaml_to_json_value(&yaml).map_err(profile_error)?;
        serde_json::from_value(value).map_err(|e| profile_error(e.to_string()))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} points to {1}, which does not exist")]
    MissingFile(String, PathBuf),
    #[error("invalid profile {0}: {1}")]
    Profile(String, String),
    #[error(transparent)]
    Schema(#[from] SchemaDefinitionError),
}
