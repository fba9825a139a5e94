//! Named filter configuration.
//!
//! A configuration file is JSON mapping names to filter text:
//!
//! ```json
//! {
//!   "filters": {
//!     "images": "and{PrimaryType(+'^nt:file$'),MimeType(+'^image/')}",
//!     "folders": "Folder()"
//!   },
//!   "default": "images"
//! }
//! ```
//!
//! Filters are decoded while the file is deserialized, so a malformed entry
//! fails the load. A filter argument `@name` refers to an entry.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use resfilter_core::ResourceFilter;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CliError;

/// Prefix marking a filter argument as a reference to a named filter.
pub const NAMED_FILTER_PREFIX: char = '@';

/// Filters loaded from a configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Named filters.
    #[serde(default)]
    pub filters: BTreeMap<String, ResourceFilter>,
    /// Name of the filter used when a command is given no filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl FilterConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load and validate the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let config_error = |message: String| CliError::Config {
            path: path.to_path_buf(),
            message,
        };

        let json = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config = FilterConfig::from_json(&json).map_err(|e| config_error(e.to_string()))?;

        if let Some(name) = &config.default {
            if !config.filters.contains_key(name) {
                return Err(config_error(format!(
                    "default filter '{}' is not defined",
                    name
                )));
            }
        }

        debug!(
            path = %path.display(),
            filters = config.filters.len(),
            "loaded filter configuration"
        );
        Ok(config)
    }

    /// Look up a named filter.
    pub fn get(&self, name: &str) -> Option<&ResourceFilter> {
        self.filters.get(name)
    }

    /// The default filter and its name, if one is configured.
    pub fn default_filter(&self) -> Option<(&str, &ResourceFilter)> {
        let name = self.default.as_deref()?;
        self.filters.get(name).map(|filter| (name, filter))
    }
}

/// A filter chosen by a command argument.
#[derive(Debug, Clone)]
pub struct ResolvedFilter {
    /// Configuration name, when the filter came from the configuration.
    pub name: Option<String>,
    pub filter: ResourceFilter,
}

/// Resolve a filter argument.
///
/// - `@name` looks the filter up in `config`
/// - any other text is decoded as a filter
/// - no argument selects the configuration's default filter
pub fn resolve_filter(
    argument: Option<&str>,
    config: Option<&FilterConfig>,
) -> Result<ResolvedFilter, CliError> {
    match argument {
        Some(text) => match text.trim().strip_prefix(NAMED_FILTER_PREFIX) {
            Some(name) => {
                let filter = config
                    .and_then(|c| c.get(name))
                    .ok_or_else(|| CliError::UnknownFilter {
                        name: name.to_string(),
                    })?;
                Ok(ResolvedFilter {
                    name: Some(name.to_string()),
                    filter: filter.clone(),
                })
            }
            None => {
                let filter =
                    text.parse::<ResourceFilter>()
                        .map_err(|source| CliError::InvalidFilter {
                            text: text.to_string(),
                            source,
                        })?;
                Ok(ResolvedFilter { name: None, filter })
            }
        },
        None => {
            let (name, filter) = config.and_then(|c| c.default_filter()).ok_or_else(|| {
                CliError::invalid_args("no filter given and no default filter configured")
            })?;
            Ok(ResolvedFilter {
                name: Some(name.to_string()),
                filter: filter.clone(),
            })
        }
    }
}
