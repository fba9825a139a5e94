//! CLI command implementations.
//!
//! - `check` - decode a filter and report its canonical text and polarity
//! - `eval` - evaluate a filter against the resources of a JSON file
//!
//! ## Error Handling
//!
//! All functions return `Result<T, CliError>`; the binary turns errors into a
//! JSON error response and an exit code.

use std::fs;
use std::path::Path;

use resfilter_core::memory::MemoryResource;
use resfilter_core::resource::Resource;
use tracing::{debug, info};

use crate::config::{resolve_filter, FilterConfig};
use crate::error::CliError;
use crate::output::{CheckResponse, EvalResponse, EvalResult};

/// Decode a filter argument and describe it.
pub fn run_check(
    filter: Option<&str>,
    config: Option<&FilterConfig>,
) -> Result<CheckResponse, CliError> {
    let resolved = resolve_filter(filter, config)?;
    let text = resolved.filter.to_text();
    info!(filter = %text, "filter decoded");

    Ok(CheckResponse::new(
        resolved.name,
        text,
        resolved.filter.is_restriction(),
    ))
}

/// Evaluate a filter against the top-level resources of a JSON file.
///
/// Children of the listed resources serve only as content nodes; they are not
/// evaluated themselves.
pub fn run_eval(
    filter: Option<&str>,
    resources: &Path,
    config: Option<&FilterConfig>,
) -> Result<EvalResponse, CliError> {
    let resolved = resolve_filter(filter, config)?;
    let roots = load_resources(resources)?;

    let results = roots
        .iter()
        .map(|resource| {
            let resource: &dyn Resource = resource;
            let result = EvalResult {
                path: resource.path().to_string(),
                accepted: resolved.filter.accept(Some(resource)),
                intermediate: resolved.filter.is_intermediate(Some(resource)),
            };
            debug!(
                path = %result.path,
                accepted = result.accepted,
                intermediate = result.intermediate,
                "evaluated resource"
            );
            result
        })
        .collect();

    let response = EvalResponse::new(resolved.name, resolved.filter.to_text(), results);
    info!(
        resources = response.results.len(),
        accepted = response.accepted,
        "evaluation complete"
    );
    Ok(response)
}

/// Read a resources document (one resource or an array of them).
pub fn load_resources(path: &Path) -> Result<Vec<MemoryResource>, CliError> {
    let resources_error = |message: String| CliError::Resources {
        path: path.to_path_buf(),
        message,
    };
    let json = fs::read_to_string(path).map_err(|e| resources_error(e.to_string()))?;
    MemoryResource::from_json(&json).map_err(|e| resources_error(e.to_string()))
}
