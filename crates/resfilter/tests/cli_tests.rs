//! Integration tests for the CLI commands, backed by temporary files.

use std::fs;
use std::path::{Path, PathBuf};

use resfilter::cli::{load_resources, run_check, run_eval};
use resfilter::config::FilterConfig;
use resfilter::error::{CliError, OutputErrorCode};
use resfilter::output::{emit_response, ErrorResponse, EvalResult};
use tempfile::TempDir;

const RESOURCES: &str = r#"[
    {
        "name": "logo.png",
        "path": "/content/dam/logo.png",
        "primary_type": "nt:file",
        "children": [
            {"name": "jcr:content", "primary_type": "nt:resource",
             "properties": {"jcr:mimeType": "image/png"}}
        ]
    },
    {
        "name": "notes.txt",
        "path": "/content/docs/notes.txt",
        "primary_type": "nt:file",
        "properties": {"jcr:mimeType": "text/plain"}
    },
    {
        "name": "docs",
        "path": "/content/docs",
        "primary_type": "sling:Folder"
    },
    {
        "name": "synthetic",
        "primary_type": "nt:unstructured",
        "synthetic": true
    }
]"#;

const CONFIG: &str = r#"{
    "filters": {
        "images": "and{PrimaryType(+'^nt:file$'),MimeType(+'^image/')}",
        "image-tree": "tree{MimeType(+'^image/'),Folder()}",
        "no-locks": "MixinType(-'^mix:lockable$')"
    },
    "default": "images"
}"#;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn setup() -> (TempDir, PathBuf, FilterConfig) {
    let dir = TempDir::new().unwrap();
    let resources = write_file(&dir, "resources.json", RESOURCES);
    let config_path = write_file(&dir, "filters.json", CONFIG);
    let config = FilterConfig::load(&config_path).unwrap();
    (dir, resources, config)
}

fn verdicts(results: &[EvalResult]) -> Vec<(&str, bool, bool)> {
    results
        .iter()
        .map(|r| (r.path.as_str(), r.accepted, r.intermediate))
        .collect()
}

#[test]
fn test_check_literal_filter() {
    let response = run_check(Some(" or{ Folder(), Name(-'^\\.') } "), None).unwrap();
    assert_eq!(response.status, "ok");
    assert_eq!(response.filter, "or{Folder(),Name(-'^\\.')}");
    assert!(!response.restriction);
    assert!(response.name.is_none());
}

#[test]
fn test_check_reports_restriction() {
    let response = run_check(Some("Type(-[nt:folder,sling:Folder])"), None).unwrap();
    assert!(response.restriction);
}

#[test]
fn test_check_named_and_default_filter() {
    let (_dir, _resources, config) = setup();

    let response = run_check(Some("@no-locks"), Some(&config)).unwrap();
    assert_eq!(response.name.as_deref(), Some("no-locks"));
    assert!(response.restriction);

    let response = run_check(None, Some(&config)).unwrap();
    assert_eq!(response.name.as_deref(), Some("images"));
}

#[test]
fn test_check_invalid_filter() {
    let err = run_check(Some("and{Folder(),Bogus()}"), None).unwrap_err();
    assert!(matches!(err, CliError::InvalidFilter { .. }));
    assert_eq!(
        OutputErrorCode::from(&err),
        OutputErrorCode::InvalidArguments
    );
    assert!(err.to_string().contains("Bogus()"));
}

#[test]
fn test_eval_images() {
    let (_dir, resources, config) = setup();

    let response = run_eval(Some("@images"), &resources, Some(&config)).unwrap();
    assert_eq!(
        verdicts(&response.results),
        vec![
            ("/content/dam/logo.png", true, false),
            ("/content/docs/notes.txt", false, false),
            ("/content/docs", false, false),
            ("/synthetic", false, false),
        ]
    );
    assert_eq!(response.accepted, 1);
}

#[test]
fn test_eval_tree_marks_intermediates() {
    let (_dir, resources, config) = setup();

    let response = run_eval(Some("@image-tree"), &resources, Some(&config)).unwrap();
    assert_eq!(
        verdicts(&response.results),
        vec![
            ("/content/dam/logo.png", true, false),
            ("/content/docs/notes.txt", false, false),
            ("/content/docs", true, true),
            ("/synthetic", false, false),
        ]
    );
}

#[test]
fn test_eval_mixin_read_failure_is_not_accepted() {
    let (_dir, resources, config) = setup();

    let response = run_eval(Some("@no-locks"), &resources, Some(&config)).unwrap();
    let accepted: Vec<bool> = response.results.iter().map(|r| r.accepted).collect();
    assert_eq!(accepted, vec![true, true, true, false]);
}

#[test]
fn test_eval_single_resource_document() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "one.json",
        r#"{"name": "docs", "primary_type": "nt:folder"}"#,
    );

    let response = run_eval(Some("Folder()"), &path, None).unwrap();
    assert_eq!(verdicts(&response.results), vec![("/docs", true, false)]);
}

#[test]
fn test_eval_missing_resources_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");

    let err = run_eval(Some("Folder()"), &missing, None).unwrap_err();
    assert!(matches!(err, CliError::Resources { .. }));
    assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::ResolutionError);
}

#[test]
fn test_load_resources_rejects_malformed_json() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.json", "[{\"name\": 1}]");
    assert!(matches!(
        load_resources(&path),
        Err(CliError::Resources { .. })
    ));
}

#[test]
fn test_config_load_errors() {
    let dir = TempDir::new().unwrap();

    let missing = FilterConfig::load(Path::new("/nonexistent/filters.json"));
    assert!(matches!(missing, Err(CliError::Config { .. })));

    let malformed = write_file(&dir, "bad.json", r#"{"filters": {"x": "Folder("}}"#);
    assert!(matches!(
        FilterConfig::load(&malformed),
        Err(CliError::Config { .. })
    ));

    let bad_default = write_file(
        &dir,
        "default.json",
        r#"{"filters": {"x": "Folder()"}, "default": "y"}"#,
    );
    let err = FilterConfig::load(&bad_default).unwrap_err();
    assert!(err.to_string().contains("default filter 'y'"));
}

#[test]
fn test_error_response_json() {
    let err = run_check(Some("@missing"), None).unwrap_err();
    let mut out = Vec::new();
    emit_response(&ErrorResponse::from_error(&err), &mut out).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["status"], "error");
    assert_eq!(value["error"]["code"], 3);
    assert!(value["error"]["message"]
        .as_str()
        .unwrap()
        .contains("missing"));
}
