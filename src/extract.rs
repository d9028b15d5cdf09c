//! Response extractor/repairer
//!
//! Model output is free-form text that should contain one JSON object with
//! the generated file map. This module locates that object, tolerates the
//! usual formatting noise (code fences, prose around the JSON, metadata
//! fields next to the file entries), and backfills the files the preview
//! runtime cannot run without.

use crate::error::ApiError;
use crate::models::{GeneratedFile, GeneratedFiles};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Files every generated project must contain for the preview to function
pub const REQUIRED_FILES: &[&str] = &["/App.js", "/index.js"];

/// Canonical entry point, synthesized when the model forgets `/index.js`.
/// Mounts the default export of `/App.js` into the DOM root.
const DEFAULT_INDEX_JS: &str = r#"import React from 'react';
import ReactDOM from 'react-dom/client';
import App from './App';
import './App.css';

const root = ReactDOM.createRoot(document.getElementById('root'));
root.render(<App />);
"#;

/// Canonical HTML shell with the root mount element
const DEFAULT_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Generated App</title>
  </head>
  <body>
    <div id="root"></div>
  </body>
</html>"#;

// Greedy span from the first `{` to the last `}` in the raw text
static JSON_SPAN: OnceLock<Regex> = OnceLock::new();

fn json_span() -> &'static Regex {
    JSON_SPAN.get_or_init(|| Regex::new(r"(?s)\{.*\}").unwrap())
}

/// Pull the generated file map out of raw model output.
///
/// Guaranteed on success: the map contains `/App.js`, `/index.js` and
/// `/public/index.html`.
pub fn extract_files(raw: &str) -> Result<GeneratedFiles, ApiError> {
    let candidate = json_span()
        .find(raw)
        .ok_or_else(|| {
            log::error!("No JSON object found in model output ({} bytes)", raw.len());
            ApiError::Parse("No valid JSON found in response".to_string())
        })?
        .as_str();

    let value = parse_candidate(candidate)?;
    let mut files = into_file_map(&value)?;
    ensure_required_files(&mut files)?;
    Ok(files)
}

/// Parse the candidate span, falling back to a fence-stripped second pass
fn parse_candidate(candidate: &str) -> Result<Value, ApiError> {
    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return Ok(value);
    }

    let cleaned: String = candidate
        .replace("```json", "")
        .replace("```", "")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    serde_json::from_str(cleaned.trim()).map_err(|e| {
        log::error!("Failed to parse model output after cleaning: {}", e);
        ApiError::Parse("Failed to parse generated content as JSON".to_string())
    })
}

/// Resolve the parsed value into a path -> file map.
///
/// Schema-following replies nest the map under a `files` member next to
/// `projectTitle`/`explanation`; terser replies put the paths at the top
/// level. File paths always start with `/`, which is how file entries are
/// told apart from metadata.
fn into_file_map(value: &Value) -> Result<GeneratedFiles, ApiError> {
    let object = value
        .as_object()
        .ok_or_else(|| ApiError::Parse("Generated content is not a JSON object".to_string()))?;

    let file_entries = if object.keys().any(|key| key.starts_with('/')) {
        object
    } else {
        match object.get("files") {
            Some(Value::Object(files)) => files,
            _ => object,
        }
    };

    let mut files = GeneratedFiles::new();
    for (path, entry) in file_entries {
        if !path.starts_with('/') {
            continue;
        }
        let file: GeneratedFile = serde_json::from_value(entry.clone()).map_err(|_| {
            ApiError::Parse(format!(
                "File entry {path} does not match the {{\"code\": \"...\"}} shape"
            ))
        })?;
        files.insert(path.clone(), file);
    }

    Ok(files)
}

/// Backfill required files. Idempotent: existing entries are never replaced.
pub fn ensure_required_files(files: &mut GeneratedFiles) -> Result<(), ApiError> {
    let missing: Vec<&str> = REQUIRED_FILES
        .iter()
        .filter(|path| !files.contains_key(**path))
        .copied()
        .collect();

    if !missing.is_empty() {
        log::warn!("Missing required files: {:?}", missing);

        // Only the entry point can be synthesized; /App.js has no default
        files
            .entry("/index.js".to_string())
            .or_insert_with(|| GeneratedFile {
                code: DEFAULT_INDEX_JS.to_string(),
            });

        let still_missing: Vec<String> = REQUIRED_FILES
            .iter()
            .filter(|path| !files.contains_key(**path))
            .map(|path| path.to_string())
            .collect();
        if !still_missing.is_empty() {
            return Err(ApiError::MissingFiles(still_missing));
        }
    }

    files
        .entry("/public/index.html".to_string())
        .or_insert_with(|| GeneratedFile {
            code: DEFAULT_INDEX_HTML.to_string(),
        });

    Ok(())
}
