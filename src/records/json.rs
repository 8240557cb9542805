//! Plugin manifest and marketplace catalog records.
//!
//! Both are JSON objects rewritten with key order preserved and 2-space
//! indentation, followed by a trailing newline.

use super::{Edit, Version, read_to_string, write_atomic};
use crate::error::{GuardError, Result};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Raw `version` string of a plugin manifest.
///
/// Unlike the other records, an unreadable manifest is an error.
pub fn read_manifest_version(path: &Path) -> Result<String> {
    let doc = read_json(path)?;
    doc.get("version")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| GuardError::MissingVersion(path.to_path_buf()))
}

/// Version recorded in manifest content taken from history.
///
/// Returns `None` when the content is not JSON or carries no valid version.
pub fn manifest_version_from_str(content: &str) -> Option<Version> {
    let doc: Value = serde_json::from_str(content).ok()?;
    doc.get("version")?.as_str()?.parse().ok()
}

/// Version of `plugin`'s catalog entry.
///
/// A missing file, malformed catalog or unlisted plugin all read as `None`.
pub fn read_catalog_version(path: &Path, plugin: &str) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    let doc = read_json(path).map_err(|e| debug!("{e}")).ok()?;
    catalog_entry(&doc, plugin)?
        .get("version")?
        .as_str()
        .map(String::from)
}

/// Set the manifest's `version` field.
pub fn write_manifest_version(path: &Path, version: &Version) -> Result<Edit> {
    if !path.is_file() {
        return Ok(Edit::NoFile);
    }
    let mut doc = read_json(path)?;
    let Some(object) = doc.as_object_mut() else {
        return Err(GuardError::MissingVersion(path.to_path_buf()));
    };

    let edit = set_version(object, version);
    if matches!(edit, Edit::Updated { .. }) {
        write_json(path, &doc)?;
    }
    Ok(edit)
}

/// Set the `version` of `plugin`'s catalog entry.
pub fn write_catalog_version(path: &Path, plugin: &str, version: &Version) -> Result<Edit> {
    if !path.is_file() {
        return Ok(Edit::NoFile);
    }
    let mut doc = read_json(path)?;
    let Some(entry) = catalog_entry_mut(&mut doc, plugin) else {
        return Ok(Edit::NotFound);
    };

    let edit = set_version(entry, version);
    if matches!(edit, Edit::Updated { .. }) {
        write_json(path, &doc)?;
    }
    Ok(edit)
}

fn set_version(object: &mut serde_json::Map<String, Value>, version: &Version) -> Edit {
    let new = version.to_string();
    let old = object.get("version").and_then(Value::as_str).map(String::from);
    if old.as_deref() == Some(new.as_str()) {
        return Edit::Unchanged;
    }
    object.insert("version".to_string(), Value::String(new));
    Edit::Updated { old }
}

fn catalog_entry<'a>(doc: &'a Value, plugin: &str) -> Option<&'a Value> {
    doc.get("plugins")?
        .as_array()?
        .iter()
        .find(|p| p.get("name").and_then(Value::as_str) == Some(plugin))
}

fn catalog_entry_mut<'a>(
    doc: &'a mut Value,
    plugin: &str,
) -> Option<&'a mut serde_json::Map<String, Value>> {
    doc.get_mut("plugins")?
        .as_array_mut()?
        .iter_mut()
        .find(|p| p.get("name").and_then(Value::as_str) == Some(plugin))?
        .as_object_mut()
}

fn read_json(path: &Path) -> Result<Value> {
    let content = read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| GuardError::json(path, e))
}

fn write_json(path: &Path, doc: &Value) -> Result<()> {
    let mut json = serde_json::to_string_pretty(doc).map_err(|e| GuardError::json(path, e))?;
    json.push('\n');
    write_atomic(path, json.as_bytes())
}
