//! Zip export of project assets (notes, moodboard and mindmap documents).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

use crate::error::{AppError, Result};
use crate::util::{iso8601_utc, slugify, unix_now};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a> {
    project_name: &'a str,
    exported_at: String,
    files: Vec<String>,
}

/// Normalizes an entry path to a relative `/`-separated form.
/// Rejects traversal (`..`) and paths with nothing left after cleanup.
pub fn normalize_entry_path(raw: &str) -> Result<String> {
    let unified = raw.replace('\\', "/");
    let mut parts = Vec::new();
    for part in unified.split('/') {
        match part.trim() {
            "" | "." => continue,
            ".." => {
                return Err(AppError::InvalidInput(format!(
                    "invalid file path '{raw}'"
                )))
            }
            p => parts.push(p),
        }
    }
    if parts.is_empty() {
        return Err(AppError::InvalidInput("file path is required".into()));
    }
    Ok(parts.join("/"))
}

/// Builds a deflate-compressed zip with every file under a folder named after
/// the project, plus a `manifest.json` at that folder's root.
pub fn build_archive(project_name: &str, files: &[ExportFile], max_files: usize) -> Result<Vec<u8>> {
    if files.is_empty() {
        return Err(AppError::InvalidInput("files must not be empty".into()));
    }
    if files.len() > max_files {
        return Err(AppError::InvalidInput(format!(
            "too many files ({}, max {max_files})",
            files.len()
        )));
    }

    let root = slugify(project_name);
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let path = normalize_entry_path(&file.path)?;
        if path == "manifest.json" || !seen.insert(path.clone()) {
            return Err(AppError::InvalidInput(format!("duplicate file path '{path}'")));
        }
        entries.push((path, file.content.as_bytes()));
    }

    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));

    for (path, content) in &entries {
        writer.start_file(format!("{root}/{path}"), options)?;
        writer.write_all(content)?;
    }

    let manifest = Manifest {
        project_name: project_name.trim(),
        exported_at: iso8601_utc(unix_now()),
        files: entries.iter().map(|(path, _)| path.clone()).collect(),
    };
    writer.start_file(format!("{root}/manifest.json"), options)?;
    writer.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

    let bytes = writer.finish()?.into_inner();
    tracing::info!(project = %root, files = entries.len(), bytes = bytes.len(), "archive built");
    Ok(bytes)
}
