//! Manifest utility for Heartwise model artifacts.
//!
//! Writes `manifest.json` binding the SHA-256 of every JSON artifact in a
//! model directory, so the app can detect a corrupted or swapped model.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin write_manifest -- <model_dir>
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};

use heartwise::adapters::model::{ModelManifest, MANIFEST_FILE};

fn usage() -> anyhow::Error {
    anyhow!("Usage: write_manifest <model_dir>")
}

fn parse_args() -> Result<PathBuf> {
    let mut args = env::args().skip(1);
    let model_dir = match args.next().as_deref() {
        Some("-h" | "--help") | None => return Err(usage()),
        Some(arg) => PathBuf::from(arg),
    };
    if args.next().is_some() {
        return Err(usage());
    }
    Ok(model_dir)
}

/// Directory holding the model: `path` itself, or its parent when `path` is a file.
fn resolve_model_dir(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path
            .parent()
            .ok_or_else(|| anyhow!("Model path has no parent directory"))?
            .to_path_buf());
    }
    if !path.is_dir() {
        bail!("Model path not found at {path:?}");
    }
    Ok(path)
}

/// Sorted names of the JSON artifacts in `model_dir`, excluding the manifest itself.
fn model_files(model_dir: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(model_dir)
        .with_context(|| format!("Failed to read {model_dir:?}"))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".json") && name != MANIFEST_FILE)
        .collect();
    names.sort();

    if names.is_empty() {
        bail!("No model JSON found in {model_dir:?}");
    }
    Ok(names)
}

fn main() -> Result<()> {
    let model_dir = resolve_model_dir(parse_args()?)?;
    let names = model_files(&model_dir)?;

    let manifest = ModelManifest::for_files(&model_dir, &names)?;
    let manifest_bytes =
        serde_json::to_vec_pretty(&manifest).context("Failed to serialize manifest.json")?;

    let manifest_path = model_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .with_context(|| format!("Failed to write {manifest_path:?}"))?;

    for (name, digest) in &manifest.files {
        println!("{digest}  {name}");
    }
    println!("Wrote manifest: {manifest_path:?}");

    Ok(())
}
