//! `cmin minify` command implementation.
//!
//! Rewrites one C source using the event trace its frontend produced.

use cmin_core::config::ScopePolicySetting;
use cmin_core::{minify_file, MinifyConfig};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Minify command action.
#[derive(Debug, Clone)]
pub struct MinifyAction {
    /// Source file to rewrite.
    pub source: PathBuf,
    /// Event trace for the source.
    pub trace: PathBuf,
    /// Working directory; relative paths resolve against it.
    pub cwd: PathBuf,
    /// Output file (overrides the config file).
    pub output: Option<PathBuf>,
    /// Config file (defaults to `cmin.json` in `cwd` if present).
    pub config: Option<PathBuf>,
    /// Entry point name (overrides the config file).
    pub entry: Option<String>,
    /// Extra reserved names, added to those in the config file.
    pub reserve: Vec<String>,
    /// Scope policy (overrides the config file).
    pub scope_policy: Option<ScopePolicySetting>,
    /// Print the result instead of writing a file.
    pub stdout: bool,
}

impl MinifyAction {
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Settings from the config file with command-line overrides applied.
    fn settings(&self) -> cmin_core::Result<MinifyConfig> {
        let mut config = match &self.config {
            Some(path) => MinifyConfig::load(&self.resolve(path))?,
            None => MinifyConfig::discover(&self.cwd)?,
        };
        if let Some(entry) = &self.entry {
            config.entry_point.clone_from(entry);
        }
        config.reserved.extend(self.reserve.iter().cloned());
        if let Some(policy) = self.scope_policy {
            config.scope_policy = policy;
        }
        if let Some(output) = &self.output {
            config.output.clone_from(output);
        }
        Ok(config)
    }
}

/// JSON output for the minify command.
#[derive(Serialize)]
struct MinifyResultJson {
    ok: bool,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    /// Rewritten source under `--stdout`, so stdout stays one JSON document.
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    renamed: usize,
    references: usize,
    skipped: usize,
    bytes_before: usize,
    bytes_after: usize,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<MinifyErrorJson>,
}

#[derive(Serialize)]
struct MinifyErrorJson {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

/// What a successful run produced.
struct Minified {
    output: Option<PathBuf>,
    /// Rewritten source, when it goes to stdout instead of a file.
    code: Option<String>,
    renamed: usize,
    references: usize,
    skipped: usize,
    bytes_before: usize,
    bytes_after: usize,
}

/// Run the minify command.
pub fn run(action: MinifyAction, json: bool) -> Result<()> {
    let start = Instant::now();
    let result = minify(&action);
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(done) => {
            let output = done.output.as_ref().map(|p| p.display().to_string());
            if json {
                let json_result = MinifyResultJson {
                    ok: true,
                    source: action.source.display().to_string(),
                    output,
                    code: done.code,
                    renamed: done.renamed,
                    references: done.references,
                    skipped: done.skipped,
                    bytes_before: done.bytes_before,
                    bytes_after: done.bytes_after,
                    duration_ms,
                    error: None,
                };
                println!("{}", serde_json::to_string(&json_result).into_diagnostic()?);
            } else if let Some(code) = &done.code {
                print!("{code}");
            } else if let Some(output) = output {
                println!(
                    "  {} -> {} ({} renamed, {} references, {} -> {} bytes, {}ms)",
                    action.source.display(),
                    output,
                    done.renamed,
                    done.references,
                    done.bytes_before,
                    done.bytes_after,
                    duration_ms
                );
            }
            Ok(())
        }
        Err(e) if json => {
            let json_result = MinifyResultJson {
                ok: false,
                source: action.source.display().to_string(),
                output: None,
                code: None,
                renamed: 0,
                references: 0,
                skipped: 0,
                bytes_before: 0,
                bytes_after: 0,
                duration_ms,
                error: Some(MinifyErrorJson {
                    code: e.code().to_string(),
                    message: e.to_string(),
                    path: e.path().map(|p| p.display().to_string()),
                }),
            };
            println!("{}", serde_json::to_string(&json_result).into_diagnostic()?);
            std::process::exit(1);
        }
        Err(e) => Err(e)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to minify {}", action.source.display())),
    }
}

fn minify(action: &MinifyAction) -> cmin_core::Result<Minified> {
    let settings = action.settings()?;
    let source_path = action.resolve(&action.source);
    let trace_path = action.resolve(&action.trace);

    let out = minify_file(&source_path, &trace_path, &settings.mangle_options())?;

    let (output, code) = if action.stdout {
        (None, Some(out.code.clone()))
    } else {
        let path = action.resolve(&settings.output);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        check_distinct(&source_path, &path)?;
        std::fs::write(&path, &out.code)?;
        (Some(path), None)
    };

    Ok(Minified {
        output,
        code,
        renamed: out.stats.declarations,
        references: out.stats.references,
        skipped: out.stats.external,
        bytes_before: out.bytes_before,
        bytes_after: out.code.len(),
    })
}

/// Refuse to overwrite the source with its own output, however either is spelled.
fn check_distinct(source: &Path, output: &Path) -> cmin_core::Result<()> {
    let source = std::fs::canonicalize(source)?;
    let resolved = if output.exists() {
        std::fs::canonicalize(output)?
    } else {
        match (output.parent(), output.file_name()) {
            (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
                std::fs::canonicalize(parent)?.join(name)
            }
            _ => output.to_path_buf(),
        }
    };
    if resolved == source {
        return Err(cmin_core::Error::other(format!(
            "output {} would overwrite the source",
            output.display()
        )));
    }
    Ok(())
}
