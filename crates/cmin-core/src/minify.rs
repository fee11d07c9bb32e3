//! Minifying one source file from its event trace.

use std::path::Path;
use std::time::Instant;

use cmin_mangle::{Event, MangleOptions, MangleStats, Minifier};
use tracing::{debug, info, info_span};

use crate::error::{Error, Result};
use crate::rewrite::SourceRewriter;
use crate::trace::{Trace, MAIN_FILE};

/// Result of minifying one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifyOutput {
    /// Rewritten source.
    pub code: String,
    pub stats: MangleStats,
    /// Edits applied to the source.
    pub edits: usize,
    /// Length of the source before rewriting.
    pub bytes_before: usize,
}

/// Rename the identifiers of `source` as described by `trace`.
pub fn minify_source(source: &str, trace: &Trace, options: &MangleOptions) -> Result<MinifyOutput> {
    let span = info_span!("minify", file = %trace.file);
    let _guard = span.enter();
    let start = Instant::now();

    let file_end = u32::try_from(source.len()).map_err(|_| {
        Error::other(format!(
            "{} is too large to minify ({} bytes)",
            trace.file,
            source.len()
        ))
    })?;
    let events = trace.resolve(source)?;
    let options = options.clone().with_kept_names(&events, MAIN_FILE);

    let mut rewriter = SourceRewriter::new(source);
    let mut minifier = Minifier::new(&options, MAIN_FILE, file_end, &mut rewriter);
    for event in &events {
        let renamed = minifier.handle(event);
        if let (Event::Declaration(decl), Some(name)) = (event, renamed) {
            debug!(from = %decl.name, to = %name, offset = decl.position, "renamed");
        }
    }
    let (_, stats) = minifier.finish();

    let edits = rewriter.len();
    let code = rewriter.finish()?;
    info!(
        renamed = stats.declarations,
        references = stats.references,
        kept = stats.kept,
        skipped = stats.external,
        bytes_saved = stats.bytes_saved,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "minified"
    );
    Ok(MinifyOutput {
        code,
        stats,
        edits,
        bytes_before: source.len(),
    })
}

/// Read `source_path` and `trace_path`, then minify.
pub fn minify_file(
    source_path: &Path,
    trace_path: &Path,
    options: &MangleOptions,
) -> Result<MinifyOutput> {
    let source = std::fs::read_to_string(source_path)?;
    let trace = Trace::load(trace_path)?;
    minify_source(&source, &trace, options)
}
