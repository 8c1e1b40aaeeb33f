//! In-place rewrite of a schema file
//!
//! Reads the whole file, runs the [`LineFilter`](crate::filter::LineFilter)
//! over it and writes the result back to the same path.

use std::fs;
use std::path::{Path, PathBuf};

use similar::TextDiff;
use tracing::{info, warn};

use crate::error::{PruneError, Result};
use crate::filter::{filter_lines, FilterReport};
use crate::lines::{join_lines, split_lines};
use crate::rules::RuleSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteOptions {
    /// Do not write the file back
    pub dry_run: bool,
    /// Produce a unified diff of the change
    pub diff: bool,
}

/// Result of rewriting one file
#[derive(Debug)]
pub struct RewriteOutcome {
    pub path: PathBuf,
    pub report: FilterReport,
    /// Output differs from input
    pub changed: bool,
    /// File was written back
    pub written: bool,
    pub diff: Option<String>,
}

/// Filter `content` and return the new text with its report
pub fn prune_str(content: &str, rules: &RuleSet) -> (String, FilterReport) {
    let output = filter_lines(rules, split_lines(content));
    (join_lines(&output.lines), output.report)
}

/// Apply `rules` to the file at `path`
pub fn rewrite_file(path: impl AsRef<Path>, rules: &RuleSet, options: &RewriteOptions) -> Result<RewriteOutcome> {
    let path = path.as_ref();
    let original = fs::read_to_string(path).map_err(|source| PruneError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let (pruned, report) = prune_str(&original, rules);

    if let Some(close) = &report.unterminated_block {
        warn!(path = %path.display(), close = %close, "block never closed, rest of file removed");
    }

    let changed = pruned != original;
    let diff = (options.diff && changed).then(|| {
        let name = path.display().to_string();
        TextDiff::from_lines(original.as_str(), pruned.as_str())
            .unified_diff()
            .context_radius(3)
            .header(&name, &name)
            .to_string()
    });

    let written = changed && !options.dry_run;
    if written {
        fs::write(path, &pruned).map_err(|source| PruneError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    info!(
        path = %path.display(),
        lines_in = report.lines_in,
        lines_out = report.lines_out(),
        blocks = report.blocks_removed,
        written,
        "pruned schema"
    );

    Ok(RewriteOutcome {
        path: path.to_path_buf(),
        report,
        changed,
        written,
        diff,
    })
}
