//! Schema Prune
//!
//! One-shot cleanup of a Drizzle `schema.ts`: removes retired enum, table and
//! insert-schema blocks, drops their type aliases, and renames a relations
//! header. Works line by line; the file is never parsed.
//!
//! ## Rules
//!
//! - **Skip rules**: a line containing a marker and an opening token starts a
//!   block that runs to the first line containing the closing token
//! - **Type removals**: any line containing the pattern is dropped
//! - **Header replacements**: any line containing the old text becomes the new text
//! - **Duplicate guard**: only the first line containing the marker survives
//!
//! ## Example
//!
//! ```
//! use schema_prune::{prune_str, RuleSet, SkipRule};
//!
//! let rules = RuleSet {
//!     skip_rules: vec![SkipRule::new("a = pgTable", "{", "});")],
//!     ..RuleSet::default()
//! };
//! let (out, report) = prune_str("a = pgTable('a', {\ncol1\n});\nb = pgTable\n", &rules);
//! assert_eq!(out, "b = pgTable\n");
//! assert_eq!(report.blocks_removed, 1);
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod lines;
pub mod rewrite;
pub mod rules;

pub use config::PruneConfig;
pub use error::{PruneError, Result};
pub use filter::{filter_lines, FilterOutput, FilterReport, FilterState, LineAction, LineFilter};
pub use rewrite::{prune_str, rewrite_file, RewriteOptions, RewriteOutcome};
pub use rules::{HeaderReplacement, RuleSet, SkipRule};
