//! Line Filter
//!
//! A single pass over the input lines. Each line gets exactly one action,
//! decided by the first rule that applies, in this order:
//!
//! 1. duplicate guard (first occurrence kept, later ones dropped)
//! 2. header replacement
//! 3. type removal
//! 4. block skipping
//!
//! Rules 1-3 apply whether or not a block is currently being skipped.
//!
//! ```text
//!            skip rule opens
//!   Outside ─────────────────▶ Inside { close_marker }
//!      ▲                              │
//!      └──────────────────────────────┘
//!           line contains close_marker
//! ```

use std::borrow::Cow;

use serde::Serialize;
use tracing::{debug, trace};

use crate::rules::RuleSet;

/// Block-skip state of the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState<'r> {
    Outside,
    Inside { close_marker: &'r str },
}

/// What the filter did with a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    Keep,
    Replace,
    DropDuplicate,
    DropType,
    OpenBlock,
    DropInBlock,
    CloseBlock,
}

/// Per-run tally of filter actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub lines_in: usize,
    pub kept: usize,
    pub replaced: usize,
    pub duplicates_dropped: usize,
    pub types_dropped: usize,
    pub block_lines_dropped: usize,
    pub blocks_removed: usize,
    /// Close marker still pending when input ended
    pub unterminated_block: Option<String>,
}

impl FilterReport {
    pub fn lines_out(&self) -> usize {
        self.kept + self.replaced
    }

    pub fn lines_removed(&self) -> usize {
        self.duplicates_dropped + self.types_dropped + self.block_lines_dropped
    }

    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn record(&mut self, action: LineAction) {
        self.lines_in += 1;
        match action {
            LineAction::Keep => self.kept += 1,
            LineAction::Replace => self.replaced += 1,
            LineAction::DropDuplicate => self.duplicates_dropped += 1,
            LineAction::DropType => self.types_dropped += 1,
            LineAction::OpenBlock => {
                self.blocks_removed += 1;
                self.block_lines_dropped += 1;
            }
            LineAction::DropInBlock | LineAction::CloseBlock => self.block_lines_dropped += 1,
        }
    }
}

/// Filtered lines plus the report for the pass
#[derive(Debug)]
pub struct FilterOutput<'a> {
    pub lines: Vec<Cow<'a, str>>,
    pub report: FilterReport,
}

/// Stateful line filter driven by a [`RuleSet`]
#[derive(Debug)]
pub struct LineFilter<'r> {
    rules: &'r RuleSet,
    state: FilterState<'r>,
    guard_seen: bool,
    line_no: usize,
    report: FilterReport,
}

impl<'r> LineFilter<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self {
            rules,
            state: FilterState::Outside,
            guard_seen: false,
            line_no: 0,
            report: FilterReport::default(),
        }
    }

    pub fn state(&self) -> FilterState<'r> {
        self.state
    }

    /// Feed one line; returns the text to emit, if any
    pub fn push<'a>(&mut self, line: &'a str) -> Option<Cow<'a, str>> {
        self.line_no += 1;
        let (action, output) = self.decide(line);
        trace!(line = self.line_no, ?action, "filtered line");
        self.report.record(action);
        output
    }

    fn decide<'a>(&mut self, line: &'a str) -> (LineAction, Option<Cow<'a, str>>) {
        let rules = self.rules;

        if let Some(marker) = rules.duplicate_guard.as_deref() {
            if line.contains(marker) {
                if self.guard_seen {
                    debug!(line = self.line_no, marker, "dropping duplicate declaration");
                    return (LineAction::DropDuplicate, None);
                }
                self.guard_seen = true;
                return (LineAction::Keep, Some(Cow::Borrowed(line)));
            }
        }

        if let Some(header) = rules.header_replacements.iter().find(|h| line.contains(&h.old)) {
            debug!(line = self.line_no, new = %header.new, "replacing header");
            return (LineAction::Replace, Some(Cow::Owned(format!("{}\n", header.new))));
        }

        if rules.type_removals.iter().any(|pattern| line.contains(pattern)) {
            return (LineAction::DropType, None);
        }

        match self.state {
            FilterState::Outside => match rules.skip_rules.iter().find(|rule| rule.opens(line)) {
                Some(rule) => {
                    debug!(line = self.line_no, marker = %rule.marker, "removing block");
                    self.state = FilterState::Inside {
                        close_marker: &rule.close,
                    };
                    (LineAction::OpenBlock, None)
                }
                None => (LineAction::Keep, Some(Cow::Borrowed(line))),
            },
            FilterState::Inside { close_marker } => {
                if line.contains(close_marker) {
                    self.state = FilterState::Outside;
                    (LineAction::CloseBlock, None)
                } else {
                    (LineAction::DropInBlock, None)
                }
            }
        }
    }

    /// End the pass and return the report
    pub fn finish(mut self) -> FilterReport {
        if let FilterState::Inside { close_marker } = self.state {
            self.report.unterminated_block = Some(close_marker.to_string());
        }
        self.report
    }
}

/// Run `rules` over `lines` in one pass
pub fn filter_lines<'a, I>(rules: &RuleSet, lines: I) -> FilterOutput<'a>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut filter = LineFilter::new(rules);
    let lines = lines.into_iter().filter_map(|line| filter.push(line)).collect();
    FilterOutput {
        lines,
        report: filter.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{HeaderReplacement, SkipRule};

    fn run<'a>(rules: &RuleSet, input: &[&'a str]) -> (Vec<String>, FilterReport) {
        let output = filter_lines(rules, input.iter().copied());
        let lines = output.lines.into_iter().map(Cow::into_owned).collect();
        (lines, output.report)
    }

    fn table_rule() -> RuleSet {
        RuleSet {
            skip_rules: vec![SkipRule::new("a = pgTable", "{", "});")],
            ..RuleSet::default()
        }
    }

    #[test]
    fn test_unmatched_lines_pass_through() {
        let rules = RuleSet::system_health();
        let input = ["import { pgTable } from \"drizzle-orm/pg-core\";\n", "\n", "export const users = pgTable(\"users\", {\n", "});\n"];
        let (lines, report) = run(&rules, &input);
        assert_eq!(lines, input);
        assert_eq!(report.kept, 4);
        assert_eq!(report.lines_removed(), 0);
    }

    #[test]
    fn test_end_to_end_block_removal() {
        let input = ["a = pgTable('a', {", "col1", "});", "b = pgTable", "end of file"];
        let (lines, report) = run(&table_rule(), &input);
        assert_eq!(lines, vec!["b = pgTable", "end of file"]);
        assert_eq!(report.blocks_removed, 1);
        assert_eq!(report.block_lines_dropped, 3);
        assert_eq!(report.unterminated_block, None);
    }

    #[test]
    fn test_block_removed_with_surroundings_kept() {
        let rules = RuleSet {
            skip_rules: vec![SkipRule::new("name", "open", "close")],
            ..RuleSet::default()
        };
        let input = ["before", "X name open", "inner1", "inner2", "X close", "after"];
        let (lines, _) = run(&rules, &input);
        assert_eq!(lines, vec!["before", "after"]);
    }

    #[test]
    fn test_marker_without_open_is_kept() {
        let input = ["a = pgTable(", "col1", "});"];
        let (lines, _) = run(&table_rule(), &input);
        assert_eq!(lines, input);
    }

    #[test]
    fn test_duplicate_guard_keeps_first() {
        let rules = RuleSet {
            duplicate_guard: Some("complaints = pgTable".to_string()),
            ..RuleSet::default()
        };
        let input = [
            "export const complaints = pgTable(\"complaints\", {\n",
            "  id: serial(\"id\"),\n",
            "export const complaints = pgTable(\"complaints\", {\n",
            "export const complaints = pgTable(\"complaints\", {\n",
        ];
        let (lines, report) = run(&rules, &input);
        assert_eq!(lines, &input[..2]);
        assert_eq!(report.duplicates_dropped, 2);
    }

    #[test]
    fn test_header_replaced_in_place() {
        let rules = RuleSet {
            header_replacements: vec![HeaderReplacement::new("// Old Module", "// New Module")],
            ..RuleSet::default()
        };
        let input = ["a\n", "  // Old Module relations\n", "b\n"];
        let (lines, report) = run(&rules, &input);
        assert_eq!(lines, vec!["a\n", "// New Module\n", "b\n"]);
        assert_eq!(report.replaced, 1);
        assert_eq!(report.lines_out(), 3);
    }

    #[test]
    fn test_type_removal_after_block_close() {
        let rules = RuleSet {
            type_removals: vec!["export type A =".to_string()],
            ..table_rule()
        };
        let input = ["a = pgTable('a', {", "col1", "});", "export type A = typeof a;", "kept"];
        let (lines, report) = run(&rules, &input);
        assert_eq!(lines, vec!["kept"]);
        assert_eq!(report.types_dropped, 1);
    }

    #[test]
    fn test_type_removal_does_not_close_block() {
        let rules = RuleSet {
            type_removals: vec!["export type A =".to_string()],
            ..table_rule()
        };
        let input = ["a = pgTable('a', {", "export type A = {}); ", "col", "});", "kept"];
        let (lines, _) = run(&rules, &input);
        assert_eq!(lines, vec!["kept"]);
    }

    #[test]
    fn test_guard_and_header_apply_inside_block() {
        let rules = RuleSet {
            duplicate_guard: Some("complaints = pgTable".to_string()),
            header_replacements: vec![HeaderReplacement::new("// Old", "// New")],
            ..table_rule()
        };
        let input = ["a = pgTable('a', {", "complaints = pgTable", "// Old", "col", "});", "tail"];
        let (lines, _) = run(&rules, &input);
        assert_eq!(lines, vec!["complaints = pgTable", "// New\n", "tail"]);
    }

    #[test]
    fn test_guard_beats_header() {
        let rules = RuleSet {
            duplicate_guard: Some("G".to_string()),
            header_replacements: vec![HeaderReplacement::new("// H", "// N")],
            ..RuleSet::default()
        };
        let (lines, report) = run(&rules, &["G // H", "// H"]);
        assert_eq!(lines, vec!["G // H", "// N\n"]);
        assert_eq!(report.kept, 1);
        assert_eq!(report.replaced, 1);
    }

    #[test]
    fn test_header_beats_type_removal() {
        let rules = RuleSet {
            type_removals: vec!["export type Alert =".to_string()],
            header_replacements: vec![HeaderReplacement::new("// H", "// N")],
            ..RuleSet::default()
        };
        let (lines, report) = run(&rules, &["// H export type Alert ="]);
        assert_eq!(lines, vec!["// N\n"]);
        assert_eq!(report.types_dropped, 0);
    }

    #[test]
    fn test_type_removal_beats_block_open() {
        let rules = RuleSet {
            skip_rules: vec![SkipRule::new("Alert", "{", "});")],
            type_removals: vec!["export type Alert =".to_string()],
            ..RuleSet::default()
        };
        let mut filter = LineFilter::new(&rules);
        assert_eq!(filter.push("export type Alert = {"), None);
        assert_eq!(filter.state(), FilterState::Outside);
        assert_eq!(filter.push("keep").as_deref(), Some("keep"));

        let report = filter.finish();
        assert_eq!(report.types_dropped, 1);
        assert_eq!(report.blocks_removed, 0);
        assert_eq!(report.unterminated_block, None);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = RuleSet {
            skip_rules: vec![
                SkipRule::new("enumA", "[", ");"),
                SkipRule::new("enumA", "[", "]"),
            ],
            ..RuleSet::default()
        };
        let input = ["enumA = pgEnum('a', [", "'x',", "]);", "after"];
        let mut filter = LineFilter::new(&rules);
        assert_eq!(filter.push(input[0]), None);
        assert_eq!(filter.state(), FilterState::Inside { close_marker: ");" });
        assert_eq!(filter.push(input[1]), None);
        assert_eq!(filter.push(input[2]), None);
        assert_eq!(filter.state(), FilterState::Outside);
        assert_eq!(filter.push(input[3]).as_deref(), Some("after"));
    }

    #[test]
    fn test_unterminated_block_swallows_rest() {
        let input = ["keep", "a = pgTable('a', {", "col1", "col2"];
        let (lines, report) = run(&table_rule(), &input);
        assert_eq!(lines, vec!["keep"]);
        assert_eq!(report.unterminated_block.as_deref(), Some("});"));
    }

    #[test]
    fn test_report_json() {
        let (_, report) = run(&table_rule(), &["a = pgTable('a', {", "});"]);
        let json = report.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["blocks_removed"], 1);
        assert_eq!(value["lines_in"], 2);
    }
}
