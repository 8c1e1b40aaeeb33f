//! Line splitting that keeps terminators attached

use std::borrow::Cow;

/// Split `content` after every `\n`. A trailing fragment without a
/// terminator is still returned as a line.
pub fn split_lines(content: &str) -> Vec<&str> {
    content.split_inclusive('\n').collect()
}

/// Concatenate lines produced by [`split_lines`] or by the filter
pub fn join_lines(lines: &[Cow<'_, str>]) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.len()).sum());
    for line in lines {
        out.push_str(line);
    }
    out
}
