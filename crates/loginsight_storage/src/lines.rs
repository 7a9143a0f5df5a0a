//! Conversion between file content and line sequences.

/// Splits file content into lines, dropping empty and whitespace-only lines.
///
/// Lines are split on `\n` only; any other characters, including a trailing
/// `\r`, are kept verbatim.
#[must_use]
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::to_owned)
        .collect()
}

/// Joins lines into file content with one trailing `\n`.
///
/// An empty sequence produces empty content.
#[must_use]
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let capacity = lines.iter().map(|l| l.as_ref().len() + 1).sum();
    let mut content = String::with_capacity(capacity);
    for line in lines {
        content.push_str(line.as_ref());
        content.push('\n');
    }
    content
}
