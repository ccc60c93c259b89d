//! Dependency manifest (`requirements.txt`) reading.

use std::path::Path;

use anyhow::{Context, Result};

/// Package specifiers in `content`. Blank lines, comments (whole-line or
/// after whitespace) and installer option lines such as `-r other.txt` or
/// `--index-url ...` are skipped.
pub fn parse_specifiers(content: &str) -> Vec<String> {
    content
        .lines()
        .map(strip_comment)
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('-'))
        .map(String::from)
        .collect()
}

/// `#` starts a comment at line start or after whitespace; `pkg @ url#egg=x` keeps its fragment.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            return &line[..i];
        }
    }
    line
}

pub fn read_specifiers(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    Ok(parse_specifiers(&content))
}
