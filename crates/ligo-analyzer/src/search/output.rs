use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::search::RawHit;

static HIT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?):(\d+):(.*)$").expect("static regex is valid"));

/// Parse `path:line:content` lines as printed by `git grep -n`.
///
/// Lines that do not have that shape, or that report line 0, are skipped.
pub fn parse_output(output: &str) -> Vec<RawHit> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<RawHit> {
    let caps = HIT_LINE.captures(line)?;
    let path = caps.get(1)?.as_str();
    let line_number = caps.get(2)?.as_str().parse::<u32>().ok().filter(|n| *n > 0)?;
    if path.is_empty() {
        return None;
    }

    Some(RawHit {
        path: PathBuf::from(path),
        line: line_number,
        text: caps.get(3)?.as_str().to_string(),
    })
}

/// Length of `hit` as one `path:line:content` output line.
pub(crate) fn rendered_len(hit: &RawHit) -> usize {
    hit.path.as_os_str().len() + hit.line.to_string().len() + hit.text.len() + 3
}

#[cfg(test)]
#[path = "../../tests/src/search/output_tests.rs"]
mod tests;
