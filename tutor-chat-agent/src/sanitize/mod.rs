//! Display-text sanitization.
//!
//! The agent's narration sometimes echoes the JSON payload of a tool response
//! that is also present structurally in the response. [`sanitize`] strips
//! those echoes with a fixed cascade of passes. Each pass runs on the output
//! of the previous one, and later passes are tuned to catch only the residue
//! of earlier ones, so the order below is part of the observable behaviour:
//!
//! 1. fenced code blocks mentioning a payload keyword
//! 2. bare `{...}` spans mentioning a payload keyword
//! 3. explicit `"bdata": "..."` / `"image_data": "..."` pairs
//! 4. long base64 values on `bdata` / `image_data` keys, any quoting
//! 5. key lines and standalone base64 lines (40+ chars)
//! 6. runs of plot-attribute lines (3 within a 10-line window)
//! 7. final scrub: leftover pairs, doubled commas, blank runs, empty
//!    brackets, 100+ char base64 blobs
//! 8. trim
//!
//! The cascade is heuristic. It can miss fragments and it can remove prose
//! that happens to look like plot attributes.
//!
//! Inline tests live in `tests.rs`.

#[cfg(test)]
mod tests;

use std::sync::LazyLock;

use regex::Regex;

use crate::protocol::RawResponse;

/// Keywords that mark a fenced code block as a payload echo.
pub const FENCED_KEYWORDS: &[&str] = &[
    "plot_data",
    "equations",
    "bdata",
    "dtype",
    "mode",
    "scatter",
    "image_data",
];

/// Keywords that mark a bare brace span as a payload echo.
pub const BRACE_KEYWORDS: &[&str] = &["plot_data", "equations", "bdata", "dtype", "image_data"];

/// Window size, in lines, for the plot-attribute run filter.
pub const ATTRIBUTE_WINDOW: usize = 10;

/// Matching lines within the window needed to drop a run.
pub const ATTRIBUTE_THRESHOLD: usize = 3;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```.*?```").expect("fenced block regex is a valid static pattern")
});

// Unterminated closing quote tolerated.
static QUOTED_PAYLOAD_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""?(?:bdata|image_data)"?\s*:\s*"[A-Za-z0-9+/=]*"?"#)
        .expect("quoted payload pair regex is a valid static pattern")
});

static LONG_PAYLOAD_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]?(?:bdata|image_data)['"]?\s*[:=]\s*['"]?[A-Za-z0-9+/]{20,}={0,2}['"]?"#)
        .expect("long payload value regex is a valid static pattern")
});

static PAYLOAD_KEY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*['"]?(?:bdata|image_data)['"]?\s*[:=]"#)
        .expect("payload key line regex is a valid static pattern")
});

static BLOB_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*['"]?[A-Za-z0-9+/]{40,}={0,2}['"]?,?\s*$"#)
        .expect("blob line regex is a valid static pattern")
});

static PLOT_ATTRIBUTE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*['"]?(?:mode|name|type|x|y|bdata|dtype)['"]?\s*:"#)
        .expect("plot attribute regex is a valid static pattern")
});

static KEYWORD_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#""(?:plot_data|equations|bdata|dtype|mode|scatter|image_data)"\s*:\s*(?:"[^"\n]*"?|\[[^\]\n]*\]|[^,\n}\]]*),?"#,
    )
    .expect("keyword pair regex is a valid static pattern")
});

static DOUBLED_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",(?:\s*,)+").expect("doubled comma regex is a valid static pattern")
});

static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n(?:[ \t]*\n){2,}").expect("blank run regex is a valid static pattern")
});

static EMPTY_BRACKETS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\s*\}|\[\s*\]").expect("empty brackets regex is a valid static pattern")
});

static LONG_BLOB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9+/]{100,}={0,2}").expect("long blob regex is a valid static pattern")
});

/// Remove serialized payload fragments from display text.
///
/// Returns `text` unchanged when `raw` is `None`.
pub fn sanitize(text: &str, raw: Option<&RawResponse>) -> String {
    if raw.is_none() {
        return text.to_string();
    }

    let passes: [(&str, fn(&str) -> String); 7] = [
        ("fenced_blocks", strip_fenced_blocks),
        ("brace_spans", strip_brace_spans),
        ("quoted_pairs", strip_quoted_payload_pairs),
        ("long_values", strip_long_payload_values),
        ("payload_lines", drop_payload_lines),
        ("attribute_runs", drop_attribute_runs),
        ("final_scrub", final_scrub),
    ];

    let mut current = text.to_string();
    for (name, pass) in passes {
        let next = pass(&current);
        if next.len() != current.len() {
            log::trace!(
                "sanitize pass {name}: {} -> {} bytes",
                current.len(),
                next.len()
            );
        }
        current = next;
    }

    current.trim().to_string()
}

/// Pass 1: drop fenced blocks that mention any [`FENCED_KEYWORDS`].
fn strip_fenced_blocks(text: &str) -> String {
    FENCED_BLOCK
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let block = &caps[0];
            if FENCED_KEYWORDS.iter().any(|k| block.contains(k)) {
                String::new()
            } else {
                block.to_string()
            }
        })
        .into_owned()
}

/// Pass 2: drop outermost balanced `{...}` spans that mention any
/// [`BRACE_KEYWORDS`]. Unbalanced braces are left in place.
fn strip_brace_spans(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied_to = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{'
            && let Some(end) = matching_brace(bytes, i)
        {
            let span = &text[i..=end];
            if BRACE_KEYWORDS.iter().any(|k| span.contains(k)) {
                out.push_str(&text[copied_to..i]);
                copied_to = end + 1;
            }
            i = end + 1;
            continue;
        }
        i += 1;
    }

    out.push_str(&text[copied_to..]);
    out
}

/// Index of the `}` closing the `{` at `start`, skipping braces inside
/// double-quoted strings.
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Pass 3.
fn strip_quoted_payload_pairs(text: &str) -> String {
    QUOTED_PAYLOAD_PAIR.replace_all(text, "").into_owned()
}

/// Pass 4.
fn strip_long_payload_values(text: &str) -> String {
    LONG_PAYLOAD_VALUE.replace_all(text, "").into_owned()
}

/// Pass 5: drop payload key lines and standalone base64 lines.
fn drop_payload_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !PAYLOAD_KEY_LINE.is_match(line) && !BLOB_LINE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pass 6: drop runs of plot-attribute lines.
///
/// A window of up to [`ATTRIBUTE_WINDOW`] lines is anchored on each line that
/// itself looks like a plot attribute. When at least [`ATTRIBUTE_THRESHOLD`]
/// lines in the window match, that many lines are dropped starting at the
/// anchor, whether or not every one of them matched.
fn drop_attribute_runs(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut kept = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        if PLOT_ATTRIBUTE_LINE.is_match(lines[i]) {
            let window_end = (i + ATTRIBUTE_WINDOW).min(lines.len());
            let matching = lines[i..window_end]
                .iter()
                .filter(|line| PLOT_ATTRIBUTE_LINE.is_match(line))
                .count();
            if matching >= ATTRIBUTE_THRESHOLD {
                i += matching;
                continue;
            }
        }
        kept.push(lines[i]);
        i += 1;
    }

    kept.join("\n")
}

/// Pass 7.
fn final_scrub(text: &str) -> String {
    let text = KEYWORD_PAIR.replace_all(text, "");
    let text = DOUBLED_COMMA.replace_all(&text, ",");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    let text = EMPTY_BRACKETS.replace_all(&text, "");
    LONG_BLOB.replace_all(&text, "").into_owned()
}
