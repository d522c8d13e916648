//! Entry-point isolation for embedded script source
//!
//! Script task payloads embed a blob of C#-like or Basic-like source that
//! varies by tool version and may not parse as a real program. The goal here
//! is a best-effort excerpt of the designated entry-point routine for a human
//! reader, not compilation-correct extraction. The tiers below run in a fixed
//! order and the loose end-anchored regex behavior of tier 1 is intentional:
//! it spans from the entry-point declaration to the last closing brace of the
//! text, not the nearest one.

use regex::Regex;
use tracing::trace;

const CSHARP_ENTRY_TOKEN: &str = "public void Main()";

/// End-anchored C#-style patterns, tried in order.
const CSHARP_PATTERNS: [&str; 2] = [
    r"(?s)public void Main\(\)\s*\{.*?\n\s*\}\s*$",
    r"(?s)public void Main\(\)\s*\{.*?\n\s*Dts\.TaskResult.*?\n\s*\}\s*$",
];

/// Basic-style pattern: declaration to the next `End Sub` token.
const VB_PATTERN: &str = r"(?s)Public Sub Main\(\)\s*\n.*?\nEnd Sub";

const EXCERPT_LIMIT: usize = 1000;

/// Isolate the entry-point routine from raw embedded script text.
///
/// Tiered fallback:
/// 1. loose end-anchored C# regexes,
/// 2. Basic-style `Public Sub Main()` .. `End Sub` regex,
/// 3. manual brace-depth matching from the literal `public void Main()`,
/// 4. the first 1000 characters, with a truncation marker when the input
///    was longer.
pub fn isolate_entry_point(code: &str) -> String {
    for pattern in CSHARP_PATTERNS {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(m) = re.find(code) {
            trace!("entry point matched C# pattern");
            return m.as_str().to_string();
        }
    }

    let re = Regex::new(VB_PATTERN).expect("valid regex");
    if let Some(m) = re.find(code) {
        trace!("entry point matched Basic pattern");
        return m.as_str().to_string();
    }

    if let Some(start) = code.find(CSHARP_ENTRY_TOKEN) {
        if let Some(len) = balanced_block_len(&code[start..]) {
            trace!("entry point isolated by brace matching");
            return code[start..start + len].to_string();
        }
    }

    trace!("no entry point found, returning excerpt");
    excerpt(code)
}

/// Byte length of the text up to and including the brace that returns the
/// nesting depth to zero after it has gone positive. `None` when the braces
/// never balance.
fn balanced_block_len(code: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut opened = false;
    for (i, ch) in code.char_indices() {
        match ch {
            '{' => {
                depth += 1;
                opened = true;
            }
            '}' => {
                depth -= 1;
                if opened && depth == 0 {
                    return Some(i + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

fn excerpt(code: &str) -> String {
    let mut head: String = code.chars().take(EXCERPT_LIMIT).collect();
    if code.chars().nth(EXCERPT_LIMIT).is_some() {
        head.push_str("...");
    }
    head
}
