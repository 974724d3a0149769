//! Resilient extraction of structured records from model output
//!
//! Generation models are asked for raw JSON but routinely wrap it in code
//! fences, prepend apologies, or mangle quoting. Extraction therefore never
//! fails: it works through progressively looser parse stages and falls back
//! field-by-field to deterministic placeholders.
//!
//! Stages, first success wins per field:
//! 1. strip fence markers and attempt a strict JSON parse of the remainder
//! 2. strict-parse the first balanced `{...}` span in the cleaned text
//! 3. per-field regex recovery with escaped-quote handling
//! 4. deterministic fallback values

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// Structured dish data recovered from a turn's text step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DishRecord {
    pub title: String,
    pub narrative: String,
    pub image_prompt: String,
}

/// Structured intro data recovered from the pre-round name/bio step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntroRecord {
    pub name: String,
    pub bio: String,
}

/// Placeholder title used when no dish title can be recovered.
pub const FALLBACK_DISH_TITLE: &str = "Chef's Special";

/// Generic biography used when no bio text can be recovered at all.
pub const FALLBACK_BIO: &str = "A mysterious chef ready to compete.";

const BIO_EXCERPT_LIMIT: usize = 180;

static FENCE_TAGGED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)```[a-z]*").unwrap());

/// Strip code fence delimiters (tagged or bare) and surrounding whitespace.
fn clean_fences(raw: &str) -> String {
    let without_tagged = FENCE_TAGGED.replace_all(raw, "");
    without_tagged.replace("```", "").trim().to_string()
}

/// Find the first balanced `{...}` span, respecting JSON string literals and
/// escapes so braces inside values do not break the scan.
fn balanced_object_span(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strict parse of cleaned text, then of its first balanced object span.
fn parse_loose(cleaned: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        if value.is_object() {
            return Some(value);
        }
    }
    let span = balanced_object_span(cleaned)?;
    serde_json::from_str::<Value>(span).ok().filter(Value::is_object)
}

/// Case-insensitive lookup of the first non-empty string value among `keys`.
fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    let object = value.as_object()?;
    for key in keys {
        for (k, v) in object {
            if k.eq_ignore_ascii_case(key) {
                if let Some(s) = v.as_str() {
                    let trimmed = s.trim();
                    if !trimmed.is_empty() {
                        return Some(trimmed.to_string());
                    }
                }
            }
        }
    }
    None
}

/// The closed set of keys recovery may be asked for; one compiled pattern
/// per key.
const FIELD_KEYS: [&str; 6] = [
    "dishTitle",
    "monologue",
    "shortImagePrompt",
    "name",
    "bio",
    "backstory",
];

static FIELD_PATTERNS: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    FIELD_KEYS
        .iter()
        .map(|field| {
            let pattern = format!(
                r#"(?i)"?\s*\b{field}\b\s*"?\s*[:=]\s*"((?:\\.|[^"\\])*)""#,
                field = regex::escape(field)
            );
            (*field, Regex::new(&pattern).unwrap())
        })
        .collect()
});

/// Per-field regex recovery: matches `"field": "value"` with a
/// case-insensitive key, tolerating dropped quotes around the key and `=` in
/// place of `:`. The value capture steps over escaped characters.
fn regex_field(cleaned: &str, field: &str) -> Option<String> {
    let re = FIELD_PATTERNS.get(field)?;
    let captured = re.captures(cleaned)?.get(1)?.as_str();
    let unescaped = unescape(captured);
    let trimmed = unescaped.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Undo JSON string escapes found inside regex-captured values.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn resolve_field(parsed: Option<&Value>, cleaned: &str, keys: &[&str]) -> Option<String> {
    if let Some(value) = parsed {
        if let Some(found) = string_field(value, keys) {
            return Some(found);
        }
    }
    keys.iter().find_map(|key| regex_field(cleaned, key))
}

/// Recover a dish record from raw model output. Never fails: each field falls
/// back independently per the stage order above.
pub fn extract_dish(raw: &str) -> DishRecord {
    let cleaned = clean_fences(raw);
    let parsed = parse_loose(&cleaned);

    let title = resolve_field(parsed.as_ref(), &cleaned, &["dishTitle"])
        .unwrap_or_else(|| FALLBACK_DISH_TITLE.to_string());

    let narrative = resolve_field(parsed.as_ref(), &cleaned, &["monologue"]).unwrap_or_else(|| {
        if cleaned.is_empty() {
            title.clone()
        } else {
            cleaned.clone()
        }
    });

    let image_prompt = resolve_field(parsed.as_ref(), &cleaned, &["shortImagePrompt"])
        .unwrap_or_else(|| title.clone());

    DishRecord {
        title,
        narrative,
        image_prompt,
    }
}

/// Strip surrounding quote characters a model sometimes leaves on names.
fn strip_quotes(name: &str) -> &str {
    name.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

fn truncated_excerpt(text: &str) -> String {
    text.chars().take(BIO_EXCERPT_LIMIT).collect::<String>().trim_end().to_string()
}

/// Recover an intro record from raw model output. `fallback_name` is the
/// chef's pre-existing placeholder name.
///
/// Models occasionally nest the whole JSON record as a string under `bio`,
/// so extraction is re-applied to the resolved bio and nested values win.
pub fn extract_intro(raw: &str, fallback_name: &str) -> IntroRecord {
    let cleaned = clean_fences(raw);
    let parsed = parse_loose(&cleaned);

    let mut name = resolve_field(parsed.as_ref(), &cleaned, &["name"])
        .unwrap_or_else(|| fallback_name.to_string());

    let mut bio = resolve_field(parsed.as_ref(), &cleaned, &["bio", "backstory"])
        .unwrap_or_else(|| {
            if cleaned.is_empty() {
                FALLBACK_BIO.to_string()
            } else {
                truncated_excerpt(&cleaned)
            }
        });

    // A nested record under `bio` supersedes what was resolved so far.
    if let Some(nested) = parse_loose(&clean_fences(&bio)) {
        if let Some(nested_name) = string_field(&nested, &["name"]) {
            name = nested_name;
        }
        if let Some(nested_bio) = string_field(&nested, &["bio", "backstory"]) {
            bio = nested_bio;
        }
    }

    let name = {
        let stripped = strip_quotes(&name);
        if stripped.is_empty() {
            if fallback_name.trim().is_empty() {
                "Mystery Chef".to_string()
            } else {
                fallback_name.trim().to_string()
            }
        } else {
            stripped.to_string()
        }
    };

    let bio = {
        let trimmed = bio.trim();
        if trimmed.is_empty() {
            FALLBACK_BIO.to_string()
        } else {
            trimmed.to_string()
        }
    };

    IntroRecord { name, bio }
}
