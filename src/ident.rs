//! Field name sanitizer.
//!
//! Go identifiers must begin with a letter and may contain letters, digits
//! and `_`. With `title_case`, `-`, `_` and spaces are word boundaries;
//! otherwise only spaces are.
//!
//! Letters are the Unicode general categories `L*` and digits are `Nd`, as
//! in Go. `char::is_alphabetic` and `char::is_numeric` are wider than that.
use std::collections::HashSet;

use once_cell::sync::Lazy;
use unicode_general_category::{GeneralCategory, get_general_category};

/// Common initialisms. Only entries that are highly unlikely to be
/// ordinary words belong here ("ID" is fine, "AND" is not).
static COMMON_INITIALISMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP",
        "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SSH", "TLS", "TTL", "UI",
        "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML",
    ]
    .into_iter()
    .collect()
});

pub(crate) fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

pub(crate) fn is_digit(c: char) -> bool {
    matches!(get_general_category(c), GeneralCategory::DecimalNumber)
}

fn is_lower(c: char) -> bool {
    matches!(get_general_category(c), GeneralCategory::LowercaseLetter)
}

pub fn sanitize(raw: &str, title_case: bool) -> String {
    let trimmed = raw.trim_start_matches(|c: char| !is_letter(c));

    let mapped = trimmed.chars().filter_map(|c| match c {
        ' ' => Some(' '),
        '-' | '_' if title_case => Some(' '),
        '-' | '_' => Some('_'),
        c if is_letter(c) || is_digit(c) => Some(c),
        _ => None,
    });

    // Title case each space-delimited word, then drop the spaces.
    let mut s = String::with_capacity(trimmed.len());
    let mut word_start = true;
    for c in mapped {
        if c == ' ' {
            word_start = true;
            continue;
        }
        if word_start {
            s.extend(c.to_uppercase());
        } else {
            s.push(c);
        }
        word_start = false;
    }

    if s.is_empty() {
        s.push('_');
    }

    lint_name(&s, title_case)
}

/// Normalizes initialisms ("Url" → "URL") and camel-cases lowercase words.
pub(crate) fn lint_name(name: &str, title_case: bool) -> String {
    if name == "_" || name.chars().all(is_lower) {
        return name.to_string();
    }

    // Split at lower→non-lower transitions (and at underscores in title case
    // mode), checking each word against the initialism set.
    let mut runes: Vec<char> = name.chars().collect();
    let (mut w, mut i) = (0, 0); // start of word, scan
    while i < runes.len() {
        let mut eow = false;
        if i + 1 == runes.len() {
            eow = true;
        } else if runes[i + 1] != '_' && is_lower(runes[i]) && !is_lower(runes[i + 1]) {
            eow = true;
        } else if title_case && runes[i + 1] == '_' {
            eow = true;
            let mut n = 1;
            while i + n + 1 < runes.len() && runes[i + n + 1] == '_' {
                n += 1;
            }
            // keep one underscore between two digits
            if i + n + 1 < runes.len() && is_digit(runes[i]) && is_digit(runes[i + n + 1]) {
                n -= 1;
            }
            runes.drain(i + 1..i + 1 + n);
        }
        i += 1;
        if !eow {
            continue;
        }

        // [w, i) is a word.
        let word: String = runes[w..i].iter().collect();
        let upper = word.to_uppercase();
        if COMMON_INITIALISMS.contains(upper.as_str()) {
            let replacement = if w == 0 && is_lower(runes[w]) {
                upper.to_lowercase()
            } else {
                upper
            };
            let len = replacement.chars().count();
            runes.splice(w..i, replacement.chars());
            i = w + len;
        } else if w > 0 && word.to_lowercase() == word {
            let first: Vec<char> = runes[w].to_uppercase().collect();
            let len = first.len();
            runes.splice(w..w + 1, first);
            i += len - 1;
        }
        w = i;
    }
    runes.into_iter().collect()
}
