use lazy_static::lazy_static;
use regex::Regex;

use super::prompt::Vertical;

const CASUAL_PHRASES: [&str; 13] = [
    "Absolutely!",
    "Hey there",
    "Great question",
    "Of course!",
    "Sure thing",
    "No problem",
    "Definitely",
    "For sure",
    "Totally",
    "Amazing",
    "Awesome",
    "Perfect",
    "Excellent question",
];

const PROFESSIONAL_PREFIXES: [&str; 5] = ["Based on", "According to", "Your", "As a", "Given"];

lazy_static! {
    static ref CASUAL_RE: Regex = {
        let alternatives: Vec<String> = CASUAL_PHRASES
            .iter()
            .map(|phrase| {
                let escaped = regex::escape(phrase);
                // A trailing `\b` only makes sense after a word character.
                if phrase.ends_with(|c: char| c.is_alphanumeric()) {
                    format!(r"{escaped}\b")
                } else {
                    escaped
                }
            })
            .collect();
        Regex::new(&format!(
            r"(?i)\b(?:{})[[:punct:]]?\s*",
            alternatives.join("|")
        ))
        .expect("casual phrase pattern")
    };
    static ref LEADING_BANGS_RE: Regex = Regex::new(r"(?m)^!+").expect("leading bang pattern");
}

fn normalizing_prefix(vertical: Vertical) -> &'static str {
    match vertical {
        Vertical::Diet => "Based on your health profile, ",
        Vertical::Exercise => "Based on your fitness profile, ",
    }
}

/// Strips casual filler and makes the text open in a professional register.
///
/// Phrase-level only; HTML tags pass through untouched.
pub fn sanitize(raw: &str, vertical: Vertical) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let without_filler = CASUAL_RE.replace_all(raw, "");
    let without_bangs = LEADING_BANGS_RE.replace_all(&without_filler, "");

    let trimmed = without_bangs.trim();
    let text = if PROFESSIONAL_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
    {
        trimmed.to_string()
    } else {
        format!("{}{}", normalizing_prefix(vertical), trimmed.trim_start())
    };

    text.trim().to_string()
}
