/*!
 * Inline styling translation between ASS override blocks and SRT tags.
 *
 * Both directions return the converted text together with a description of
 * every styling feature that had no equivalent and was dropped.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle_processor::Cue;

/// ASS override block (`{\i1\k20}`)
static OVERRIDE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}]*)\}").unwrap());

/// Toggle tags SRT can express
static TOGGLE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([ibus])(\d*)$").unwrap());

/// HTML-like SRT tag
static SRT_TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\s*(/?)\s*([A-Za-z]+)([^>]*)>").unwrap());

/// `color="#RRGGBB"` attribute of a font tag
static FONT_COLOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)color\s*=\s*["']?#?([0-9a-f]{2})([0-9a-f]{2})([0-9a-f]{2})["']?"#).unwrap()
});

/// Style field values that match an unstyled cue; empty values always do
const STYLE_FIELD_DEFAULTS: &[(&str, &str)] = &[
    ("Layer", "0"),
    ("Marked", "0"),
    ("Marked", "Marked=0"),
    ("Style", "Default"),
    ("Style", "*Default"),
    ("MarginL", "0"),
    ("MarginR", "0"),
    ("MarginV", "0"),
];

/// Describe the cue-level ASS styling an SRT file cannot carry
pub fn ass_style_features(cue: &Cue) -> Vec<String> {
    let Some(style) = &cue.style else {
        return Vec::new();
    };

    style
        .iter()
        .filter(|(key, value)| {
            let value = value.trim();
            if value.is_empty() {
                return false;
            }
            // SSA writes margins zero-padded ("0000")
            let is_zero = value.parse::<i64>().is_ok_and(|n| n == 0);
            !STYLE_FIELD_DEFAULTS.iter().any(|(k, v)| {
                k.eq_ignore_ascii_case(key) && (v.eq_ignore_ascii_case(value) || (*v == "0" && is_zero))
            })
        })
        .map(|(key, value)| format!("ASS {} '{}'", key.to_lowercase(), value.trim()))
        .collect()
}

/// Convert ASS dialogue text (lines joined with `\n`) to SRT markup.
///
/// Italic, bold, underline and strikeout toggles become `<i>`, `<b>`, `<u>`
/// and `<s>`; tags still open at the end of the cue are closed. Every other
/// override tag is dropped.
pub fn ass_to_srt(text: &str) -> (String, Vec<String>) {
    let mut dropped: Vec<String> = Vec::new();
    let mut open: Vec<char> = Vec::new();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in OVERRIDE_BLOCK_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&text[last..whole.start()]);
        last = whole.end();

        let body = &caps[1];
        if !body.contains('\\') {
            // Plain `{comment}` blocks carry no styling
            continue;
        }

        for tag in body.split('\\').map(str::trim).filter(|t| !t.is_empty()) {
            match TOGGLE_TAG_REGEX.captures(tag) {
                Some(toggle) => {
                    let name = toggle[1].chars().next().unwrap_or('i');
                    let enable = !matches!(&toggle[2], "" | "0");
                    if enable && !open.contains(&name) {
                        open.push(name);
                        out.push_str(&format!("<{}>", name));
                    } else if !enable && open.contains(&name) {
                        open.retain(|c| *c != name);
                        out.push_str(&format!("</{}>", name));
                    }
                }
                None => {
                    let feature = describe_override_tag(tag);
                    if !dropped.contains(&feature) {
                        dropped.push(feature);
                    }
                }
            }
        }
    }
    out.push_str(&text[last..]);

    while let Some(name) = open.pop() {
        out.push_str(&format!("</{}>", name));
    }

    let out = out.replace("\\h", "\u{a0}");
    (out, dropped)
}

/// Convert SRT text (lines joined with `\n`) to ASS override blocks.
pub fn srt_to_ass(text: &str) -> (String, Vec<String>) {
    let mut dropped: Vec<String> = Vec::new();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut coloured_fonts: Vec<bool> = Vec::new();

    for caps in SRT_TAG_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&text[last..whole.start()]);
        last = whole.end();

        let closing = !caps[1].is_empty();
        let name = caps[2].to_lowercase();
        let attrs = &caps[3];

        match name.as_str() {
            "i" | "b" | "u" | "s" => {
                out.push_str(&format!("{{\\{}{}}}", name, if closing { 0 } else { 1 }));
            }
            "font" if closing => {
                if coloured_fonts.pop().unwrap_or(false) {
                    out.push_str("{\\c}");
                }
            }
            "font" => {
                let colour = FONT_COLOR_REGEX.captures(attrs);
                coloured_fonts.push(colour.is_some());
                if let Some(c) = colour {
                    // ASS colours are &HBBGGRR&
                    let bgr = format!("{}{}{}", &c[3], &c[2], &c[1]).to_uppercase();
                    out.push_str(&format!("{{\\c&H{}&}}", bgr));
                }
                let other_attrs = FONT_COLOR_REGEX.replace(attrs, "");
                if !other_attrs.trim().is_empty() {
                    push_unique(&mut dropped, "SRT font face/size".to_string());
                }
            }
            other => {
                push_unique(&mut dropped, format!("SRT <{}> tag", other));
            }
        }
    }
    out.push_str(&text[last..]);

    (out, dropped)
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// Human-readable name of an ASS override tag
fn describe_override_tag(tag: &str) -> String {
    let category = if tag.starts_with('k') || tag.starts_with('K') {
        "karaoke tag"
    } else if ["pos", "move", "org", "an", "a"].iter().any(|p| starts_with_tag(tag, p)) {
        "positioning tag"
    } else if tag.starts_with("alpha")
        || ["c", "1c", "2c", "3c", "4c", "1a", "2a", "3a", "4a"].iter().any(|p| starts_with_tag(tag, p))
    {
        "colour tag"
    } else if tag.starts_with("fad") {
        "fade tag"
    } else if tag.starts_with("fn") || tag.starts_with("fs") || tag.starts_with("fe") {
        "font tag"
    } else if tag.starts_with("fr") || tag.starts_with("fa") {
        "rotation tag"
    } else if tag.starts_with("bord") || tag.starts_with("shad") || tag.starts_with("blur") || tag.starts_with("be") {
        "border effect tag"
    } else if tag.starts_with("t(") {
        "animation tag"
    } else if starts_with_tag(tag, "p") {
        "drawing tag"
    } else {
        "override tag"
    };

    let name: String = tag.chars().take_while(|c| *c != '(' && *c != '&').collect();
    format!("ASS {} \\{}", category, name)
}

/// True when `tag` is `prefix` followed by a value (digit, `(`, `&`) or nothing
fn starts_with_tag(tag: &str, prefix: &str) -> bool {
    match tag.strip_prefix(prefix) {
        Some(rest) => rest
            .chars()
            .next()
            .is_none_or(|c| c.is_ascii_digit() || c == '(' || c == '&' || c == '-'),
        None => false,
    }
}
