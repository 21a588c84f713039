// src/content/mod.rs
pub mod policy;
pub mod resolver;
pub mod sources;
pub mod types;

use once_cell::sync::Lazy;
use regex::Regex;

pub use resolver::ContentResolver;
pub use types::{
    ActivityItem, ActivityKind, ContentKind, ContentSource, ResolvedPayload, SourceError,
    SourcePayload,
};

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<[^>]+>").expect("tag regex"));
static RE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li)>").expect("line break regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Turn an HTML fragment into display text: tags stripped, entities decoded,
/// typographic quotes flattened, whitespace collapsed.
pub fn normalize_text(s: &str) -> String {
    // Keep block and line breaks as word separators before stripping tags
    let out = RE_BREAKS.replace_all(s, " ");
    let out = RE_TAGS.replace_all(&out, "");
    let out = html_escape::decode_html_entities(&out).to_string();

    let out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{00A0}', " ");

    RE_WS.replace_all(&out, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_tags_and_entities() {
        let s = "  <span>Hello,&nbsp;&nbsp;<b>world</b></span>&rsquo;s <br/>best  ";
        assert_eq!(normalize_text(s), "Hello, world's best");
    }

    #[test]
    fn normalize_keeps_paragraphs_apart() {
        assert_eq!(normalize_text("<p>one</p><p>two</p>"), "one two");
        assert_eq!(normalize_text("<div>one</div><div>two</div>"), "one two");
    }
}
