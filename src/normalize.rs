// src/normalize.rs
//! Text normalization: markup/entity stripping and title tokenization.

use std::collections::HashSet;

/// Korean news-title boilerplate with no topical signal. Tokens are compared
/// after punctuation stripping, so entries are bare words.
const STOP_WORDS: &[&str] = &[
    "속보", "단독", "종합", "영상", "포토", "전문", "인터뷰", "칼럼", "사설", "기고", "뉴스",
    "기사", "오늘", "이번", "관련", "대한", "위한", "무단", "전재", "재배포", "금지",
];

/// Strip HTML tags and entities from a raw snippet and collapse whitespace.
/// Pure; returns an empty string for empty input.
pub fn strip(raw: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(raw).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

fn is_separator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '[' | ']'
                | '('
                | ')'
                | '{'
                | '}'
                | '<'
                | '>'
                | '"'
                | '\''
                | '\u{201C}'
                | '\u{201D}'
                | '\u{2018}'
                | '\u{2019}'
                | '\u{00AB}'
                | '\u{00BB}'
                | ','
                | '.'
                | '\u{00B7}'
                | ':'
                | ';'
                | '!'
                | '?'
                | '\u{2026}'
        )
}

/// Tokenize a title into a comparable word set: bracket/quote punctuation is
/// treated as a separator, stop words are removed, and only tokens with at
/// least two alphanumeric (incl. Hangul) characters survive.
pub fn word_set(title: &str) -> HashSet<String> {
    let cleaned = strip(title);
    let mut out = HashSet::new();
    for piece in cleaned.split(is_separator) {
        let token: String = piece.chars().filter(|c| c.is_alphanumeric()).collect();
        if token.chars().count() < 2 {
            continue;
        }
        if STOP_WORDS.contains(&token.as_str()) {
            continue;
        }
        out.insert(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_removes_tags_and_entities() {
        let s = "<b>통상임금&nbsp;판결</b> &amp; 후속&nbsp;조치";
        assert_eq!(strip(s), "통상임금 판결 & 후속 조치");
    }

    #[test]
    fn strip_collapses_whitespace() {
        assert_eq!(strip("  a \n\t b  "), "a b");
        assert_eq!(strip(""), "");
    }

    #[test]
    fn word_set_drops_stop_words_and_short_tokens() {
        let ws = word_set("[단독] 기업 A 통상임금 판결");
        assert!(ws.contains("기업"));
        assert!(ws.contains("통상임금"));
        assert!(ws.contains("판결"));
        // "단독" is boilerplate, "A" is a single char
        assert!(!ws.contains("단독"));
        assert!(!ws.contains("A"));
    }

    #[test]
    fn word_set_handles_quotes_and_brackets() {
        let ws = word_set("\u{201C}주4일제\u{201D} 도입(시범) 검토");
        assert!(ws.contains("주4일제"));
        assert!(ws.contains("도입"));
        assert!(ws.contains("시범"));
        assert!(ws.contains("검토"));
    }

    #[test]
    fn word_set_of_empty_title_is_empty() {
        assert!(word_set("").is_empty());
        assert!(word_set("! ? ...").is_empty());
    }
}
