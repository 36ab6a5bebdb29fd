//! # Text Sanitizer
//!
//! Pure helpers that turn noisy research snippets (markdown, link syntax,
//! bullet glyphs, navigation menus) into short, sentence-bounded prose that
//! can be dropped onto a slide. Nothing here does I/O or keeps state.

use regex::Regex;
use std::sync::LazyLock;

/// Navigation/menu terms stripped from snippets (matched case-insensitively)
pub const NAVIGATION_STOPWORDS: &[&str] = &[
    "home",
    "pricing",
    "docs",
    "documentation",
    "resources",
    "customers",
    "solutions",
    "product",
    "shop",
    "latest",
    "trends",
    "book",
    "demo",
    "request",
    "back",
];

/// Default fragment cap for `clean_summary_text`
pub const DEFAULT_MAX_SENTENCES: usize = 5;

const MIN_FRAGMENT_CHARS: usize = 30;
const MIN_ALPHA_RATIO: f64 = 0.4;
const ELLIPSIS: &str = "...";

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?P<label>[^\]]+)\]\((?P<url>[^)]+)\)").expect("Invalid link regex pattern")
});

static MARKDOWN_TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*_`#]+").expect("Invalid markdown regex pattern"));

static MULTI_SPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("Invalid whitespace regex pattern"));

static SCRIPT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!--.*?-->")
        .expect("Invalid script regex pattern")
});

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("Invalid tag regex pattern"));

/// Collapse a noisy snippet into at most `max_sentences` tidy fragments.
///
/// Fragments shorter than 30 characters or with fewer than 40% alphabetic
/// characters are dropped. If nothing survives, the whole normalized text is
/// returned with navigation tokens removed, or an empty string when that
/// leaves no letters.
pub fn clean_summary_text(text: &str, max_sentences: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let normalized = normalize_markup(text);

    let mut kept: Vec<String> = Vec::new();
    for fragment in split_fragments(&normalized) {
        if kept.len() >= max_sentences {
            break;
        }
        let candidate = strip_navigation_tokens(fragment);
        let candidate = candidate.trim_matches(|c: char| c == ' ' || c == '-');
        if candidate.is_empty() || candidate.chars().count() < MIN_FRAGMENT_CHARS {
            continue;
        }
        if alpha_ratio(candidate) < MIN_ALPHA_RATIO {
            continue;
        }
        kept.push(candidate.to_string());
    }

    if kept.is_empty() {
        let rest = strip_navigation_tokens(&normalized);
        if !rest.chars().any(char::is_alphabetic) {
            return String::new();
        }
        return rest.trim().to_string();
    }
    kept.join(" ").trim().to_string()
}

/// Sanitize then hard-cap the result at `max_chars` characters.
pub fn polish_text(value: &str, max_sentences: usize, max_chars: usize) -> String {
    clean_summary_text(value, max_sentences)
        .chars()
        .take(max_chars)
        .collect()
}

/// Remove whitespace-separated tokens that are navigation stop words.
///
/// Surrounding punctuation is ignored when matching, so `Docs.` and `(Home)`
/// are treated as navigation tokens too.
pub fn strip_navigation_tokens(text: &str) -> String {
    text.split_whitespace()
        .filter(|token| !is_navigation_token(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trim `text` to `max_chars` characters, ending with `...` when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Trim `text` to `max_chars`, backing off to a word boundary when one is close.
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let head: String = text.chars().take(keep).collect();

    // Back off only when the cut lands mid-word and a space sits in the second half.
    let next_is_break = text
        .chars()
        .nth(keep)
        .map(char::is_whitespace)
        .unwrap_or(true);
    let cut = if next_is_break {
        head.as_str()
    } else {
        match head.rfind(char::is_whitespace) {
            Some(idx) if idx >= head.len() / 2 => &head[..idx],
            _ => head.as_str(),
        }
    };

    let mut out = cut.trim_end().to_string();
    out.push_str(ELLIPSIS);
    out
}

/// Reduce an HTML document to its visible text, one space between strings.
pub fn strip_html(html: &str) -> String {
    let without_code = SCRIPT_PATTERN.replace_all(html, " ");
    let without_tags = TAG_PATTERN.replace_all(&without_code, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_markup(text: &str) -> String {
    let stripped = LINK_PATTERN.replace_all(text, "$label");
    let stripped = MARKDOWN_TOKEN_PATTERN.replace_all(&stripped, "");
    let stripped = stripped
        .replace('•', " ")
        .replace('–', " - ")
        .replace('—', " - ");
    MULTI_SPACE_PATTERN.replace_all(&stripped, " ").into_owned()
}

/// Split after `.`, `!` or `?` followed by whitespace, and on newlines.
fn split_fragments(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch == '\n' {
            fragments.push(&text[start..idx]);
            while let Some(&(_, '\n')) = chars.peek() {
                chars.next();
            }
            start = chars.peek().map(|&(i, _)| i).unwrap_or(text.len());
        } else if matches!(ch, '.' | '!' | '?') {
            let end = idx + ch.len_utf8();
            let mut saw_space = false;
            while let Some(&(_, next)) = chars.peek() {
                if next.is_whitespace() {
                    saw_space = true;
                    chars.next();
                } else {
                    break;
                }
            }
            if saw_space {
                fragments.push(&text[start..end]);
                start = chars.peek().map(|&(i, _)| i).unwrap_or(text.len());
            }
        }
    }
    if start < text.len() {
        fragments.push(&text[start..]);
    }
    fragments
}

fn is_navigation_token(token: &str) -> bool {
    let word = token.trim_matches(|c: char| !c.is_alphanumeric());
    !word.is_empty()
        && NAVIGATION_STOPWORDS
            .iter()
            .any(|stop| stop.eq_ignore_ascii_case(word))
}

fn alpha_ratio(text: &str) -> f64 {
    let total = text.chars().count().max(1);
    let alpha = text.chars().filter(|c| c.is_alphabetic()).count();
    alpha as f64 / total as f64
}
