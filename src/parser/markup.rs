use scraper::{ElementRef, Selector};

use crate::error::{ExtractError, SelectorError};

const NBSP: char = '\u{a0}';

/// Rewrite non-breaking spaces to plain spaces and trim.
///
/// The report pages print thousands separators as `&nbsp;`, so every field
/// goes through here before it is compared or parsed.
pub fn normalize_text(raw: &str) -> String {
    raw.replace(NBSP, " ").trim().to_string()
}

/// Parse a normalized count such as `"1 000"`.
pub fn parse_count(field: &'static str, text: &str) -> Result<u64, ExtractError> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    digits.parse().map_err(|_| ExtractError::InvalidCount {
        field,
        raw: text.to_string(),
    })
}

pub fn selector(css: &str) -> Result<Selector, SelectorError> {
    Selector::parse(css).map_err(|e| SelectorError {
        css: css.to_string(),
        reason: e.to_string(),
    })
}

/// `<tag class="...">` whose `headers` attribute carries every token, e.g.
/// `td.cislo[headers~="t1sa2"][headers~="t1sb3"]`.
///
/// Report pages reuse one class for many numeric cells; the header tokens are
/// what tells them apart.
pub fn cell_with_tokens(tag: &str, class: &str, tokens: &[&str]) -> Result<Selector, SelectorError> {
    let attrs: String = tokens
        .iter()
        .map(|t| format!("[headers~=\"{t}\"]"))
        .collect();
    selector(&format!("{tag}.{class}{attrs}"))
}

/// Cells whose `headers` attribute contains any of `markers` as a substring.
pub fn cell_containing(tag: &str, class: &str, markers: &[&str]) -> Result<Selector, SelectorError> {
    let list: Vec<String> = markers
        .iter()
        .map(|m| format!("{tag}.{class}[headers*=\"{m}\"]"))
        .collect();
    selector(&list.join(", "))
}

pub fn element_text(el: &ElementRef<'_>) -> String {
    normalize_text(&el.text().collect::<String>())
}

/// Normalized text of the first match under `scope`; `None` when absent.
pub fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope.select(sel).next().map(|el| element_text(&el))
}

/// Like [`first_text`] but absence is a [`ExtractError::MissingField`].
pub fn require_count(scope: ElementRef<'_>, sel: &Selector, field: &'static str) -> Result<u64, ExtractError> {
    let text = first_text(scope, sel).ok_or(ExtractError::MissingField { field })?;
    parse_count(field, &text)
}

/// First `<a href>` matched by `links` under `el` as (href, normalized link text).
pub fn first_link(el: ElementRef<'_>, links: &Selector) -> Option<(String, String)> {
    el.select(links).find_map(|a| {
        let href = a.value().attr("href")?;
        Some((href.trim().to_string(), element_text(&a)))
    })
}
