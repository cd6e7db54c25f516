//! Template Renderer
//!
//! Literal token substitution into HTML templates, plus the index wrapper page
//! that frames the first rendered page. Pure functions, no I/O.

use crate::types::PageValues;

/// Substitute every occurrence of every key with its value in one left-to-right pass.
///
/// Keys are plain substrings, not template syntax, and values are inserted
/// verbatim and never rescanned. Where several keys match at the same position the
/// longest wins, so a key that is a prefix of another (`HERO` vs `HERO_SUB`) cannot
/// clobber it. Empty keys are ignored. Keys absent from the template are no-ops.
pub fn render(template: &str, values: &PageValues) -> String {
    let mut keys: Vec<(&str, &str)> = values
        .iter()
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    keys.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut html = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(c) = rest.chars().next() {
        match keys.iter().find(|(key, _)| rest.starts_with(key)) {
            Some((key, value)) => {
                html.push_str(value);
                rest = &rest[key.len()..];
            }
            None => {
                html.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    html
}

/// Settings for the index wrapper page.
#[derive(Debug, Clone)]
pub struct IndexPage<'a> {
    /// File name of the first rendered page, relative to the wrapper
    pub page_filename: &'a str,
    pub title: &'a str,
    pub cta_text: &'a str,
    pub cta_url: &'a str,
}

/// Fixed HTML shell embedding the first page in an inline frame, followed by a
/// static call-to-action block.
pub fn render_index(page: &IndexPage<'_>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <style>
    html, body {{ margin: 0; height: 100%; font-family: system-ui, sans-serif; }}
    .preview {{ display: flex; flex-direction: column; height: 100%; }}
    .preview iframe {{ flex: 1; width: 100%; border: 0; }}
    .cta {{ padding: 1rem; text-align: center; background: #111; color: #fff; }}
    .cta a {{ color: #fff; font-weight: 600; margin-left: 0.5rem; }}
  </style>
</head>
<body>
  <div class="preview">
    <iframe src="{src}" title="{title}"></iframe>
    <div class="cta">
      <span>{cta_text}</span>
      <a href="{cta_url}">Get started</a>
    </div>
  </div>
</body>
</html>
"#,
        title = escape_html(page.title),
        src = escape_html(page.page_filename),
        cta_text = escape_html(page.cta_text),
        cta_url = escape_html(page.cta_url),
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
