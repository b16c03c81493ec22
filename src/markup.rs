//! Extraction of IDL fragments embedded in markup.
//!
//! Elements carrying the `idl` class come in two forms: a descriptive list
//! (`<dl title="...">` with one `<dt>` per member, value or argument) which is
//! reconstituted into IDL text, and preformatted text (`<pre>`) which is
//! already IDL.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("I don't know how to parse IDL from <{0}> tags")]
    UnsupportedTag(String),

    #[error("<{0}> element is never closed")]
    Unterminated(String),

    #[error("<dl> element has no title")]
    MissingTitle,

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// True when the document should be scanned for embedded fragments rather
/// than parsed as IDL directly
pub fn is_markup(locator: &str, contents: &str) -> bool {
    let lowered = locator.to_ascii_lowercase();
    lowered.ends_with(".html") || lowered.ends_with(".htm") || contents.trim_start().starts_with('<')
}

/// Patterns shared by every element of one document
struct MarkupPatterns {
    opening: Regex,
    class: Regex,
    title: Regex,
    term: Regex,
    tag: Regex,
}

impl MarkupPatterns {
    fn new() -> Result<Self, MarkupError> {
        Ok(Self {
            opening: Regex::new(r"(?is)<([a-z][a-z0-9]*)\b([^>]*)>")?,
            class: Regex::new(r#"(?is)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)?,
            title: Regex::new(r#"(?is)\btitle\s*=\s*(?:"([^"]*)"|'([^']*)')"#)?,
            term: Regex::new(r"(?is)<dt\b[^>]*>(.*?)</dt>")?,
            tag: Regex::new(r"(?s)<[^>]*>")?,
        })
    }

    fn strip_tags(&self, html: &str) -> String {
        self.tag.replace_all(html, "").into_owned()
    }
}

/// Unparsed IDL text of every `idl`-classed element, in document order. A
/// failing element does not prevent the others from being extracted.
pub fn extract_fragments(markup: &str) -> Result<Vec<Result<String, MarkupError>>, MarkupError> {
    let patterns = MarkupPatterns::new()?;
    let lowered = markup.to_ascii_lowercase();

    let mut fragments = Vec::new();
    for captures in patterns.opening.captures_iter(markup) {
        let attributes = &captures[2];
        let is_idl = patterns
            .class
            .captures(attributes)
            .and_then(|found| found.get(1).or_else(|| found.get(2)).or_else(|| found.get(3)))
            .map_or(false, |classes| classes.as_str().split_whitespace().any(|c| c == "idl"));
        if !is_idl {
            continue;
        }

        let tag = captures[1].to_ascii_lowercase();
        let body_start = captures.get(0).map_or(0, |whole| whole.end());
        let fragment = match tag.as_str() {
            "dl" | "pre" => match lowered[body_start..].find(&format!("</{}", tag)) {
                Some(offset) => {
                    let body = &markup[body_start..body_start + offset];
                    if tag == "dl" {
                        from_descriptive_list(&patterns, attributes, body)
                    } else {
                        Ok(decode_entities(&patterns.strip_tags(body)))
                    }
                }
                None => Err(MarkupError::Unterminated(tag)),
            },
            _ => Err(MarkupError::UnsupportedTag(tag)),
        };
        fragments.push(fragment);
    }

    Ok(fragments)
}

fn from_descriptive_list(patterns: &MarkupPatterns, attributes: &str, body: &str) -> Result<String, MarkupError> {
    let title = patterns
        .title
        .captures(attributes)
        .and_then(|found| found.get(1).or_else(|| found.get(2)))
        .map(|title| decode_entities(title.as_str().trim()))
        .ok_or(MarkupError::MissingTitle)?;

    let terms: Vec<String> = patterns
        .term
        .captures_iter(body)
        .map(|captures| decode_entities(patterns.strip_tags(&captures[1]).trim()))
        .collect();

    let is_callback = title.starts_with("callback ") && !title.starts_with("callback interface");
    let unparsed = if is_callback {
        format!("{}({});", title, terms.join(", "))
    } else if title.starts_with("enum ") {
        let values: Vec<String> = terms.iter().map(|value| format!("    \"{}\"", value)).collect();
        format!("{} {{\n{}\n}};", title, values.join(",\n"))
    } else if title.starts_with("typedef ") {
        format!("{};", title)
    } else {
        let members: Vec<String> = terms.iter().map(|member| format!("    {};", member)).collect();
        format!("{} {{\n{}\n}};", title, members.join("\n"))
    };
    Ok(unparsed)
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(markup: &str) -> Vec<String> {
        extract_fragments(markup)
            .unwrap()
            .into_iter()
            .map(|fragment| fragment.unwrap())
            .collect()
    }

    #[test]
    fn test_is_markup() {
        assert!(is_markup("https://example.com/spec.HTML", "enum A { \"a\" };"));
        assert!(is_markup("spec.txt", "  <!DOCTYPE html>"));
        assert!(!is_markup("widget.idl", "interface Widget {};"));
    }

    #[test]
    fn test_pre_is_taken_verbatim() {
        let fragments = extract(
            r##"<p>intro</p><pre class="idl">interface <a href="#w">Widget</a> {
  attribute sequence&lt;DOMString&gt; tags;
};</pre>"##,
        );
        assert_eq!(
            fragments,
            vec!["interface Widget {\n  attribute sequence<DOMString> tags;\n};".to_string()]
        );
    }

    #[test]
    fn test_descriptive_list_forms() {
        let fragments = extract(
            r#"
            <dl class="idl" title="dictionary WidgetInit"><dt>long count</dt><dt>DOMString label</dt></dl>
            <dl class="idl" title="enum Color"><dt>red</dt><dt>green</dt></dl>
            <dl class='idl' title="callback WidgetCallback = void"><dt>Widget widget</dt><dt>boolean force</dt></dl>
            <dl class="idl" title="typedef DOMString WidgetId"></dl>
            "#,
        );

        assert_eq!(fragments[0], "dictionary WidgetInit {\n    long count;\n    DOMString label;\n};");
        assert_eq!(fragments[1], "enum Color {\n    \"red\",\n    \"green\"\n};");
        assert_eq!(fragments[2], "callback WidgetCallback = void(Widget widget, boolean force);");
        assert_eq!(fragments[3], "typedef DOMString WidgetId;");
    }

    #[test]
    fn test_callback_interface_uses_member_form() {
        let fragments = extract(
            r#"<dl class="idl" title="callback interface Listener"><dt>void handle(Event event)</dt></dl>"#,
        );
        assert_eq!(fragments[0], "callback interface Listener {\n    void handle(Event event);\n};");
    }

    #[test]
    fn test_unsupported_tag_is_reported_alongside_others() {
        let fragments = extract_fragments(
            r#"<div class="note idl">interface A {};</div><pre class="idl">enum B { "b" };</pre><pre>not idl</pre>"#,
        )
        .unwrap();

        assert_eq!(fragments.len(), 2);
        assert!(matches!(&fragments[0], Err(MarkupError::UnsupportedTag(tag)) if tag == "div"));
        assert_eq!(fragments[1].as_ref().unwrap(), "enum B { \"b\" };");
    }

    #[test]
    fn test_missing_title_and_unterminated() {
        let fragments = extract_fragments(r#"<dl class="idl"><dt>x</dt></dl><pre class="idl">open"#).unwrap();
        assert!(matches!(fragments[0], Err(MarkupError::MissingTitle)));
        assert!(matches!(&fragments[1], Err(MarkupError::Unterminated(tag)) if tag == "pre"));
    }
}
