//! Balanced-brace scanning and unescaping of JSON embedded in a JS string literal.
//!
//! The scanned text is JSON serialized inside a JavaScript string literal
//! (`\"` for `"`, `\\` for `\`). The scanner decodes that layer on the fly
//! and runs a single-pass state machine (`Normal`, `InString`, `Escaped`)
//! that counts braces only outside JSON string literals, so a `}` inside a
//! string value never ends the object early.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InString,
    Escaped,
}

/// Byte index of the `}` matching the `{` at `open`, or `None` if `text[open]`
/// is not `{` or the input ends while the object is still open.
pub fn find_closing_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut state = State::Normal;
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        // Decode one JSON-level character; `0` stands for anything without structural meaning.
        let (ch, width) = match (bytes[i], bytes.get(i + 1)) {
            (b'\\', Some(b'"')) => (b'"', 2),
            (b'\\', Some(b'\\')) => (b'\\', 2),
            (b'\\', Some(_)) => (0, 2),
            (b, _) => (b, 1),
        };

        state = match (state, ch) {
            (State::Normal, b'"') => State::InString,
            (State::Normal, b'{') => {
                depth += 1;
                State::Normal
            }
            (State::Normal, b'}') => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
                State::Normal
            }
            (State::Normal, _) => State::Normal,
            (State::InString, b'\\') => State::Escaped,
            (State::InString, b'"') => State::Normal,
            (State::InString, _) => State::InString,
            (State::Escaped, _) => State::InString,
        };
        i += width;
    }
    None
}

/// Undoes the JS string-literal layer: `\"`, `\n`, `\r`, `\t` and `\\`.
///
/// Single left-to-right pass, so `\\` followed by `n` yields `\n` as two
/// characters (a JSON escape) rather than a newline. Other escapes such as
/// `\/` or `\u0026` are kept verbatim; they are valid JSON escapes as well.
pub fn unescape_js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_objects_without_escapes() {
        let text = r#"x{"a":{"b":{}},"c":1}tail"#;
        let end = find_closing_brace(text, 1).unwrap();
        assert_eq!(&text[1..=end], r#"{"a":{"b":{}},"c":1}"#);
    }

    #[test]
    fn brace_inside_string_does_not_terminate() {
        let text = r#"{"name":"Fo}o","mainFile":{"id":222}},"next":{}"#;
        let end = find_closing_brace(text, 0).unwrap();
        assert_eq!(&text[..=end], r#"{"name":"Fo}o","mainFile":{"id":222}}"#);
    }

    #[test]
    fn escaped_literal_brace_inside_string_value() {
        // JSON `{"id":111,"name":"Fo}o{","mainFile":{"id":222}}` inside a JS string literal.
        let text = r#"{\"id\":111,\"name\":\"Fo}o{\",\"mainFile\":{\"id\":222}},\"other\":{}"#;
        let end = find_closing_brace(text, 0).unwrap();
        assert_eq!(
            &text[..=end],
            r#"{\"id\":111,\"name\":\"Fo}o{\",\"mainFile\":{\"id\":222}}"#
        );
    }

    #[test]
    fn naive_count_would_stop_early() {
        let text = r#"{\"summary\":\"use }} carefully\",\"id\":1}"#;
        let naive_end = text.find('}').unwrap();
        let end = find_closing_brace(text, 0).unwrap();
        assert!(end > naive_end);
        assert_eq!(end, text.len() - 1);
    }

    #[test]
    fn escaped_quote_inside_escaped_string() {
        // JSON string value `a\"}` (escaped quote, then brace) in the JS layer.
        let text = r#"{\"k\":\"a\\\"}\",\"id\":2}"#;
        let end = find_closing_brace(text, 0).unwrap();
        assert_eq!(end, text.len() - 1);
    }

    #[test]
    fn unbalanced_returns_none() {
        assert_eq!(
            find_closing_brace(r#"{"a":{"b":1}"#, 0),
            None
        );
        assert_eq!(
            find_closing_brace(r#"{\"a\":\"}"#, 0),
            None
        );
    }

    #[test]
    fn must_start_on_brace() {
        assert_eq!(find_closing_brace(r#":{"a":1}"#, 0), None);
        assert_eq!(find_closing_brace("{}", 5), None);
    }

    #[test]
    fn unescape_basic_sequences() {
        assert_eq!(
            unescape_js_string(r#"{\"a\":\"x\ty\",\n\"b\":\r1}"#),
            "{\"a\":\"x\ty\",\n\"b\":\r1}"
        );
    }

    #[test]
    fn unescape_backslash_last() {
        // JS `\\n` is a JSON `\n` escape, not a newline.
        assert_eq!(unescape_js_string(r#"\"a\\nb\""#), r#""a\nb""#);
        // JS `\\\"` is a JSON escaped quote.
        assert_eq!(unescape_js_string(r#"\"say \\\"hi\\\"\""#), r#""say \"hi\"""#);
    }

    #[test]
    fn unescape_keeps_other_escapes() {
        assert_eq!(unescape_js_string(r#"\u0026 and \/"#), r#"\u0026 and \/"#);
        assert_eq!(unescape_js_string("trailing\\"), "trailing\\");
    }

    #[test]
    fn unescaped_slice_parses_as_json() {
        let text = r#"{\"id\":111,\"name\":\"Fo}o\",\"mainFile\":{\"id\":222,\"fileName\":\"foo.zip\"}}"#;
        let end = find_closing_brace(text, 0).unwrap();
        let json = unescape_js_string(&text[..=end]);
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["name"], "Fo}o");
        assert_eq!(v["mainFile"]["id"], 222);
    }
}
