//! Normalization of the doubled-quote escaping artifact in the trailing
//! device-info JSON blob.

/// Collapse CSV-style doubled quotes (`""` → `"`) so the embedded device-info
/// blob becomes valid JSON.
///
/// One exception: a `:""` immediately followed by `,`, `}` or end of input is
/// an already-collapsed empty-string value and must round-trip untouched. A
/// properly doubled empty value (`:""""`) is not matched by the exception and
/// collapses to `:""` as expected.
pub fn normalize_doubled_quotes(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'"' && bytes.get(i + 1) == Some(&b'"') {
            let empty_value = i > 0
                && bytes[i - 1] == b':'
                && matches!(bytes.get(i + 2), None | Some(b',') | Some(b'}'));
            if empty_value {
                out.extend_from_slice(b"\"\"");
            } else {
                out.push(b'"');
            }
            i += 2;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    // Only ASCII quote bytes were removed, so the result stays valid UTF-8.
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_doubled_quotes() {
        assert_eq!(
            normalize_doubled_quotes(r#"{""model"":""Pixel 8""}"#),
            r#"{"model":"Pixel 8"}"#
        );
    }

    #[test]
    fn preserves_collapsed_empty_string_value() {
        assert_eq!(
            normalize_doubled_quotes(r#"{""a"":"",""b"":""x""}"#),
            r#"{"a":"","b":"x"}"#
        );
        assert_eq!(normalize_doubled_quotes(r#"{""a"":""}"#), r#"{"a":""}"#);
    }

    #[test]
    fn collapses_doubled_empty_string_value() {
        assert_eq!(normalize_doubled_quotes(r#"{""a"":""""}"#), r#"{"a":""}"#);
    }

    #[test]
    fn passes_through_plain_json() {
        assert_eq!(normalize_doubled_quotes(r#"{"a":1}"#), r#"{"a":1}"#);
    }

    #[test]
    fn keeps_non_ascii_content() {
        assert_eq!(
            normalize_doubled_quotes(r#"{""name"":""téléphone""}"#),
            r#"{"name":"téléphone"}"#
        );
    }
}
