//! Rendering problem documents to JSON and XML bytes.
//!
//! Both formats reproduce the same fixed field order: `type, title, status,
//! detail, instance` (absent optionals skipped), then extensions in
//! insertion order. Rendering is deterministic; serializing the same
//! document twice produces byte-identical output.

use serde_json::Value;

use crate::negotiate::Format;
use crate::problem::Problem;

/// Content type for the JSON representation, per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Content type for the XML representation, per RFC 9457.
pub const APPLICATION_PROBLEM_XML: &str = "application/problem+xml";

/// XML namespace of the root `<problem>` element.
pub const PROBLEM_XML_NAMESPACE: &str = "urn:ietf:rfc:9457";

/// Render a problem document as JSON bytes in the canonical field order.
#[must_use]
pub fn to_json(problem: &Problem) -> Vec<u8> {
    // Cannot fail: all keys are strings and all values are JSON values.
    serde_json::to_vec(problem).unwrap_or_default()
}

/// Escape the five XML predefined entities. All data is element content;
/// no CDATA, no attribute encoding.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Render one extension value as XML element(s) named after its key.
///
/// Scalars escape and inline as text; a sequence repeats the element once
/// per item (sibling elements, no wrapper); a mapping becomes a container
/// element with its entries rendered recursively. `Null` renders nothing.
fn value_to_xml(key: &str, value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => format!("<{key}>{}</{key}>", escape_xml(s)),
        Value::Bool(b) => format!("<{key}>{b}</{key}>"),
        Value::Number(n) => format!("<{key}>{n}</{key}>"),
        Value::Array(items) => items
            .iter()
            .map(|item| value_to_xml(key, item))
            .collect::<Vec<_>>()
            .concat(),
        Value::Object(entries) => {
            let nested: String = entries
                .iter()
                .map(|(k, v)| value_to_xml(k, v))
                .collect::<Vec<_>>()
                .concat();
            format!("<{key}>{nested}</{key}>")
        }
    }
}

/// Render a problem document as XML bytes.
///
/// Layout: XML declaration, `<problem>` root in the RFC 9457 namespace,
/// one two-space-indented line per field in the canonical order, extension
/// values inlined recursively.
#[must_use]
pub fn to_xml(problem: &Problem) -> Vec<u8> {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<problem xmlns=\"{PROBLEM_XML_NAMESPACE}\">\n"));
    xml.push_str(&format!("  <type>{}</type>\n", escape_xml(&problem.type_url)));
    xml.push_str(&format!("  <title>{}</title>\n", escape_xml(&problem.title)));
    xml.push_str(&format!("  <status>{}</status>\n", problem.status.as_u16()));

    if let Some(detail) = &problem.detail {
        xml.push_str(&format!("  <detail>{}</detail>\n", escape_xml(detail)));
    }
    if let Some(instance) = &problem.instance {
        xml.push_str(&format!("  <instance>{}</instance>\n", escape_xml(instance)));
    }

    for (key, value) in problem.extensions() {
        let rendered = value_to_xml(key, value);
        if !rendered.is_empty() {
            xml.push_str(&format!("  {rendered}\n"));
        }
    }

    xml.push_str("</problem>");
    xml.into_bytes()
}

/// Render a problem document in the given format, paired with the matching
/// content-type string.
#[must_use]
pub fn serialize(problem: &Problem, format: Format) -> (Vec<u8>, &'static str) {
    match format {
        Format::Json => (to_json(problem), APPLICATION_PROBLEM_JSON),
        Format::Xml => (to_xml(problem), APPLICATION_PROBLEM_XML),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Problem {
        Problem::new(404)
            .unwrap()
            .with_detail("User 123 not found")
            .with_instance("/users/123")
            .with_extension("userId", 123)
    }

    #[test]
    fn json_bytes_carry_the_canonical_order() {
        let text = String::from_utf8(to_json(&sample())).unwrap();
        assert_eq!(
            text,
            r#"{"type":"about:blank","title":"Not Found","status":404,"detail":"User 123 not found","instance":"/users/123","userId":123}"#
        );
    }

    #[test]
    fn json_omits_absent_optionals() {
        let p = Problem::new(500).unwrap();
        let text = String::from_utf8(to_json(&p)).unwrap();
        assert_eq!(
            text,
            r#"{"type":"about:blank","title":"Internal Server Error","status":500}"#
        );
    }

    #[test]
    fn xml_layout_and_field_order() {
        let xml = String::from_utf8(to_xml(&sample())).unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <problem xmlns=\"urn:ietf:rfc:9457\">\n\
             \x20 <type>about:blank</type>\n\
             \x20 <title>Not Found</title>\n\
             \x20 <status>404</status>\n\
             \x20 <detail>User 123 not found</detail>\n\
             \x20 <instance>/users/123</instance>\n\
             \x20 <userId>123</userId>\n\
             </problem>"
        );
    }

    #[test]
    fn xml_escapes_the_five_predefined_entities() {
        let p = Problem::new(400)
            .unwrap()
            .with_detail(r#"Invalid <email> & "name""#);
        let xml = String::from_utf8(to_xml(&p)).unwrap();
        assert!(xml.contains("<detail>Invalid &lt;email&gt; &amp; &quot;name&quot;</detail>"));

        assert_eq!(escape_xml("it's >1"), "it&apos;s &gt;1");
    }

    #[test]
    fn xml_sequence_repeats_sibling_elements() {
        let p = Problem::new(400)
            .unwrap()
            .with_extension("tags", json!(["a", "b"]));
        let xml = String::from_utf8(to_xml(&p)).unwrap();
        assert!(xml.contains("  <tags>a</tags><tags>b</tags>\n"));
    }

    #[test]
    fn xml_mapping_becomes_nested_container() {
        let p = Problem::new(400).unwrap().with_extension(
            "errors",
            json!([{"field": "email", "message": "bad <value>"}]),
        );
        let xml = String::from_utf8(to_xml(&p)).unwrap();
        assert!(xml.contains(
            "  <errors><field>email</field><message>bad &lt;value&gt;</message></errors>\n"
        ));
    }

    #[test]
    fn xml_skips_null_extension_values() {
        let p = Problem::new(400).unwrap().with_extension("hint", Value::Null);
        let xml = String::from_utf8(to_xml(&p)).unwrap();
        assert!(!xml.contains("hint"));
        // JSON keeps the null
        let json_text = String::from_utf8(to_json(&p)).unwrap();
        assert!(json_text.contains(r#""hint":null"#));
    }

    #[test]
    fn serialize_pairs_bytes_with_content_type() {
        let p = sample();
        let (json_bytes, json_ct) = serialize(&p, Format::Json);
        assert_eq!(json_ct, APPLICATION_PROBLEM_JSON);
        assert_eq!(json_bytes, to_json(&p));

        let (xml_bytes, xml_ct) = serialize(&p, Format::Xml);
        assert_eq!(xml_ct, APPLICATION_PROBLEM_XML);
        assert_eq!(xml_bytes, to_xml(&p));
    }

    #[test]
    fn serialization_is_idempotent() {
        let p = sample();
        assert_eq!(to_json(&p), to_json(&p));
        assert_eq!(to_xml(&p), to_xml(&p));
    }
}
