//! Message body decoding: pick one inline payload, base64url-decode it and
//! reduce HTML to its visible text.
//!
//! Never fails. Anything undecodable degrades to empty text.

use base64::{Engine as _, engine::general_purpose};
use scraper::{Html, Node};
use tracing::debug;

use crate::types::{MessagePart, RawMessage};

/// How far below the top-level payload to look for a text part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartScan {
    /// Only the payload's direct children.
    #[default]
    DirectChildren,
    /// Depth-first through nested multipart containers.
    Recursive,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MessageBodyDecoder {
    scan: PartScan,
}

impl MessageBodyDecoder {
    pub fn new(scan: PartScan) -> Self {
        Self { scan }
    }

    pub fn decode(&self, message: &RawMessage) -> String {
        let Some((data, mime)) = self.select_payload(&message.payload) else {
            debug!(id = %message.id, "no inline body data");
            return String::new();
        };

        let Some(bytes) = decode_base64url(data) else {
            debug!(id = %message.id, len = data.len(), "body is not valid base64url");
            return String::new();
        };

        // Plain bodies go through the same extraction: alert mails often
        // carry entities or stray tags under a text/plain type.
        let text = html_to_text(&String::from_utf8_lossy(&bytes));
        debug!(id = %message.id, mime, len = text.len(), "decoded body");
        text
    }

    /// Top-level inline data first, then the first text/plain or text/html
    /// part carrying data. First match wins.
    fn select_payload<'a>(&self, root: &'a MessagePart) -> Option<(&'a str, &'a str)> {
        if let Some(data) = inline_data(root) {
            return Some((data, root.mime_type.as_str()));
        }
        match self.scan {
            PartScan::DirectChildren => root.parts.iter().find_map(text_part_data),
            PartScan::Recursive => find_text_part(root),
        }
    }
}

fn inline_data(part: &MessagePart) -> Option<&str> {
    part.body.data.as_deref().filter(|d| !d.is_empty())
}

fn is_text_mime(mime: &str) -> bool {
    mime.eq_ignore_ascii_case("text/plain") || mime.eq_ignore_ascii_case("text/html")
}

fn text_part_data(part: &MessagePart) -> Option<(&str, &str)> {
    if !is_text_mime(&part.mime_type) {
        return None;
    }
    inline_data(part).map(|data| (data, part.mime_type.as_str()))
}

fn find_text_part(part: &MessagePart) -> Option<(&str, &str)> {
    for child in &part.parts {
        if let Some(hit) = text_part_data(child) {
            return Some(hit);
        }
        if let Some(hit) = find_text_part(child) {
            return Some(hit);
        }
    }
    None
}

/// Pad to a multiple of four with `=` and decode with the URL-safe alphabet.
pub fn decode_base64url(data: &str) -> Option<Vec<u8>> {
    let mut padded = data.trim().to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    general_purpose::URL_SAFE.decode(padded.as_bytes()).ok()
}

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Visible text nodes, each trimmed, joined by a single space.
///
/// Escaped markup (`&lt;b&gt;`) decodes into real markup, so extraction is
/// repeated while a pass still shortens the text. The result is a fixed
/// point: running it again returns it unchanged.
pub fn html_to_text(html: &str) -> String {
    let mut text = visible_text(html);
    loop {
        let next = visible_text(&text);
        if next.len() >= text.len() {
            return text;
        }
        text = next;
    }
}

fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut pieces: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element())
            .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()));
        if hidden {
            continue;
        }
        let piece = text.trim();
        if !piece.is_empty() {
            pieces.push(piece);
        }
    }

    pieces.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Header, PartBody};

    fn b64(s: &str) -> String {
        general_purpose::URL_SAFE_NO_PAD.encode(s.as_bytes())
    }

    fn part(mime: &str, data: Option<String>, parts: Vec<MessagePart>) -> MessagePart {
        MessagePart {
            mime_type: mime.to_string(),
            body: PartBody {
                data,
                ..Default::default()
            },
            parts,
            ..Default::default()
        }
    }

    fn message(payload: MessagePart) -> RawMessage {
        RawMessage {
            id: "m1".to_string(),
            payload,
            ..Default::default()
        }
    }

    #[test]
    fn test_padding_is_restored() {
        // Lengths 1..=6 cover every remainder mod 3, i.e. 0, 1 and 2 stripped `=`.
        for text in ["a", "ab", "abc", "abcd", "abcde", "héllo?>"] {
            let padded = general_purpose::URL_SAFE.encode(text.as_bytes());
            let stripped = padded.trim_end_matches('=');
            assert_eq!(decode_base64url(&padded).unwrap(), text.as_bytes());
            assert_eq!(decode_base64url(stripped).unwrap(), text.as_bytes());
        }
    }

    #[test]
    fn test_invalid_base64_degrades_to_empty() {
        let msg = message(part("text/plain", Some("!!!not base64!!!".to_string()), vec![]));
        assert_eq!(MessageBodyDecoder::default().decode(&msg), "");
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_fatal() {
        let data = general_purpose::URL_SAFE_NO_PAD.encode([b'o', b'k', 0xff, b'!']);
        let msg = message(part("text/plain", Some(data), vec![]));
        let text = MessageBodyDecoder::default().decode(&msg);
        assert!(text.starts_with("ok"));
        assert!(text.ends_with('!'));
    }

    #[test]
    fn test_top_level_body_wins() {
        let msg = message(part(
            "text/plain",
            Some(b64("  top level  ")),
            vec![part("text/plain", Some(b64("child")), vec![])],
        ));
        assert_eq!(MessageBodyDecoder::default().decode(&msg), "top level");
    }

    #[test]
    fn test_first_text_part_wins() {
        let msg = message(part(
            "multipart/mixed",
            None,
            vec![
                part("application/pdf", Some(b64("%PDF")), vec![]),
                part("text/plain", None, vec![]),
                part("text/html", Some(b64("<p>first <b>html</b></p>")), vec![]),
                part("text/plain", Some(b64("second")), vec![]),
            ],
        ));
        assert_eq!(MessageBodyDecoder::default().decode(&msg), "first html");
    }

    #[test]
    fn test_no_data_is_empty() {
        let msg = message(part("multipart/mixed", None, vec![part("image/png", Some(b64("x")), vec![])]));
        assert_eq!(MessageBodyDecoder::default().decode(&msg), "");
        assert_eq!(MessageBodyDecoder::default().decode(&RawMessage::default()), "");
    }

    #[test]
    fn test_nested_parts_depend_on_scan_mode() {
        let nested = message(part(
            "multipart/mixed",
            None,
            vec![part(
                "multipart/alternative",
                None,
                vec![part("text/plain", Some(b64("deep text")), vec![])],
            )],
        ));

        // Legacy behaviour only looks at direct children.
        assert_eq!(MessageBodyDecoder::new(PartScan::DirectChildren).decode(&nested), "");
        assert_eq!(MessageBodyDecoder::new(PartScan::Recursive).decode(&nested), "deep text");
    }

    #[test]
    fn test_recursive_prefers_direct_child_in_order() {
        let msg = message(part(
            "multipart/mixed",
            None,
            vec![
                part(
                    "multipart/alternative",
                    None,
                    vec![part("text/plain", Some(b64("nested")), vec![])],
                ),
                part("text/plain", Some(b64("later sibling")), vec![]),
            ],
        ));
        // Depth-first: the nested part comes before the later sibling.
        assert_eq!(MessageBodyDecoder::new(PartScan::Recursive).decode(&msg), "nested");
    }

    #[test]
    fn test_html_to_text_joins_inline_elements() {
        let html = r#"<html><head><style>p { color: red }</style><title>Stmt</title></head>
            <body><p>Total <b>amount</b> due</p><td>Rs. 1,234.56</td>
            <script>var x = 1;</script></body></html>"#;
        assert_eq!(html_to_text(html), "Stmt Total amount due Rs. 1,234.56");
    }

    #[test]
    fn test_html_to_text_is_idempotent() {
        let html = "<div>  Payment <i>due</i> date\n 15-07-2025 </div><p>&amp; more</p>";
        let once = html_to_text(html);
        assert_eq!(html_to_text(&once), once);
    }

    #[test]
    fn test_html_to_text_is_idempotent_on_escaped_markup() {
        for html in [
            "<p>Offer: &lt;b&gt;5% cashback&lt;/b&gt;</p>",
            "<p>&amp;lt;i&amp;gt;nested&amp;lt;/i&amp;gt; escape</p>",
            "Rs. 1,000 &lt; limit",
        ] {
            let once = html_to_text(html);
            assert_eq!(html_to_text(&once), once, "input: {html}");
        }
        assert_eq!(html_to_text("<p>Offer: &lt;b&gt;5% cashback&lt;/b&gt;</p>"), "Offer: 5% cashback");
    }

    #[test]
    fn test_plain_text_entities_are_decoded() {
        let msg = message(part(
            "text/plain",
            Some(b64("Rs.75.00 paid to Tea &amp; Snacks <strong>on 07-06-25</strong>")),
            vec![],
        ));
        assert_eq!(
            MessageBodyDecoder::default().decode(&msg),
            "Rs.75.00 paid to Tea & Snacks on 07-06-25"
        );
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut msg = RawMessage::default();
        msg.payload.headers.push(Header {
            name: "SUBJECT".to_string(),
            value: "x".to_string(),
        });
        assert_eq!(msg.subject(), "x");
    }

    #[test]
    fn test_plain_text_containing_markup_is_stripped() {
        let msg = message(part("text/plain", Some(b64("<div>Rs.10.00</div>")), vec![]));
        assert_eq!(MessageBodyDecoder::default().decode(&msg), "Rs.10.00");
    }
}
