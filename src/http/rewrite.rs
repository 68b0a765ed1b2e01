//! Byte-level content rewriting
//!
//! Plain substring replacement over raw bytes. Replacements never produce a
//! new match for another rule, so the order they run in does not matter.
//! Tags written inside attribute values are rewritten too; the served markup
//! is trusted build output.

/// Replace every non-overlapping occurrence of `needle` in `haystack`
pub fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    if needle.is_empty() {
        return haystack.to_vec();
    }

    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(pos) = find(rest, needle) {
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(replacement);
        rest = &rest[pos + needle.len()..];
    }
    out.extend_from_slice(rest);
    out
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Point the document's `<base href="/"` at `base_href`
pub fn rewrite_base_href(html: &[u8], base_href: &str) -> Vec<u8> {
    replace_all(
        html,
        br#"<base href="/""#,
        format!(r#"<base href="{base_href}""#).as_bytes(),
    )
}
