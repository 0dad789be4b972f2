use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

const XML_ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"];

/// Escape XML special characters.
///
/// Safe for both text nodes and double-quoted attribute values.
///
/// # Examples
///
/// ```
/// use longan::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<tag>\"hello\"</tag>"), "&lt;tag&gt;&quot;hello&quot;&lt;/tag&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &XML_ENTITIES)
}

/// Append `s` to `out` with XML special characters escaped.
///
/// Avoids the intermediate allocation of [`escape_xml`] on the hot rendering path.
#[inline]
pub fn push_escaped(out: &mut String, s: &str) {
    XML_ESCAPER.replace_all_with(s, out, |mat, _, dst| {
        dst.push_str(XML_ENTITIES[mat.pattern().as_usize()]);
        true
    });
}
