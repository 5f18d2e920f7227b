use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use std::borrow::Cow;

// Static initialization: automata are built only once, thread-safe
static TEXT_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">"])
        .expect("Failed to build XML text escaper")
});

static ATTR_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "\n", "\r", "\t"])
        .expect("Failed to build XML attribute escaper")
});

/// Escape character data for use between tags.
///
/// # Examples
///
/// ```
/// use longan::xml::escape_text;
/// assert_eq!(escape_text("a & b < c"), "a &amp; b &lt; c");
/// assert_eq!(escape_text("\"quoted\""), "\"quoted\"");
/// ```
#[inline]
pub fn escape_text(s: &str) -> Cow<'_, str> {
    if !s.bytes().any(|b| matches!(b, b'&' | b'<' | b'>')) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(TEXT_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;"]))
}

/// Escape an attribute value for use inside double quotes.
///
/// Whitespace control characters are written as character references so
/// they survive attribute-value normalization on the next read.
///
/// # Examples
///
/// ```
/// use longan::xml::escape_attr;
/// assert_eq!(escape_attr("say \"hi\""), "say &quot;hi&quot;");
/// assert_eq!(escape_attr("a\tb"), "a&#9;b");
/// ```
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s
        .bytes()
        .any(|b| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\n' | b'\r' | b'\t'))
    {
        return Cow::Borrowed(s);
    }
    Cow::Owned(ATTR_ESCAPER.replace_all(
        s,
        &["&amp;", "&lt;", "&gt;", "&quot;", "&#10;", "&#13;", "&#9;"],
    ))
}

/// Resolve the five predefined entities and numeric character references.
///
/// Unknown or malformed references are left unchanged.
///
/// # Examples
///
/// ```
/// use longan::xml::unescape;
/// assert_eq!(unescape("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape("&#65;&#x42;"), "AB");
/// assert_eq!(unescape("&amp;lt;"), "&lt;");
/// assert_eq!(unescape("&invalid;"), "&invalid;");
/// assert_eq!(unescape("&amp"), "&amp");
/// ```
pub fn unescape(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let Some(first) = memchr::memchr(b'&', bytes) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut pos = first;

    while pos < s.len() {
        let Some(amp) = memchr::memchr(b'&', &bytes[pos..]).map(|i| pos + i) else {
            out.push_str(&s[pos..]);
            break;
        };
        out.push_str(&s[pos..amp]);

        let resolved = memchr::memchr(b';', &bytes[amp..])
            .map(|i| amp + i)
            .and_then(|semi| resolve_reference(&s[amp + 1..semi]).map(|c| (c, semi)));

        match resolved {
            Some((c, semi)) => {
                out.push(c);
                pos = semi + 1;
            },
            None => {
                out.push('&');
                pos = amp + 1;
            },
        }
    }

    Cow::Owned(out)
}

/// Find the first well-formed reference that [`unescape`] cannot resolve.
///
/// Returns the name between `&` and `;`, such as `nbsp` for `&nbsp;`.
pub(crate) fn unresolved_reference(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    memchr::memchr_iter(b'&', bytes).find_map(|amp| {
        let semi = amp + memchr::memchr(b';', &bytes[amp..])?;
        let name = &s[amp + 1..semi];
        let well_formed =
            !name.is_empty() && !name.contains(|c: char| c.is_whitespace() || c == '&');
        (well_formed && resolve_reference(name).is_none()).then_some(name)
    })
}

/// Resolve the name between `&` and `;` to a character.
pub(crate) fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => atoi_simd::parse_pos::<u32, false>(num.as_bytes()).ok()?,
            };
            char::from_u32(code)
        },
    }
}
