//! Placeholder token scanning.
use memchr::memchr;

/// A placeholder token naming tag `N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `{N}`
    Open(usize),
    /// `{/N}`
    Close(usize),
    /// `{N/}`
    Standalone(usize),
}

impl Placeholder {
    /// The tag number this placeholder names.
    #[inline]
    pub fn number(self) -> usize {
        match self {
            Placeholder::Open(n) | Placeholder::Close(n) | Placeholder::Standalone(n) => n,
        }
    }
}

/// A piece of placeholder text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text between placeholders
    Text(&'a str),
    /// A placeholder and its text as written
    Placeholder(Placeholder, &'a str),
}

/// Split text into literal runs and placeholder tokens.
///
/// Braces that do not form a well-formed placeholder are literal text.
pub struct PlaceholderScanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> PlaceholderScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for PlaceholderScanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        if rest.is_empty() {
            return None;
        }

        if let Some((ph, len)) = parse_placeholder(rest) {
            self.pos += len;
            return Some(Token::Placeholder(ph, &rest[..len]));
        }

        // Literal text up to the next brace that starts a placeholder.
        let bytes = rest.as_bytes();
        let mut end = 1;
        while let Some(offset) = memchr(b'{', &bytes[end..]) {
            let at = end + offset;
            if parse_placeholder(&rest[at..]).is_some() {
                end = at;
                self.pos += end;
                return Some(Token::Text(&rest[..end]));
            }
            end = at + 1;
        }
        self.pos = self.text.len();
        Some(Token::Text(rest))
    }
}

/// Parse a placeholder at the start of `s`, returning it and its length.
fn parse_placeholder(s: &str) -> Option<(Placeholder, usize)> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'{') {
        return None;
    }

    let closing = bytes.get(1) == Some(&b'/');
    let start = if closing { 2 } else { 1 };
    let digits = bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 || digits > 9 {
        return None;
    }
    let n = atoi_simd::parse_pos::<u32, false>(&bytes[start..start + digits]).ok()? as usize;
    let after = start + digits;

    match (&bytes[after..], closing) {
        ([b'}', ..], true) => Some((Placeholder::Close(n), after + 1)),
        ([b'}', ..], false) => Some((Placeholder::Open(n), after + 1)),
        ([b'/', b'}', ..], false) => Some((Placeholder::Standalone(n), after + 2)),
        _ => None,
    }
}

/// Collect the placeholders in `text`, in order.
pub fn placeholders(text: &str) -> Vec<(Placeholder, &str)> {
    PlaceholderScanner::new(text)
        .filter_map(|t| match t {
            Token::Placeholder(ph, raw) => Some((ph, raw)),
            Token::Text(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_mixed() {
        let tokens: Vec<Token<'_>> = PlaceholderScanner::new("a{1}b{/1}{2/}c").collect();
        assert_eq!(
            tokens,
            [
                Token::Text("a"),
                Token::Placeholder(Placeholder::Open(1), "{1}"),
                Token::Text("b"),
                Token::Placeholder(Placeholder::Close(1), "{/1}"),
                Token::Placeholder(Placeholder::Standalone(2), "{2/}"),
                Token::Text("c"),
            ]
        );
    }

    #[test]
    fn test_literal_braces() {
        let tokens: Vec<Token<'_>> = PlaceholderScanner::new("{x} {/} {1 {12/}").collect();
        assert_eq!(
            tokens,
            [
                Token::Text("{x} {/} {1 "),
                Token::Placeholder(Placeholder::Standalone(12), "{12/}"),
            ]
        );
        assert!(placeholders("{/3/}").is_empty());
    }

    #[test]
    fn test_multibyte_text() {
        let found = placeholders("héllo {1}wörld{/1} 日本");
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].0, Placeholder::Close(1));
    }
}
