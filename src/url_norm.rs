//! Story link normalization.
//!
//! Generated snapshots carry links in whatever shape the upstream model
//! produced: bare hostnames, JSON-escaped code points left in the text
//! (`é`), spaces. [`normalize_url`] turns those into something that can
//! go straight into an `href` attribute.
//!
//! The output only ever contains URI-reserved/unreserved ASCII and valid
//! `%XX` escapes, which is what makes the function idempotent: a second pass
//! finds a scheme, no backslashes, and nothing left to encode.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static UNICODE_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\u([dD][89abAB][0-9a-fA-F]{2})\\u([dD][c-fC-F][0-9a-fA-F]{2})|\\u([0-9a-fA-F]{4})",
    )
    .expect("static regex")
});

/// Characters `encodeURI` leaves alone, minus `%` which is handled separately.
fn is_uri_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || ";,/?:@&=+$-_.!~*'()#".contains(c)
}

fn has_http_scheme(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Replace each `\uXXXX` escape with the character it names.
///
/// Surrogate pairs are combined; a lone surrogate cannot be represented as a
/// `char` and is left as written.
pub fn decode_unicode_escapes(s: &str) -> String {
    UNICODE_ESCAPE
        .replace_all(s, |caps: &Captures| {
            let decoded = match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(hi), Some(lo), _) => {
                    let hi = u32::from_str_radix(hi.as_str(), 16).unwrap_or(0);
                    let lo = u32::from_str_radix(lo.as_str(), 16).unwrap_or(0);
                    char::from_u32(0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00))
                }
                (_, _, Some(single)) => u32::from_str_radix(single.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32),
                _ => None,
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Percent-encode everything outside the URI-safe set.
///
/// An existing `%XX` escape is kept; a stray `%` becomes `%25`.
pub fn encode_for_href(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    for (i, c) in s.char_indices() {
        if is_uri_safe(c) {
            out.push(c);
        } else if c == '%'
            && bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit)
        {
            out.push('%');
        } else {
            let mut buf = [0u8; 4];
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}

/// Make a story link safe to render.
///
/// 1. Prefix `https://` unless an `http://` or `https://` scheme is present.
/// 2. Decode `\uXXXX` escapes.
/// 3. Percent-encode for an `href` attribute.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let absolute = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    encode_for_href(&decode_unicode_escapes(&absolute))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "example.com/a b",
        "https://www.statnews.com/fda-fast-track",
        "http://example.com/caf\\u00e9?q=1&r=2#frag",
        "www.nejm.org/\\ud83d\\ude00/emoji",
        "example.com/lone\\ud83d-surrogate",
        "example.com/100%",
        "example.com/already%20encoded",
        "HTTPS://EXAMPLE.COM/Upper",
        "example.com/\\u005Cu0041",
        "  padded.example.com/x  ",
        "example.com/<script>\"quoted\"",
        "",
    ];

    #[test]
    fn test_adds_scheme_and_encodes_space() {
        let out = normalize_url("example.com/a b");
        assert_eq!(out, "https://example.com/a%20b");
        assert!(!out.contains(' '));
        let parsed = url::Url::parse(&out).unwrap();
        assert_eq!(parsed.scheme(), "https");
        assert_eq!(parsed.host_str(), Some("example.com"));
    }

    #[test]
    fn test_keeps_existing_scheme() {
        assert_eq!(
            normalize_url("https://www.statnews.com/fda-fast-track"),
            "https://www.statnews.com/fda-fast-track"
        );
        assert_eq!(normalize_url("http://example.com/x"), "http://example.com/x");
        assert_eq!(
            normalize_url("HTTPS://EXAMPLE.COM/Upper"),
            "HTTPS://EXAMPLE.COM/Upper"
        );
    }

    #[test]
    fn test_decodes_unicode_escapes() {
        assert_eq!(decode_unicode_escapes("caf\\u00e9"), "café");
        assert_eq!(decode_unicode_escapes("\\ud83d\\ude00"), "😀");
        assert_eq!(decode_unicode_escapes("x\\ud83dy"), "x\\ud83dy");
        assert_eq!(decode_unicode_escapes("\\u12"), "\\u12");
        assert_eq!(
            normalize_url("example.com/caf\\u00e9"),
            "https://example.com/caf%C3%A9"
        );
    }

    #[test]
    fn test_percent_handling() {
        assert_eq!(encode_for_href("a%20b"), "a%20b");
        assert_eq!(encode_for_href("100%"), "100%25");
        assert_eq!(encode_for_href("%zz"), "%25zz");
    }

    #[test]
    fn test_query_and_fragment_survive() {
        assert_eq!(
            normalize_url("example.com/search?q=a&lang=en#top"),
            "https://example.com/search?q=a&lang=en#top"
        );
    }

    #[test]
    fn test_attribute_breaking_characters_encoded() {
        let out = normalize_url("example.com/<b>\"x\"");
        assert!(!out.contains('"'));
        assert!(!out.contains('<'));
        assert!(!out.contains('>'));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in SAMPLES {
            let once = normalize_url(raw);
            assert_eq!(normalize_url(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_normalize_is_idempotent_on_generated_input() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        // Fragments that tend to interact: escapes, percent signs, schemes,
        // whitespace and non-ASCII.
        const PARTS: &[&str] = &[
            "\\u", "\\ud83d", "\\ude00", "00e9", "0025", "005C", "d8", "%", "%2", "%zz",
            "2", "F", "a", " ", "\t", "/", "?", "#", "&", "http://", "HTTPS://", "http",
            "é", "😀", "\"", "<", ">", "\\", "\u{2003}",
        ];

        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..20_000 {
            let len = rng.random_range(0..12);
            let raw: String = (0..len)
                .map(|_| PARTS[rng.random_range(0..PARTS.len())])
                .collect();
            let once = normalize_url(&raw);
            assert_eq!(normalize_url(&once), once, "not idempotent for {raw:?}");
            assert!(!once.contains(char::is_whitespace), "whitespace left in {once:?}");
        }
    }
}
