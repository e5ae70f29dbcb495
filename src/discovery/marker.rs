use std::sync::OnceLock;

use regex::Regex;

/// Token marking a method as a test
pub const MARKER_TOKEN: &str = "@test";

/// A parsed `@test` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Text after the token, if any
    pub display_name: Option<String>,
}

/// Find the test marker in a method's doc text
pub fn parse_marker(doc: &str) -> Option<Marker> {
    static MARKER_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = MARKER_REGEX.get_or_init(|| {
        let pattern = format!(
            r"(?m)^[ \t]*{}(?:[ \t]+(.*?))?[ \t]*$",
            regex::escape(MARKER_TOKEN)
        );
        Regex::new(&pattern).unwrap()
    });

    let caps = re.captures(doc)?;
    let display_name = caps
        .get(1)
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty());

    Some(Marker { display_name })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_with_name() {
        let marker = parse_marker(" @test should add").unwrap();
        assert_eq!(marker.display_name.as_deref(), Some("should add"));
    }

    #[test]
    fn test_bare_marker() {
        let marker = parse_marker(" @test").unwrap();
        assert_eq!(marker.display_name, None);

        let marker = parse_marker("@test   \n").unwrap();
        assert_eq!(marker.display_name, None);
    }

    #[test]
    fn test_marker_among_other_lines() {
        let doc = " Checks the sum of two numbers.\n\n @test adds numbers\n More notes.\n";
        let marker = parse_marker(doc).unwrap();
        assert_eq!(marker.display_name.as_deref(), Some("adds numbers"));
    }

    #[test]
    fn test_marker_token_starts_the_line() {
        let doc = format!(" {} from the constant", MARKER_TOKEN);
        let marker = parse_marker(&doc).unwrap();
        assert_eq!(marker.display_name.as_deref(), Some("from the constant"));
    }

    #[test]
    fn test_no_marker() {
        assert!(parse_marker("").is_none());
        assert!(parse_marker(" Plain documentation").is_none());
        assert!(parse_marker(" @testing is not the token").is_none());
        assert!(parse_marker(" see @test inline").is_none());
    }
}
