use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

use crate::scrape::error::ParseError;

/// Semantic version syntax, matched as if prefixed with `v`.
///
/// Minor and patch may be omitted (`1`, `1.20`), but only when no
/// pre-release or build metadata follows.
static SEMVER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^
        (?P<major>0|[1-9][0-9]*)
        (?:
            \.(?P<minor>0|[1-9][0-9]*)
            (?:
                \.(?P<patch>0|[1-9][0-9]*)
                (?P<rest>
                    (?:-(?:0|[1-9][0-9]*|[0-9]*[A-Za-z-][0-9A-Za-z-]*)
                        (?:\.(?:0|[1-9][0-9]*|[0-9]*[A-Za-z-][0-9A-Za-z-]*))*)?
                    (?:\+[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?
                )
            )?
        )?
        $",
    )
    .expect("semver pattern is valid")
});

/// Validate a scraped version string and parse it into a `semver::Version`.
///
/// Shorthand versions are padded with zeros before parsing:
/// - "1" -> Version(1, 0, 0)
/// - "1.20" -> Version(1, 20, 0)
/// - "1.20.1" -> Version(1, 20, 1)
pub fn parse_listed_version(candidate: &str) -> Result<Version, ParseError> {
    let Some(captures) = SEMVER_PATTERN.captures(candidate) else {
        return Err(ParseError::InvalidSemver {
            version: candidate.to_string(),
        });
    };

    let part = |name: &str| captures.name(name).map_or("0", |m| m.as_str());
    let normalized = format!(
        "{}.{}.{}{}",
        part("major"),
        part("minor"),
        part("patch"),
        captures.name("rest").map_or("", |m| m.as_str())
    );

    Version::parse(&normalized).map_err(|source| ParseError::InvalidVersion {
        version: candidate.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn is_valid(candidate: &str) -> bool {
        SEMVER_PATTERN.is_match(candidate)
    }

    #[rstest]
    #[case("1.20.1", true)]
    #[case("v1.20.1", false)] // prefix is implicit
    #[case("1.20", true)]
    #[case("1", true)]
    #[case("1.0.0-rc.1", true)]
    #[case("1.0.0-alpha+build.5", true)]
    #[case("1.0.0+20240101", true)]
    #[case("abc", false)]
    #[case("", false)]
    #[case("1.20.1 ", false)]
    #[case("01.2.3", false)] // leading zero
    #[case("1.2.3-01", false)] // numeric pre-release with leading zero
    #[case("1.2-rc.1", false)] // shorthand with pre-release
    #[case("1.2.3.4", false)]
    #[case("1.2.3-", false)]
    fn test_semver_pattern(#[case] candidate: &str, #[case] expected: bool) {
        assert_eq!(is_valid(candidate), expected);
    }

    #[rstest]
    #[case("1.20.1", "1.20.1")]
    #[case("1.20", "1.20.0")]
    #[case("1", "1.0.0")]
    #[case("1.21.0-pre.2", "1.21.0-pre.2")]
    #[case("1.0.0-beta+exp.sha.5114f85", "1.0.0-beta+exp.sha.5114f85")]
    fn test_parse_listed_version(#[case] candidate: &str, #[case] expected: &str) {
        assert_eq!(
            parse_listed_version(candidate).unwrap().to_string(),
            expected
        );
    }

    #[test]
    fn parse_listed_version_rejects_invalid_syntax() {
        let result = parse_listed_version("abc");
        assert!(matches!(result, Err(ParseError::InvalidSemver { version }) if version == "abc"));
    }

    #[test]
    fn parse_listed_version_fails_after_validation_on_overflow() {
        let candidate = "99999999999999999999999.0.0";
        assert!(is_valid(candidate));

        let result = parse_listed_version(candidate);
        assert!(matches!(result, Err(ParseError::InvalidVersion { .. })));
    }

    #[test]
    fn parsed_version_round_trips_through_validation() {
        let version = parse_listed_version("1.20.1-rc.1").unwrap();
        let reparsed = parse_listed_version(&version.to_string()).unwrap();
        assert_eq!(version, reparsed);
    }
}
