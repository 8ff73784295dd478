//! The canonical document number: scope key plus allocated sequence integer.

use std::fmt;
use std::str::FromStr;

use crate::{DocumentScope, NumberParseError, Period, ScopeKey};

/// An allocated document number.
///
/// The canonical string form is
/// `{tenant}/{type}[/{sub}]/{year}/{month:02}/{sequence:04}`. The month is
/// always two digits; the sequence is at least four and simply widens past
/// `9999`. An absent sub-scope is omitted entirely, never rendered as an
/// empty segment.
///
/// Parsing is strict and round-trips: `parse → format → parse` is the
/// identity for every value this crate produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentNumber {
    key: ScopeKey,
    sequence: u64,
}

impl DocumentNumber {
    pub(crate) fn new(key: ScopeKey, sequence: u64) -> Self {
        Self { key, sequence }
    }

    /// The scope key this number was allocated under.
    pub fn key(&self) -> &ScopeKey {
        &self.key
    }

    /// The allocated sequence integer (1-based).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:04}", self.key, self.sequence)
    }
}

impl FromStr for DocumentNumber {
    type Err = NumberParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NumberParseError::Empty);
        }

        let segments: Vec<&str> = s.split('/').collect();
        let sub_scope = match segments.len() {
            5 => None,
            6 => Some(segments[2]),
            n => return Err(NumberParseError::SegmentCount(n)),
        };

        // The last three segments are always year, month, sequence.
        let n = segments.len();
        let (year_seg, month_seg, seq_seg) = (segments[n - 3], segments[n - 2], segments[n - 1]);

        let year: i32 = parse_digits(year_seg)
            .ok_or_else(|| NumberParseError::Year(year_seg.to_string()))?;

        if month_seg.len() != 2 {
            return Err(NumberParseError::Month(month_seg.to_string()));
        }
        let month: u32 = parse_digits(month_seg)
            .ok_or_else(|| NumberParseError::Month(month_seg.to_string()))?;

        if seq_seg.len() < 4 {
            return Err(NumberParseError::Sequence(seq_seg.to_string()));
        }
        let sequence: u64 = parse_digits(seq_seg)
            .ok_or_else(|| NumberParseError::Sequence(seq_seg.to_string()))?;
        if sequence == 0 {
            // Counters start at 1; zero is never issued.
            return Err(NumberParseError::Sequence(seq_seg.to_string()));
        }

        let scope = DocumentScope::new(segments[0], segments[1], sub_scope)?;
        let period = match Period::new(year, month) {
            Ok(period) => period,
            Err(crate::ScopeError::MonthOutOfRange(_)) => {
                return Err(NumberParseError::Month(month_seg.to_string()));
            }
            Err(_) => return Err(NumberParseError::Year(year_seg.to_string())),
        };

        Ok(Self::new(ScopeKey::new(scope, period), sequence))
    }
}

fn parse_digits<T: FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl serde::Serialize for DocumentNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for DocumentNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn number(tenant: &str, doc_type: &str, sub: Option<&str>, period: (i32, u32), seq: u64) -> DocumentNumber {
        DocumentNumber::new(
            ScopeKey::new(
                DocumentScope::new(tenant, doc_type, sub).unwrap(),
                Period::new(period.0, period.1).unwrap(),
            ),
            seq,
        )
    }

    #[test]
    fn formats_without_sub_scope() {
        assert_eq!(number("ABC", "FV", None, (2025, 3), 7).to_string(), "ABC/FV/2025/03/0007");
    }

    #[test]
    fn formats_with_sub_scope() {
        assert_eq!(
            number("ABC", "WZ", Some("01"), (2025, 3), 7).to_string(),
            "ABC/WZ/01/2025/03/0007"
        );
    }

    #[test]
    fn sequence_field_widens_past_four_digits() {
        assert_eq!(
            number("ABC", "FV", None, (2025, 3), 12345).to_string(),
            "ABC/FV/2025/03/12345"
        );
    }

    #[test]
    fn parses_canonical_forms() {
        let parsed: DocumentNumber = "ABC/WZ/01/2025/03/0007".parse().unwrap();
        assert_eq!(parsed.key().tenant_code(), "ABC");
        assert_eq!(parsed.key().document_type(), "WZ");
        assert_eq!(parsed.key().sub_scope(), Some("01"));
        assert_eq!(parsed.key().period(), Period::new(2025, 3).unwrap());
        assert_eq!(parsed.sequence(), 7);

        let parsed: DocumentNumber = "ABC/FV/2025/03/0007".parse().unwrap();
        assert_eq!(parsed.key().sub_scope(), None);
    }

    #[test]
    fn round_trips() {
        for original in [
            number("ABC", "FV", None, (2025, 3), 1),
            number("ABC", "WZ", Some("01"), (2025, 12), 42),
            number("X", "PZ", Some("9"), (1999, 1), 100_000),
        ] {
            let reparsed: DocumentNumber = original.to_string().parse().unwrap();
            assert_eq!(reparsed, original);
        }
    }

    #[rstest]
    #[case("", NumberParseError::Empty)]
    #[case("ABC/FV/2025/03", NumberParseError::SegmentCount(4))]
    #[case("ABC/FV/01/02/2025/03/0007", NumberParseError::SegmentCount(7))]
    #[case("ABC/FV/20x5/03/0007", NumberParseError::Year("20x5".to_string()))]
    #[case("ABC/FV/2025/3/0007", NumberParseError::Month("3".to_string()))]
    #[case("ABC/FV/2025/13/0007", NumberParseError::Month("13".to_string()))]
    #[case("ABC/FV/2025/03/007", NumberParseError::Sequence("007".to_string()))]
    #[case("ABC/FV/2025/03/0000", NumberParseError::Sequence("0000".to_string()))]
    fn rejects_malformed_inputs(#[case] input: &str, #[case] expected: NumberParseError) {
        let err = input.parse::<DocumentNumber>().unwrap_err();
        assert_eq!(err, expected);
    }

    #[test]
    fn rejects_empty_sub_scope_segment() {
        let err = "ABC/FV//2025/03/0007".parse::<DocumentNumber>().unwrap_err();
        assert_eq!(err, NumberParseError::Scope(crate::ScopeError::EmptySubScope));
    }

    #[test]
    fn serde_uses_canonical_string() {
        let original = number("ABC", "WZ", Some("01"), (2025, 3), 7);
        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(json, "\"ABC/WZ/01/2025/03/0007\"");
        let back: DocumentNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }
}
