use regex::{Regex, RegexBuilder};

/// Sentinel identifier for organizations no rule recognizes.
pub const UNKNOWN_COLLEGE: &str = "Unknown";

/// Separator tolerated between tokens of an institution name: whitespace,
/// hyphen, en/em dash, parentheses, comma.
const SEPARATOR: &str = r"[\s\-–—(),]*";

/// One row of the rule table: a canonical identifier and the pattern that
/// recognizes its spelling/abbreviation variants.
pub struct MatchRule {
    college: &'static str,
    pattern: Regex,
}

/// Maps raw free-text organization strings to canonical institution
/// identifiers.
///
/// The table is ordered and immutable once built; the first rule whose
/// pattern is found anywhere in the input wins. Ambiguous short
/// abbreviations (`iitd`, `iitj`) therefore resolve to the earliest row,
/// so table order is part of the contract.
pub struct CollegeMatcher {
    rules: Vec<MatchRule>,
}

// Rule templates in table order. `{s}` stands for the separator class.
// The two-letter and four-letter abbreviation collisions (IITD for both
// Delhi and Dhanbad, IITJ for both Jammu and Jodhpur) are resolved by row
// order, matching the dataset this table was built against.
const DEFAULT_RULES: [(&str, &str); 25] = [
    ("IITBHU", r"\b(?:iit){s}bhu\b|\b(?:iit){s}varanasi\b"),
    ("IITBOMBAY", r"\b(?:iit){s}bombay\b|\b(?:iit){s}b\b|\biitb(?:ombay)?\b"),
    ("IITDELHI", r"\b(?:iit){s}delhi\b|\biitd(?:elhi)?\b"),
    ("IITDHANBAD", r"\b(?:iit){s}(?:ism{s})?dhanbad\b|\biitd\b"),
    ("IITGUWAHATI", r"\b(?:iit){s}guwahati\b|\biitg\b"),
    ("IITHYDERABAD", r"\b(?:iit){s}hyderabad\b|\biith\b"),
    ("IITINDORE", r"\b(?:iit){s}indore\b|\biiti\b"),
    ("IITJAMMU", r"\b(?:iit){s}jammu\b|\biitj\b"),
    ("IITJODHPUR", r"\b(?:iit){s}jodhpur\b|\biitjodhpur\b|\biitj\b"),
    ("IITKANPUR", r"\b(?:iit){s}kanpur\b|\biitk\b"),
    ("IITKHARAGPUR", r"\b(?:iit){s}kharagpur\b|\biitkgp\b"),
    ("IITMADRAS", r"\b(?:iit){s}(?:madras|chennai)\b|\biitm\b"),
    ("IITMANDI", r"\b(?:iit){s}mandi\b|\biitm(?:andi)?\b"),
    ("IITPALAKKAD", r"\b(?:iit){s}palakkad\b"),
    ("IITPATNA", r"\b(?:iit){s}patna\b|\biitp\b"),
    ("IITROORKEE", r"\b(?:iit){s}roorkee\b|\biitr\b"),
    ("IITROPAR", r"\b(?:iit){s}ropar\b"),
    ("IITBILAI", r"\b(?:iit){s}bhilai\b"),
    ("IITDHARWAD", r"\b(?:iit){s}dharwad\b"),
    ("IITGOA", r"\b(?:iit){s}goa\b"),
    ("IITBHUBANESHWAR", r"\b(?:iit){s}bhubaneswar\b"),
    ("BITSPILANI", r"\bbits{s}pilani\b"),
    ("BITSGOA", r"\bbits{s}goa\b"),
    ("BITSHYDERABAD", r"\bbits{s}hyderabad\b"),
    ("BITSKKBIRLA", r"\bbits{s}kk{s}birla\b"),
];

impl CollegeMatcher {
    /// Builds the matcher over the built-in rule table.
    pub fn with_default_rules() -> CollegeMatcher {
        let rules = DEFAULT_RULES
            .iter()
            .map(|&(college, template)| MatchRule {
                college,
                pattern: RegexBuilder::new(&template.replace("{s}", SEPARATOR))
                    .case_insensitive(true)
                    .build()
                    .unwrap(),
            })
            .collect();
        CollegeMatcher { rules }
    }

    /// Builds a matcher over a caller-supplied ordered table. Patterns are
    /// compiled case-insensitively, verbatim otherwise.
    pub fn from_rules(
        pairs: &[(&'static str, &str)],
    ) -> Result<CollegeMatcher, regex::Error> {
        let mut rules = Vec::with_capacity(pairs.len());
        for &(college, pattern) in pairs {
            rules.push(MatchRule {
                college,
                pattern: RegexBuilder::new(pattern).case_insensitive(true).build()?,
            });
        }
        Ok(CollegeMatcher { rules })
    }

    /// Resolves a raw organization string to a canonical identifier, or
    /// [`UNKNOWN_COLLEGE`] when no rule matches. First match wins.
    pub fn resolve(&self, raw: &str) -> &'static str {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(raw))
            .map(|rule| rule.college)
            .unwrap_or(UNKNOWN_COLLEGE)
    }

    /// Canonical identifiers in table order.
    pub fn colleges(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.college)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_parenthesized_variant() {
        let matcher = CollegeMatcher::with_default_rules();
        assert_eq!(matcher.resolve("IIT (BHU)"), "IITBHU");
    }

    #[test]
    fn matches_spelling_and_abbreviation_variants() {
        let matcher = CollegeMatcher::with_default_rules();
        assert_eq!(matcher.resolve("Indian Institute of Technology, IIT Bombay"), "IITBOMBAY");
        assert_eq!(matcher.resolve("iitb"), "IITBOMBAY");
        assert_eq!(matcher.resolve("IIT—Madras"), "IITMADRAS");
        assert_eq!(matcher.resolve("IIT Chennai"), "IITMADRAS");
        assert_eq!(matcher.resolve("BITS Pilani"), "BITSPILANI");
        assert_eq!(matcher.resolve("bits-goa"), "BITSGOA");
        assert_eq!(matcher.resolve("IIT (ISM) Dhanbad"), "IITDHANBAD");
    }

    #[test]
    fn unmatched_and_empty_input_resolve_to_unknown() {
        let matcher = CollegeMatcher::with_default_rules();
        assert_eq!(matcher.resolve("Some Unlisted University"), UNKNOWN_COLLEGE);
        assert_eq!(matcher.resolve(""), UNKNOWN_COLLEGE);
    }

    #[test]
    fn ambiguous_abbreviations_resolve_to_the_earliest_row() {
        let matcher = CollegeMatcher::with_default_rules();
        // "iitd" is claimed by both Delhi and Dhanbad; Delhi is listed first.
        assert_eq!(matcher.resolve("IITD"), "IITDELHI");
        // "iitj" is claimed by both Jammu and Jodhpur; Jammu is listed first.
        assert_eq!(matcher.resolve("iitj"), "IITJAMMU");
    }

    #[test]
    fn custom_table_order_is_respected() {
        let matcher = CollegeMatcher::from_rules(&[
            ("SECOND", r"\bacme\b"),
            ("FIRST", r"\bacme institute\b"),
        ])
        .unwrap();
        // The later, more specific row never gets a chance.
        assert_eq!(matcher.resolve("acme institute"), "SECOND");
    }
}
