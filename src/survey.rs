//! Implements the occurrence census behind no-match diagnostics.

use aho_corasick::AhoCorasick;

use crate::rule::Rule;

/// Global occurrence counts for the marker and every rule pattern.
///
/// A survey answers whether a configured byte sequence occurs anywhere in
/// the buffer at all, ignoring windows. It exists so a zero-change run can
/// tell the operator whether the marker vanished, the patterns vanished, or
/// the patterns only occur out of reach of every marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Survey {
    /// How often the context marker occurs anywhere in the buffer.
    marker: usize,
    /// Per-pattern occurrence counts, in rule application order.
    rule_patterns: Vec<usize>,
}

impl Survey {
    /// Counts every occurrence of the marker and of each rule pattern.
    ///
    /// Overlapping occurrences are counted individually.
    pub fn scan<'rules>(
        buf: &[u8],
        marker: &[u8],
        rules: impl IntoIterator<Item = &'rules Rule>,
    ) -> Survey {
        let mut patterns = vec![marker.to_vec()];
        patterns.extend(rules.into_iter().map(|rule| rule.pattern().to_vec()));

        let searcher = AhoCorasick::new(&patterns)
            .expect("a handful of validated patterns must form an automaton");

        let mut counts = vec![0; patterns.len()];
        for hit in searcher.find_overlapping_iter(buf) {
            counts[hit.pattern().as_usize()] += 1;
        }

        let marker = counts.remove(0);
        Survey {
            marker,
            rule_patterns: counts,
        }
    }

    /// How often the context marker occurs anywhere in the buffer.
    pub fn marker_count(&self) -> usize {
        self.marker
    }

    /// Per-pattern occurrence counts, in rule application order.
    pub fn rule_pattern_counts(&self) -> &[usize] {
        &self.rule_patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<Rule> {
        vec![
            Rule::new(&b"aa"[..], &b"xx"[..]).unwrap(),
            Rule::new(&b"wsl"[..], &b"ws1"[..]).unwrap(),
        ]
    }

    #[test]
    fn counts_marker_and_patterns_globally() {
        let rules = rules();
        let survey = Survey::scan(b"MARK wsl MARK nothing wsl wsl", b"MARK", &rules);

        assert_eq!(survey.marker_count(), 2);
        assert_eq!(survey.rule_pattern_counts(), &[0, 3]);
    }

    #[test]
    fn overlapping_occurrences_count_individually() {
        let rules = rules();
        let survey = Survey::scan(b"aaaa", b"MARK", &rules);

        assert_eq!(survey.marker_count(), 0);
        // "aa" matches at offsets 0, 1 and 2.
        assert_eq!(survey.rule_pattern_counts(), &[3, 0]);
    }

    #[test]
    fn empty_buffer_counts_nothing() {
        let rules = rules();
        let survey = Survey::scan(b"", b"MARK", &rules);

        assert_eq!(survey.marker_count(), 0);
        assert_eq!(survey.rule_pattern_counts(), &[0, 0]);
    }

    #[test]
    fn works_without_rules() {
        let survey = Survey::scan(b"MARK", b"MARK", &[]);

        assert_eq!(survey.marker_count(), 1);
        assert!(survey.rule_pattern_counts().is_empty());
    }
}
