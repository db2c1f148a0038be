//! Implements the context-scoped scan-and-replace engine.

use std::num::NonZeroUsize;

use memchr::memmem::Finder;
use size_format::SizeFormatterBinary;
use tracing::{debug, info};

use crate::{
    data::{Input, Output},
    error::{PatchError, Result},
    rule::Rule,
    survey::Survey,
    window::Window,
};

/// A rule together with the prebuilt searcher for its pattern.
#[derive(Debug)]
struct CompiledRule {
    /// The rule as configured.
    rule: Rule,
    /// The searcher for the rule's pattern.
    finder: Finder<'static>,
}

/// The context-scoped patcher.
///
/// A patcher owns a searcher for the context marker, one searcher per rule
/// and the window size. Applying it scans a buffer once, front to back:
/// every marker occurrence opens a window of at most `window_size` bytes,
/// and inside each window the first occurrence of each rule's pattern is
/// overwritten with the rule's same-length replacement. The scan then
/// resumes *after* the window, so no byte is ever examined twice.
#[derive(Debug)]
pub struct Patcher {
    /// The searcher for the context marker.
    marker: Finder<'static>,
    /// How many bytes past a marker occurrence a rule pattern may match.
    window_size: NonZeroUsize,
    /// The rules, in application order.
    rules: Vec<CompiledRule>,
}

impl Patcher {
    /// Creates a patcher from a marker, a window size and a rule list.
    pub fn new(
        marker: impl Into<Vec<u8>>,
        window_size: NonZeroUsize,
        rules: Vec<Rule>,
    ) -> Result<Patcher> {
        let marker = marker.into();

        if marker.is_empty() {
            return Err(PatchError::EmptyMarker);
        }

        let rules = rules
            .into_iter()
            .map(|rule| CompiledRule {
                finder: Finder::new(rule.pattern()).into_owned(),
                rule,
            })
            .collect();

        Ok(Patcher {
            marker: Finder::new(&marker).into_owned(),
            window_size,
            rules,
        })
    }

    /// The context marker bytes.
    pub fn marker(&self) -> &[u8] {
        self.marker.needle()
    }

    /// How many bytes past a marker occurrence a rule pattern may match.
    pub fn window_size(&self) -> NonZeroUsize {
        self.window_size
    }

    /// The rules, in application order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    /// Applies every rule to the given buffer, mutating it in place.
    ///
    /// Rules are searched one after another on the live buffer, so within a
    /// window a later rule observes the replacements of earlier rules. The
    /// buffer length never changes.
    pub fn apply(&self, buf: &mut [u8]) -> PatchReport {
        let mut report = PatchReport::empty(buf.len());

        let mut cursor = 0;
        while let Some(found) = self.marker.find(&buf[cursor..]) {
            let marker_at = cursor + found;
            let window =
                Window::from_start_len(marker_at, self.window_size.get()).clamped_to(buf.len());
            debug!("context marker at {:#x}, searching {:?}", marker_at, window);

            for (rule_index, compiled) in self.rules.iter().enumerate() {
                let Some(hit) = compiled.finder.find(&buf[window.range()]) else {
                    continue;
                };

                let offset = window.start() + hit;
                buf[offset..offset + compiled.rule.pattern().len()]
                    .copy_from_slice(compiled.rule.replacement());
                info!(
                    "replaced `{}` at {:#x}",
                    compiled.rule.pattern().escape_ascii(),
                    offset
                );
                report.changes.push(Change { offset, rule_index });
            }

            report.windows_scanned += 1;
            cursor = window.end();
        }

        report
    }

    /// Patches a file end to end: read the input fully, apply, write the
    /// output fully.
    ///
    /// A scan that changed nothing still writes the output (byte-identical
    /// to the input) and attaches an occurrence [`Survey`] to the report so
    /// the caller can explain the no-op to the operator.
    pub fn patch_file(&self, input: &Input, output: &Output) -> Result<PatchReport> {
        let mut buf = input.read().map_err(|source| PatchError::ReadInput {
            input: input.to_string(),
            source,
        })?;
        info!(
            "read {}B from {}",
            SizeFormatterBinary::new(buf.len() as u64),
            input
        );

        let mut report = self.apply(&mut buf);
        if report.is_unchanged() {
            report.survey = Some(Survey::scan(&buf, self.marker(), self.rules()));
        }

        output
            .write(&buf)
            .map_err(|source| PatchError::WriteOutput {
                output: output.to_string(),
                source,
            })?;
        info!(
            "wrote {}B to {}",
            SizeFormatterBinary::new(buf.len() as u64),
            output
        );

        Ok(report)
    }
}

/// A single replacement performed during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    /// The byte offset the replacement happened at.
    offset: usize,
    /// The index of the rule that fired, in rule application order.
    rule_index: usize,
}

impl Change {
    /// The byte offset the replacement happened at.
    pub fn offset(self) -> usize {
        self.offset
    }

    /// The index of the rule that fired, in rule application order.
    pub fn rule_index(self) -> usize {
        self.rule_index
    }
}

/// The outcome of one scan over one buffer.
#[derive(Debug)]
pub struct PatchReport {
    /// The length of the scanned buffer in bytes.
    buffer_len: usize,
    /// The number of marker windows the scan processed.
    windows_scanned: usize,
    /// Every change, in the order it was applied.
    changes: Vec<Change>,
    /// Where the configured patterns occur, recorded only for no-op runs.
    survey: Option<Survey>,
}

impl PatchReport {
    /// Creates a report for a scan that has not found anything yet.
    fn empty(buffer_len: usize) -> PatchReport {
        PatchReport {
            buffer_len,
            windows_scanned: 0,
            changes: Vec::new(),
            survey: None,
        }
    }

    /// The length of the scanned buffer in bytes.
    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    /// The number of marker windows the scan processed.
    pub fn windows_scanned(&self) -> usize {
        self.windows_scanned
    }

    /// Every change, in the order it was applied.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// The number of replacements that were applied.
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    /// Determines if the scan left the buffer untouched.
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }

    /// The occurrence survey recorded for a no-op run.
    pub fn survey(&self) -> Option<&Survey> {
        self.survey.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: usize = 20;

    /// A patcher with marker `MARK`, a 20 byte window and rules
    /// `abc` -> `xyz`, `de` -> `DE`.
    fn patcher() -> Patcher {
        Patcher::new(
            &b"MARK"[..],
            NonZeroUsize::new(WINDOW).unwrap(),
            vec![
                Rule::new(&b"abc"[..], &b"xyz"[..]).unwrap(),
                Rule::new(&b"de"[..], &b"DE"[..]).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn empty_marker_is_rejected() {
        let err = Patcher::new(&b""[..], NonZeroUsize::new(500).unwrap(), Vec::new()).unwrap_err();
        assert!(matches!(err, PatchError::EmptyMarker));
    }

    #[test]
    fn replaces_first_occurrence_of_each_rule_per_window() {
        let mut buf = b"MARK..abc..de..rest".to_vec();
        let report = patcher().apply(&mut buf);

        assert_eq!(buf, b"MARK..xyz..DE..rest");
        assert_eq!(report.change_count(), 2);
        assert_eq!(report.windows_scanned(), 1);
        assert_eq!(report.changes()[0].offset(), 6);
        assert_eq!(report.changes()[0].rule_index(), 0);
        assert_eq!(report.changes()[1].offset(), 11);
        assert_eq!(report.changes()[1].rule_index(), 1);
        assert!(report.survey().is_none());
    }

    #[test]
    fn no_marker_means_no_changes() {
        let original = b"abc de abc de nothing to see".to_vec();
        let mut buf = original.clone();
        let report = patcher().apply(&mut buf);

        assert_eq!(buf, original);
        assert_eq!(report.change_count(), 0);
        assert_eq!(report.windows_scanned(), 0);
        assert!(report.is_unchanged());
    }

    #[test]
    fn empty_buffer_is_a_no_op() {
        let mut buf: Vec<u8> = Vec::new();
        let report = patcher().apply(&mut buf);

        assert_eq!(report.change_count(), 0);
        assert_eq!(report.buffer_len(), 0);
    }

    #[test]
    fn buffer_length_is_preserved() {
        let mut buf = b"MARKabcMARKdeMARK".to_vec();
        let len = buf.len();
        patcher().apply(&mut buf);

        assert_eq!(buf.len(), len);
    }

    #[test]
    fn patterns_outside_the_window_are_left_alone() {
        // `abc` starts 21 bytes after the marker, one past the window end.
        let mut buf = b"MARK.................abc".to_vec();
        let report = patcher().apply(&mut buf);

        assert_eq!(buf, b"MARK.................abc");
        assert_eq!(report.change_count(), 0);
        assert_eq!(report.windows_scanned(), 1);
    }

    #[test]
    fn pattern_ending_exactly_at_the_window_end_matches() {
        // The window is [0, 20); `abc` occupies offsets 17..20.
        let mut buf = b"MARK.............abc.".to_vec();
        let report = patcher().apply(&mut buf);

        assert_eq!(buf, b"MARK.............xyz.");
        assert_eq!(report.change_count(), 1);
    }

    #[test]
    fn pattern_straddling_the_window_end_does_not_match() {
        // `abc` occupies offsets 18..21, crossing the window end at 20.
        let mut buf = b"MARK..............abc".to_vec();
        let report = patcher().apply(&mut buf);

        assert_eq!(buf, b"MARK..............abc");
        assert_eq!(report.change_count(), 0);
    }

    #[test]
    fn window_is_clamped_to_the_buffer_end() {
        let mut buf = b"MARKabc".to_vec();
        let report = patcher().apply(&mut buf);

        assert_eq!(buf, b"MARKxyz");
        assert_eq!(report.change_count(), 1);
    }

    #[test]
    fn only_the_first_occurrence_per_window_is_replaced() {
        let mut buf = b"MARK..abc....abc....".to_vec();
        let report = patcher().apply(&mut buf);

        assert_eq!(buf, b"MARK..xyz....abc....");
        assert_eq!(report.change_count(), 1);
    }

    #[test]
    fn later_windows_catch_what_earlier_windows_could_not_reach() {
        // The first `abc` sits in the first marker's window; the second sits
        // past its end but inside the second marker's window.
        let mut buf = b"MARK..abc...........MARK..abc".to_vec();
        let report = patcher().apply(&mut buf);

        assert_eq!(buf, b"MARK..xyz...........MARK..xyz");
        assert_eq!(report.change_count(), 2);
        assert_eq!(report.windows_scanned(), 2);
    }

    #[test]
    fn markers_inside_a_processed_window_do_not_open_windows() {
        // The second marker lies inside the first window, so the scan skips
        // it; its `abc` is out of reach of the first window.
        let mut buf = b"MARK....MARK........!abc".to_vec();
        let report = patcher().apply(&mut buf);

        assert_eq!(buf, b"MARK....MARK........!abc");
        assert_eq!(report.change_count(), 0);
        assert_eq!(report.windows_scanned(), 1);
    }

    #[test]
    fn distinct_windows_do_not_influence_each_other() {
        let mut buf = b"MARK..abc..de.......MARK..de..abc....".to_vec();
        let report = patcher().apply(&mut buf);

        assert_eq!(buf, b"MARK..xyz..DE.......MARK..DE..xyz....");
        assert_eq!(report.change_count(), 4);
        assert_eq!(report.windows_scanned(), 2);
    }

    #[test]
    fn later_rules_observe_earlier_replacements() {
        let patcher = Patcher::new(
            &b"MARK"[..],
            NonZeroUsize::new(WINDOW).unwrap(),
            vec![
                Rule::new(&b"aa"[..], &b"bb"[..]).unwrap(),
                Rule::new(&b"bb"[..], &b"cc"[..]).unwrap(),
            ],
        )
        .unwrap();

        let mut buf = b"MARK aa".to_vec();
        let report = patcher.apply(&mut buf);

        // The first rule rewrites `aa` to `bb`; the second rule then finds
        // that `bb`, exactly like searching the live buffer rule by rule.
        assert_eq!(buf, b"MARK cc");
        assert_eq!(report.change_count(), 2);
    }

    #[test]
    fn patching_is_idempotent() {
        let mut buf = b"MARK..abc..de..".to_vec();
        let patcher = patcher();

        let first = patcher.apply(&mut buf);
        assert_eq!(first.change_count(), 2);

        let after_first = buf.clone();
        let second = patcher.apply(&mut buf);
        assert_eq!(second.change_count(), 0);
        assert_eq!(buf, after_first);
    }

    mod files {
        use super::*;
        use crate::data::{Input, Output};

        #[test]
        fn patches_input_file_into_output_file() {
            let dir = tempfile::tempdir().unwrap();
            let input_path = dir.path().join("app.bin");
            let output_path = dir.path().join("app.bin-patched");
            std::fs::write(&input_path, b"MARK..abc..de..").unwrap();

            let report = patcher()
                .patch_file(
                    &Input::File(input_path),
                    &Output::File(output_path.clone()),
                )
                .unwrap();

            assert_eq!(report.change_count(), 2);
            assert!(report.survey().is_none());
            assert_eq!(std::fs::read(output_path).unwrap(), b"MARK..xyz..DE..");
        }

        #[test]
        fn zero_changes_still_write_the_output() {
            let dir = tempfile::tempdir().unwrap();
            let input_path = dir.path().join("app.bin");
            let output_path = dir.path().join("app.bin-patched");
            std::fs::write(&input_path, b"no markers here, only abc").unwrap();

            let report = patcher()
                .patch_file(
                    &Input::File(input_path),
                    &Output::File(output_path.clone()),
                )
                .unwrap();

            assert_eq!(report.change_count(), 0);
            assert_eq!(
                std::fs::read(output_path).unwrap(),
                b"no markers here, only abc"
            );

            let survey = report.survey().unwrap();
            assert_eq!(survey.marker_count(), 0);
            assert_eq!(survey.rule_pattern_counts(), &[1, 0]);
        }

        #[test]
        fn missing_input_fails_without_writing_output() {
            let dir = tempfile::tempdir().unwrap();
            let input_path = dir.path().join("does-not-exist");
            let output_path = dir.path().join("never-written");

            let err = patcher()
                .patch_file(
                    &Input::File(input_path.clone()),
                    &Output::File(output_path.clone()),
                )
                .unwrap_err();

            assert!(matches!(
                err,
                PatchError::ReadInput { ref input, .. }
                    if input == &input_path.display().to_string()
            ));
            assert!(!output_path.exists());
        }
    }
}
