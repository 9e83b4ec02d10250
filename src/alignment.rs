use serde::{Deserialize, Serialize};

use crate::error::{AlignmentViolation, EditError};

/// Tolerance, in seconds, for every ordering and containment comparison.
///
/// Times travel as 2-decimal seconds but are recombined with `start + length`
/// arithmetic, so exact float equality cannot be relied on.
pub const TIME_EPSILON: f64 = 1e-6;

/// `a <= b` within tolerance
pub(crate) fn time_le(a: f64, b: f64) -> bool {
    a <= b + TIME_EPSILON
}

/// `lo < t < hi`, with `t` more than [`TIME_EPSILON`] away from both ends
pub(crate) fn strictly_between(t: f64, lo: f64, hi: f64) -> bool {
    t > lo + TIME_EPSILON && t < hi - TIME_EPSILON
}

pub(crate) fn is_positive(length: f64) -> bool {
    length > TIME_EPSILON
}

/// A single transcribed token with timing.
///
/// `start` is absolute seconds from the beginning of the recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAlignment {
    pub word: String,
    pub start: f64,
    pub length: f64,
}

impl WordAlignment {
    pub fn new(word: impl Into<String>, start: f64, length: f64) -> Self {
        Self {
            word: word.into(),
            start,
            length,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.length
    }
}

/// A contiguous span of a recording with its own speaker and word alignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub start: f64,
    pub length: f64,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub word_alignments: Vec<WordAlignment>,
}

impl Segment {
    pub fn new(
        id: impl Into<String>,
        start: f64,
        length: f64,
        word_alignments: Vec<WordAlignment>,
    ) -> Self {
        Self {
            id: id.into(),
            start,
            length,
            speaker: None,
            word_alignments,
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    pub fn end(&self) -> f64 {
        self.start + self.length
    }

    /// Words joined by `delimiter`
    pub fn transcript(&self, delimiter: &str) -> String {
        self.word_alignments
            .iter()
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join(delimiter)
    }

    /// `(first word start, last word end)`, or `None` without word alignments
    pub fn word_span(&self) -> Option<(f64, f64)> {
        let first = self.word_alignments.first()?;
        let last = self.word_alignments.last()?;
        Some((first.start, last.end()))
    }
}

/// Check a segment against its at-rest invariants
///
/// Word alignments must be sorted by start, must not overlap, and must lie
/// within `[segment.start, segment.end)`; every length must be positive.
/// An empty word alignment list is accepted as a transient state.
///
/// # Returns
/// * `Ok(())` if the segment is valid
/// * `Err(EditError::InvalidAlignment)` naming the first violation found
pub fn validate(segment: &Segment) -> Result<(), EditError> {
    check(segment).map_err(|violation| EditError::invalid_alignment(&segment.id, violation))
}

fn check(segment: &Segment) -> Result<(), AlignmentViolation> {
    if !segment.start.is_finite() || !segment.length.is_finite() {
        return Err(AlignmentViolation::NonFiniteTime { word: None });
    }
    if segment.start < -TIME_EPSILON {
        return Err(AlignmentViolation::NegativeStart {
            word: None,
            start: segment.start,
        });
    }
    if !is_positive(segment.length) {
        return Err(AlignmentViolation::NonPositiveSegmentLength {
            length: segment.length,
        });
    }

    let segment_end = segment.end();
    let mut previous: Option<&WordAlignment> = None;

    for (index, word) in segment.word_alignments.iter().enumerate() {
        if !word.start.is_finite() || !word.length.is_finite() {
            return Err(AlignmentViolation::NonFiniteTime { word: Some(index) });
        }
        if word.start < -TIME_EPSILON {
            return Err(AlignmentViolation::NegativeStart {
                word: Some(index),
                start: word.start,
            });
        }
        if !is_positive(word.length) {
            return Err(AlignmentViolation::NonPositiveWordLength {
                word: index,
                length: word.length,
            });
        }

        if let Some(prev) = previous {
            if !time_le(prev.start, word.start) {
                return Err(AlignmentViolation::Unsorted { word: index });
            }
            if !time_le(prev.end(), word.start) {
                return Err(AlignmentViolation::Overlap { word: index });
            }
        }

        if !time_le(segment.start, word.start) || !time_le(word.end(), segment_end) {
            return Err(AlignmentViolation::OutOfBounds {
                word: index,
                start: word.start,
                end: word.end(),
                segment_start: segment.start,
                segment_end,
            });
        }

        previous = Some(word);
    }

    Ok(())
}

/// Check an owning sequence: every segment valid, ids unique, and
/// consecutive segments ordered without overlap
pub fn validate_sequence(segments: &[Segment]) -> Result<(), EditError> {
    for (index, segment) in segments.iter().enumerate() {
        validate(segment)?;

        if segments[..index].iter().any(|s| s.id == segment.id) {
            return Err(EditError::invalid_alignment(
                &segment.id,
                AlignmentViolation::DuplicateId,
            ));
        }

        if let Some(prev) = index.checked_sub(1).map(|i| &segments[i]) {
            if !time_le(prev.end(), segment.start) {
                return Err(EditError::invalid_alignment(
                    &segment.id,
                    AlignmentViolation::OverlapsPrevious,
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn hello_world() -> Segment {
        Segment::new(
            "s1",
            0.0,
            4.0,
            vec![
                WordAlignment::new("hello", 0.0, 2.0),
                WordAlignment::new("world", 2.0, 2.0),
            ],
        )
    }

    fn violation(segment: &Segment) -> AlignmentViolation {
        match validate(segment) {
            Err(EditError::InvalidAlignment { violation, .. }) => violation,
            other => panic!("Expected EditError::InvalidAlignment, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_segment() {
        assert!(validate(&hello_world()).is_ok());
    }

    #[test]
    fn test_empty_word_alignments_are_transient_but_valid() {
        let segment = Segment::new("s1", 1.0, 1.0, vec![]);
        assert!(validate(&segment).is_ok());
        assert_eq!(segment.word_span(), None);
        assert_eq!(segment.transcript(" "), "");
    }

    #[test]
    fn test_derived_fields() {
        let segment = hello_world();
        assert_relative_eq!(segment.end(), 4.0);
        assert_eq!(segment.transcript(" "), "hello world");
        assert_eq!(segment.word_span(), Some((0.0, 4.0)));
    }

    #[test]
    fn test_float_arithmetic_within_tolerance() {
        let segment = Segment::new(
            "s1",
            0.1,
            0.2,
            vec![
                WordAlignment::new("a", 0.1, 0.1),
                WordAlignment::new("b", 0.1 + 0.1, 0.1),
            ],
        );
        assert!(validate(&segment).is_ok());
    }

    #[test]
    fn test_unsorted() {
        let mut segment = hello_world();
        segment.word_alignments.swap(0, 1);
        assert_eq!(violation(&segment), AlignmentViolation::Unsorted { word: 1 });
    }

    #[test]
    fn test_overlap() {
        let mut segment = hello_world();
        segment.word_alignments[0].length = 2.5;
        assert_eq!(violation(&segment), AlignmentViolation::Overlap { word: 1 });
    }

    #[test]
    fn test_out_of_bounds() {
        let mut segment = hello_world();
        segment.length = 3.0;
        assert!(matches!(
            violation(&segment),
            AlignmentViolation::OutOfBounds { word: 1, .. }
        ));
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-1.0)]
    fn test_non_positive_segment_length(#[case] length: f64) {
        let mut segment = hello_world();
        segment.length = length;
        assert!(matches!(
            violation(&segment),
            AlignmentViolation::NonPositiveSegmentLength { .. }
        ));
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-0.5)]
    fn test_non_positive_word_length(#[case] length: f64) {
        let mut segment = hello_world();
        segment.word_alignments[1].length = length;
        assert!(matches!(
            violation(&segment),
            AlignmentViolation::NonPositiveWordLength { word: 1, .. }
        ));
    }

    #[test]
    fn test_non_finite() {
        let mut segment = hello_world();
        segment.word_alignments[0].start = f64::NAN;
        assert_eq!(
            violation(&segment),
            AlignmentViolation::NonFiniteTime { word: Some(0) }
        );
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let segment = hello_world();
        let before = segment.clone();
        let first = validate(&segment);
        let second = validate(&segment);
        assert_eq!(first, second);
        assert_eq!(segment, before);
    }

    #[test]
    fn test_sequence_duplicate_id() {
        let a = hello_world();
        let mut b = hello_world();
        b.start = 4.0;
        b.word_alignments.clear();
        assert!(matches!(
            validate_sequence(&[a, b]),
            Err(EditError::InvalidAlignment {
                violation: AlignmentViolation::DuplicateId,
                ..
            })
        ));
    }

    #[test]
    fn test_sequence_overlap() {
        let a = hello_world();
        let b = Segment::new("s2", 3.5, 1.0, vec![]);
        assert!(matches!(
            validate_sequence(&[a, b]),
            Err(EditError::InvalidAlignment {
                violation: AlignmentViolation::OverlapsPrevious,
                ..
            })
        ));
    }

    #[test]
    fn test_serde_camel_case() {
        let json = r#"{
            "id": "s1",
            "start": 0.0,
            "length": 1.5,
            "speaker": "A",
            "wordAlignments": [{"word": "hi", "start": 0.5, "length": 0.5}]
        }"#;
        let segment: Segment = serde_json::from_str(json).expect("valid segment json");
        assert_eq!(segment.speaker.as_deref(), Some("A"));
        assert_eq!(segment.word_alignments.len(), 1);
        assert!(validate(&segment).is_ok());

        let value = serde_json::to_value(&segment).expect("serializable");
        assert!(value["wordAlignments"].is_array());
    }
}
