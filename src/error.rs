use thiserror::Error;

/// A broken at-rest invariant of a segment or segment sequence
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignmentViolation {
    #[error("non-finite time at {}", describe(.word))]
    NonFiniteTime { word: Option<usize> },
    #[error("negative start {start} at {}", describe(.word))]
    NegativeStart { word: Option<usize>, start: f64 },
    #[error("segment length {length} is not positive")]
    NonPositiveSegmentLength { length: f64 },
    #[error("word {word} length {length} is not positive")]
    NonPositiveWordLength { word: usize, length: f64 },
    #[error("word {word} starts before word {}", .word - 1)]
    Unsorted { word: usize },
    #[error("word {word} overlaps word {}", .word - 1)]
    Overlap { word: usize },
    #[error("word {word} [{start}, {end}) lies outside segment [{segment_start}, {segment_end})")]
    OutOfBounds {
        word: usize,
        start: f64,
        end: f64,
        segment_start: f64,
        segment_end: f64,
    },
    #[error("segment id is used more than once")]
    DuplicateId,
    #[error("segment overlaps the preceding segment")]
    OverlapsPrevious,
}

fn describe(word: &Option<usize>) -> String {
    match word {
        Some(index) => format!("word {index}"),
        None => "segment".to_string(),
    }
}

/// Failure of an edit engine operation
///
/// Every operation is all-or-nothing: when one of these is returned the
/// caller's segments are untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("invalid alignment in segment {segment_id}: {violation}")]
    InvalidAlignment {
        segment_id: String,
        violation: AlignmentViolation,
    },
    #[error("split index {index} outside (0, {len})")]
    InvalidSplitIndex { index: usize, len: usize },
    #[error("split time {time} outside ({start}, {end})")]
    InvalidSplitTime { time: f64, start: f64, end: f64 },
    #[error("segment {segment_id} has {word_count} word alignment(s): {reason}")]
    UnsupportedSegmentShape {
        segment_id: String,
        word_count: usize,
        reason: &'static str,
    },
    #[error("not adjacent: {reason}")]
    NotAdjacent { reason: String },
    #[error("index {index} out of range for {len} word alignment(s)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("time range start={start} length={length} is invalid: {reason}")]
    InvalidTimeRange {
        start: f64,
        length: f64,
        reason: &'static str,
    },
    #[error("speakers {first:?} and {second:?} differ")]
    SpeakerConflict {
        first: Option<String>,
        second: Option<String>,
    },
    #[error("text has {actual} word(s) but segment has {expected} word alignment(s)")]
    WordCountMismatch { expected: usize, actual: usize },
    #[error("segment {segment_id} not found")]
    SegmentNotFound { segment_id: String },
}

impl EditError {
    /// Stable kind name, for hosts that map failures to their own messages
    pub fn kind(&self) -> &'static str {
        match self {
            EditError::InvalidAlignment { .. } => "InvalidAlignment",
            EditError::InvalidSplitIndex { .. } => "InvalidSplitIndex",
            EditError::InvalidSplitTime { .. } => "InvalidSplitTime",
            EditError::UnsupportedSegmentShape { .. } => "UnsupportedSegmentShape",
            EditError::NotAdjacent { .. } => "NotAdjacent",
            EditError::IndexOutOfRange { .. } => "IndexOutOfRange",
            EditError::InvalidTimeRange { .. } => "InvalidTimeRange",
            EditError::SpeakerConflict { .. } => "SpeakerConflict",
            EditError::WordCountMismatch { .. } => "WordCountMismatch",
            EditError::SegmentNotFound { .. } => "SegmentNotFound",
        }
    }

    pub(crate) fn not_adjacent(reason: impl Into<String>) -> Self {
        Self::NotAdjacent {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_alignment(
        segment_id: impl Into<String>,
        violation: AlignmentViolation,
    ) -> Self {
        Self::InvalidAlignment {
            segment_id: segment_id.into(),
            violation,
        }
    }
}
