use crate::alignment::{
    Segment, WordAlignment, is_positive, strictly_between, time_le, validate,
};
use crate::config::{EditConfig, SpeakerMergePolicy};
use crate::error::EditError;
use crate::id::{IdGenerator, UuidIdGen};
use crate::position::{char_len, split_at_char};

/// The two halves produced by a segment split, in time order
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPair {
    pub first: Segment,
    pub second: Segment,
}

/// Pure transformations over segment values
///
/// The engine never holds on to a segment: every operation borrows its
/// input, validates it, and returns freshly built segments that have been
/// validated again. The caller splices results back into its own sequence.
///
/// The only state is the id generator used to name the second half of a
/// split; the first half keeps the original id.
#[derive(Debug)]
pub struct EditEngine<G: IdGenerator = UuidIdGen> {
    config: EditConfig,
    ids: G,
}

impl EditEngine<UuidIdGen> {
    pub fn new(config: EditConfig) -> Self {
        Self::with_id_generator(config, UuidIdGen)
    }
}

impl Default for EditEngine<UuidIdGen> {
    fn default() -> Self {
        Self::new(EditConfig::default())
    }
}

impl<G: IdGenerator> EditEngine<G> {
    pub fn with_id_generator(config: EditConfig, ids: G) -> Self {
        Self { config, ids }
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    /// Draw another id from the generator
    pub(crate) fn fresh_id(&mut self) -> String {
        self.ids.next_id()
    }

    /// Split a segment in two at a word boundary
    ///
    /// The first half holds `word_alignments[..split_index]` and ends where
    /// its last word ends; the second half starts where its first word
    /// starts and keeps the original end. Any silence between the two
    /// words belongs to neither half.
    ///
    /// # Arguments
    /// * `segment` - The segment to split
    /// * `split_index` - Index of the first word of the second half,
    ///   `0 < split_index < word_alignments.len()`
    ///
    /// # Returns
    /// * `Ok(SegmentPair)` - Both halves, each independently valid
    /// * `Err(EditError::InvalidSplitIndex)` - Index outside the open range
    pub fn split_segment_at_word(
        &mut self,
        segment: &Segment,
        split_index: usize,
    ) -> Result<SegmentPair, EditError> {
        validate(segment)?;
        require_words(segment, "word split needs word alignments")?;

        let len = segment.word_alignments.len();
        if split_index == 0 || split_index >= len {
            return Err(EditError::InvalidSplitIndex {
                index: split_index,
                len,
            });
        }

        let (head, tail) = segment.word_alignments.split_at(split_index);
        let first_end = head[head.len() - 1].end();
        let second_start = tail[0].start;

        let first = Segment {
            id: segment.id.clone(),
            start: segment.start,
            length: first_end - segment.start,
            speaker: segment.speaker.clone(),
            word_alignments: head.to_vec(),
        };
        let second = Segment {
            id: self.ids.next_id(),
            start: second_start,
            length: segment.end() - second_start,
            speaker: segment.speaker.clone(),
            word_alignments: tail.to_vec(),
        };

        log::debug!(
            "split segment {} at word {} into {} and {}",
            segment.id,
            split_index,
            first.id,
            second.id
        );
        Ok(SegmentPair {
            first: checked(first)?,
            second: checked(second)?,
        })
    }

    /// Split a single-word segment at a point in time
    ///
    /// The word text is cut at `word_string_split_index` chars and each
    /// half's timing is derived from `time`: the first half covers
    /// `[start, time)`, the second `[time, end)`.
    ///
    /// # Arguments
    /// * `segment` - A segment holding exactly one word alignment
    /// * `time` - Absolute split time, strictly inside both the segment
    ///   and its word
    /// * `word_string_split_index` - Char offset into the word,
    ///   `0 < index < char_len(word)`
    pub fn split_segment_by_time(
        &mut self,
        segment: &Segment,
        time: f64,
        word_string_split_index: usize,
    ) -> Result<SegmentPair, EditError> {
        validate(segment)?;

        let [word] = segment.word_alignments.as_slice() else {
            return Err(EditError::UnsupportedSegmentShape {
                segment_id: segment.id.clone(),
                word_count: segment.word_alignments.len(),
                reason: "time split needs exactly one word alignment",
            });
        };

        if !strictly_between(time, segment.start, segment.end()) {
            return Err(EditError::InvalidSplitTime {
                time,
                start: segment.start,
                end: segment.end(),
            });
        }

        let (head_word, tail_word) = split_word(word, word_string_split_index, time)?;

        let first = Segment {
            id: segment.id.clone(),
            start: segment.start,
            length: time - segment.start,
            speaker: segment.speaker.clone(),
            word_alignments: vec![head_word],
        };
        let second = Segment {
            id: self.ids.next_id(),
            start: time,
            length: segment.end() - time,
            speaker: segment.speaker.clone(),
            word_alignments: vec![tail_word],
        };

        log::debug!(
            "split segment {} at {time}s into {} and {}",
            segment.id,
            first.id,
            second.id
        );
        Ok(SegmentPair {
            first: checked(first)?,
            second: checked(second)?,
        })
    }

    /// Merge two temporally ordered segments into one
    ///
    /// The result keeps `first`'s id and spans `[first.start, second.end)`,
    /// silence between them included. Differing speakers are resolved by
    /// [`SpeakerMergePolicy`].
    ///
    /// Whether the two are consecutive in the owning sequence is the
    /// caller's concern; see [`crate::transcript::Transcript::apply`].
    pub fn merge_two_segments(&self, first: &Segment, second: &Segment) -> Result<Segment, EditError> {
        validate(first)?;
        validate(second)?;

        if !time_le(first.end(), second.start) {
            return Err(EditError::not_adjacent(format!(
                "segment {} ends at {} after segment {} starts at {}",
                first.id,
                first.end(),
                second.id,
                second.start
            )));
        }

        if first.speaker != second.speaker {
            match self.config.speaker_merge {
                SpeakerMergePolicy::FirstWins => log::warn!(
                    "merging segment {} into {}: speaker {:?} replaced by {:?}",
                    second.id,
                    first.id,
                    second.speaker,
                    first.speaker
                ),
                SpeakerMergePolicy::Reject => {
                    return Err(EditError::SpeakerConflict {
                        first: first.speaker.clone(),
                        second: second.speaker.clone(),
                    });
                }
            }
        }

        let mut word_alignments =
            Vec::with_capacity(first.word_alignments.len() + second.word_alignments.len());
        word_alignments.extend_from_slice(&first.word_alignments);
        word_alignments.extend_from_slice(&second.word_alignments);

        let merged = Segment {
            id: first.id.clone(),
            start: first.start,
            length: second.end() - first.start,
            speaker: first.speaker.clone(),
            word_alignments,
        };

        log::debug!("merged segment {} into {}", second.id, first.id);
        checked(merged)
    }

    /// Merge two consecutive words of a segment into one token
    ///
    /// Text is joined with `EditConfig::word_join`; the new word starts
    /// where the first did and ends where the second did.
    pub fn merge_words_in_segment(
        &self,
        segment: &Segment,
        index_a: usize,
        index_b: usize,
    ) -> Result<Segment, EditError> {
        validate(segment)?;
        require_words(segment, "word merge needs word alignments")?;

        let len = segment.word_alignments.len();
        for index in [index_a, index_b] {
            if index >= len {
                return Err(EditError::IndexOutOfRange { index, len });
            }
        }
        if index_a.checked_add(1) != Some(index_b) {
            return Err(EditError::not_adjacent(format!(
                "word indices {index_a} and {index_b} are not consecutive"
            )));
        }

        let a = &segment.word_alignments[index_a];
        let b = &segment.word_alignments[index_b];
        let joined = WordAlignment {
            word: format!("{}{}{}", a.word, self.config.word_join, b.word),
            start: a.start,
            length: b.end() - a.start,
        };

        let mut updated = segment.clone();
        updated
            .word_alignments
            .splice(index_a..=index_b, std::iter::once(joined));

        log::debug!("merged words {index_a} and {index_b} in segment {}", segment.id);
        checked(updated)
    }

    /// Split one word of a segment in two, at a char offset and a time
    ///
    /// Same rules as [`EditEngine::split_segment_by_time`], scoped to a
    /// single word alignment; the segment's own bounds are unchanged.
    pub fn split_word_in_segment(
        &self,
        segment: &Segment,
        word_alignment_index: usize,
        split_character_index: usize,
        split_time: f64,
    ) -> Result<Segment, EditError> {
        validate(segment)?;
        require_words(segment, "word split needs word alignments")?;

        let len = segment.word_alignments.len();
        let word = segment
            .word_alignments
            .get(word_alignment_index)
            .ok_or(EditError::IndexOutOfRange {
                index: word_alignment_index,
                len,
            })?;

        let (head, tail) = split_word(word, split_character_index, split_time)?;

        let mut updated = segment.clone();
        updated
            .word_alignments
            .splice(word_alignment_index..=word_alignment_index, [head, tail]);

        log::debug!(
            "split word {word_alignment_index} in segment {} at {split_time}s",
            segment.id
        );
        checked(updated)
    }

    /// Retime a segment
    ///
    /// Word alignments are not moved: the new bounds must still contain
    /// every one of them.
    pub fn update_segment_time(
        &self,
        segment: &Segment,
        start: f64,
        length: f64,
    ) -> Result<Segment, EditError> {
        validate(segment)?;

        let invalid = |reason: &'static str| EditError::InvalidTimeRange {
            start,
            length,
            reason,
        };

        if !start.is_finite() || !length.is_finite() {
            return Err(invalid("times must be finite"));
        }
        if start < 0.0 {
            return Err(invalid("start must not be negative"));
        }
        if !is_positive(length) {
            return Err(invalid("length must be positive"));
        }
        if let Some((words_start, words_end)) = segment.word_span() {
            if !time_le(start, words_start) || !time_le(words_end, start + length) {
                return Err(invalid("word alignments would fall outside the segment"));
            }
        }

        let updated = Segment {
            start,
            length,
            ..segment.clone()
        };

        log::debug!("retimed segment {} to [{start}, {})", segment.id, start + length);
        checked(updated)
    }

    /// Reassign a segment's speaker; `None` clears it
    pub fn update_speaker(
        &self,
        segment: &Segment,
        speaker: Option<String>,
    ) -> Result<Segment, EditError> {
        validate(segment)?;

        log::debug!("segment {} speaker set to {:?}", segment.id, speaker);
        Ok(Segment {
            speaker,
            ..segment.clone()
        })
    }

    /// Overwrite a segment's words from free text, keeping every timing
    ///
    /// `text` is split on `EditConfig::split_delimiter` (whitespace when the
    /// delimiter is empty) and must yield exactly one token per existing
    /// word alignment. Changing the word count needs a split or merge first.
    pub fn update_transcript_text(&self, segment: &Segment, text: &str) -> Result<Segment, EditError> {
        validate(segment)?;

        let tokens: Vec<&str> = if self.config.split_delimiter.is_empty() {
            text.split_whitespace().collect()
        } else {
            text.split(self.config.split_delimiter.as_str())
                .filter(|token| !token.trim().is_empty())
                .collect()
        };

        if tokens.len() != segment.word_alignments.len() {
            return Err(EditError::WordCountMismatch {
                expected: segment.word_alignments.len(),
                actual: tokens.len(),
            });
        }

        let mut updated = segment.clone();
        for (alignment, token) in updated.word_alignments.iter_mut().zip(tokens) {
            alignment.word = token.to_string();
        }

        log::debug!("overwrote transcript of segment {}", segment.id);
        checked(updated)
    }
}

/// Cut a word alignment at a char offset and an absolute time
fn split_word(
    word: &WordAlignment,
    char_index: usize,
    time: f64,
) -> Result<(WordAlignment, WordAlignment), EditError> {
    if !strictly_between(time, word.start, word.end()) {
        return Err(EditError::InvalidSplitTime {
            time,
            start: word.start,
            end: word.end(),
        });
    }

    let (head, tail) = split_at_char(&word.word, char_index).ok_or(EditError::InvalidSplitIndex {
        index: char_index,
        len: char_len(&word.word),
    })?;

    Ok((
        WordAlignment::new(head, word.start, time - word.start),
        WordAlignment::new(tail, time, word.end() - time),
    ))
}

fn require_words(segment: &Segment, reason: &'static str) -> Result<(), EditError> {
    if segment.word_alignments.is_empty() {
        return Err(EditError::UnsupportedSegmentShape {
            segment_id: segment.id.clone(),
            word_count: 0,
            reason,
        });
    }
    Ok(())
}

fn checked(segment: Segment) -> Result<Segment, EditError> {
    validate(&segment)?;
    Ok(segment)
}
