use serde::{Deserialize, Serialize};

use crate::alignment::{Segment, time_le, validate_sequence};
use crate::edit::{EditEngine, SegmentPair};
use crate::error::{AlignmentViolation, EditError};
use crate::id::IdGenerator;

/// The ordered segments of one voice-data item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub voice_data_id: String,
    pub segments: Vec<Segment>,
}

/// One edit, addressed to segments by id
///
/// Field names follow the REST contract of the hosting console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Operation {
    SplitAtWord {
        segment_id: String,
        split_index: usize,
    },
    SplitByTime {
        segment_id: String,
        time: f64,
        word_string_split_index: usize,
    },
    MergeSegments {
        first_segment_id: String,
        second_segment_id: String,
    },
    MergeWords {
        segment_id: String,
        index_a: usize,
        index_b: usize,
    },
    SplitWord {
        segment_id: String,
        word_alignment_index: usize,
        split_character_index: usize,
        split_time: f64,
    },
    UpdateTime {
        segment_id: String,
        start: f64,
        length: f64,
    },
    UpdateSpeaker {
        segment_id: String,
        #[serde(default)]
        speaker: Option<String>,
    },
    UpdateText {
        segment_id: String,
        text: String,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SplitAtWord { .. } => "split_at_word",
            Operation::SplitByTime { .. } => "split_by_time",
            Operation::MergeSegments { .. } => "merge_segments",
            Operation::MergeWords { .. } => "merge_words",
            Operation::SplitWord { .. } => "split_word",
            Operation::UpdateTime { .. } => "update_time",
            Operation::UpdateSpeaker { .. } => "update_speaker",
            Operation::UpdateText { .. } => "update_text",
        }
    }
}

/// What an applied operation hands back to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditOutcome {
    Split { first: Segment, second: Segment },
    Merged { segment: Segment },
    Updated { segment: Segment },
    /// Retime and speaker changes carry no body
    Acknowledged,
}

impl EditOutcome {
    pub fn segments(&self) -> Vec<&Segment> {
        match self {
            EditOutcome::Split { first, second } => vec![first, second],
            EditOutcome::Merged { segment } | EditOutcome::Updated { segment } => vec![segment],
            EditOutcome::Acknowledged => Vec::new(),
        }
    }
}

impl From<SegmentPair> for EditOutcome {
    fn from(pair: SegmentPair) -> Self {
        EditOutcome::Split {
            first: pair.first,
            second: pair.second,
        }
    }
}

impl Transcript {
    pub fn new(voice_data_id: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            voice_data_id: voice_data_id.into(),
            segments,
        }
    }

    /// Check every segment plus ordering and id uniqueness across the sequence
    pub fn validate(&self) -> Result<(), EditError> {
        validate_sequence(&self.segments)
    }

    pub fn segment(&self, segment_id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == segment_id)
    }

    fn position(&self, segment_id: &str) -> Result<usize, EditError> {
        self.segments
            .iter()
            .position(|s| s.id == segment_id)
            .ok_or_else(|| EditError::SegmentNotFound {
                segment_id: segment_id.to_string(),
            })
    }

    /// Apply one operation and splice its result into place
    ///
    /// The engine result is computed before anything is touched, so on
    /// error the transcript is exactly as it was.
    ///
    /// # Arguments
    /// * `engine` - Engine carrying the config and id generator
    /// * `operation` - The edit to apply
    ///
    /// # Returns
    /// * `Ok(EditOutcome)` - Resulting segment(s), already spliced in
    /// * `Err(EditError)` - Invalid sequence, unknown segment id, or the engine's failure
    pub fn apply<G: IdGenerator>(
        &mut self,
        engine: &mut EditEngine<G>,
        operation: &Operation,
    ) -> Result<EditOutcome, EditError> {
        self.validate()?;

        match operation {
            Operation::SplitAtWord {
                segment_id,
                split_index,
            } => {
                let index = self.position(segment_id)?;
                let mut pair = engine.split_segment_at_word(&self.segments[index], *split_index)?;
                self.claim_unused_id(engine, &mut pair)?;
                self.replace_with_pair(index, &pair);
                Ok(pair.into())
            }
            Operation::SplitByTime {
                segment_id,
                time,
                word_string_split_index,
            } => {
                let index = self.position(segment_id)?;
                let time = engine.config().round_time(*time);
                let mut pair = engine.split_segment_by_time(
                    &self.segments[index],
                    time,
                    *word_string_split_index,
                )?;
                self.claim_unused_id(engine, &mut pair)?;
                self.replace_with_pair(index, &pair);
                Ok(pair.into())
            }
            Operation::MergeSegments {
                first_segment_id,
                second_segment_id,
            } => {
                let first = self.position(first_segment_id)?;
                let second = self.position(second_segment_id)?;
                if first.checked_add(1) != Some(second) {
                    return Err(EditError::not_adjacent(format!(
                        "segments {first_segment_id} and {second_segment_id} are not consecutive"
                    )));
                }

                let merged =
                    engine.merge_two_segments(&self.segments[first], &self.segments[second])?;
                self.segments
                    .splice(first..=second, std::iter::once(merged.clone()));
                Ok(EditOutcome::Merged { segment: merged })
            }
            Operation::MergeWords {
                segment_id,
                index_a,
                index_b,
            } => {
                let index = self.position(segment_id)?;
                let updated =
                    engine.merge_words_in_segment(&self.segments[index], *index_a, *index_b)?;
                Ok(self.replace(index, updated))
            }
            Operation::SplitWord {
                segment_id,
                word_alignment_index,
                split_character_index,
                split_time,
            } => {
                let index = self.position(segment_id)?;
                let split_time = engine.config().round_time(*split_time);
                let updated = engine.split_word_in_segment(
                    &self.segments[index],
                    *word_alignment_index,
                    *split_character_index,
                    split_time,
                )?;
                Ok(self.replace(index, updated))
            }
            Operation::UpdateTime {
                segment_id,
                start,
                length,
            } => {
                let index = self.position(segment_id)?;
                let updated = engine.update_segment_time(&self.segments[index], *start, *length)?;
                self.check_neighbours(index, &updated)?;
                self.segments[index] = updated;
                Ok(EditOutcome::Acknowledged)
            }
            Operation::UpdateSpeaker {
                segment_id,
                speaker,
            } => {
                let index = self.position(segment_id)?;
                let updated = engine.update_speaker(&self.segments[index], speaker.clone())?;
                self.segments[index] = updated;
                Ok(EditOutcome::Acknowledged)
            }
            Operation::UpdateText { segment_id, text } => {
                let index = self.position(segment_id)?;
                let updated = engine.update_transcript_text(&self.segments[index], text)?;
                Ok(self.replace(index, updated))
            }
        }
    }

    fn replace(&mut self, index: usize, segment: Segment) -> EditOutcome {
        self.segments[index] = segment.clone();
        EditOutcome::Updated { segment }
    }

    /// Redraw the second half's id until no segment in the sequence holds it
    fn claim_unused_id<G: IdGenerator>(
        &self,
        engine: &mut EditEngine<G>,
        pair: &mut SegmentPair,
    ) -> Result<(), EditError> {
        let mut draws = 0;
        while self.segment(&pair.second.id).is_some() {
            if draws == self.segments.len() {
                return Err(EditError::invalid_alignment(
                    pair.second.id.clone(),
                    AlignmentViolation::DuplicateId,
                ));
            }
            log::debug!("generated id {} already in use, drawing again", pair.second.id);
            pair.second.id = engine.fresh_id();
            draws += 1;
        }
        Ok(())
    }

    fn replace_with_pair(&mut self, index: usize, pair: &SegmentPair) {
        self.segments
            .splice(index..=index, [pair.first.clone(), pair.second.clone()]);
    }

    /// A retimed segment must stay clear of the segments around it
    fn check_neighbours(&self, index: usize, updated: &Segment) -> Result<(), EditError> {
        let overlaps_previous = index
            .checked_sub(1)
            .map(|i| &self.segments[i])
            .is_some_and(|prev| !time_le(prev.end(), updated.start));
        let overlaps_next = self
            .segments
            .get(index + 1)
            .is_some_and(|next| !time_le(updated.end(), next.start));

        if overlaps_previous || overlaps_next {
            return Err(EditError::InvalidTimeRange {
                start: updated.start,
                length: updated.length,
                reason: "segment would overlap a neighbouring segment",
            });
        }
        Ok(())
    }
}
