use quickcheck::{TestResult, quickcheck};

use transcript_edit::{
    EditConfig, EditEngine, EditError, Segment, SequentialIdGen, WordAlignment, validate,
};

fn engine() -> EditEngine<SequentialIdGen> {
    EditEngine::with_id_generator(EditConfig::default(), SequentialIdGen::new())
}

/// Build a valid segment from arbitrary (gap, length) pairs in centiseconds
fn segment_from(lead: u8, words: &[(u8, u8)], tail: u8) -> Segment {
    let start = f64::from(lead) / 100.0;
    let mut cursor = start;
    let mut alignments = Vec::with_capacity(words.len());

    for (index, (gap, length)) in words.iter().enumerate() {
        cursor += f64::from(*gap) / 100.0;
        let length = f64::from(*length) / 100.0 + 0.01;
        alignments.push(WordAlignment::new(format!("w{index}"), cursor, length));
        cursor += length;
    }

    let end = cursor + f64::from(tail) / 100.0 + 0.01;
    Segment::new("s", start, end - start, alignments)
}

/// Move a segment and its words later by `offset` seconds
fn shifted(mut segment: Segment, id: &str, offset: f64) -> Segment {
    segment.id = id.to_string();
    segment.start += offset;
    for word in &mut segment.word_alignments {
        word.start += offset;
    }
    segment
}

/// A word of 2 to 8 distinct letters
fn spelled(letters: u8) -> String {
    "abcdefgh"[..2 + usize::from(letters % 7)].to_string()
}

/// A time strictly inside `word`, `frac` hundredths of the way through
fn time_inside(word: &WordAlignment, frac: u8) -> f64 {
    word.start + word.length * f64::from(1 + frac % 99) / 100.0
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

quickcheck! {
    fn split_then_merge_conserves(lead: u8, words: Vec<(u8, u8)>, tail: u8, at: usize) -> TestResult {
        if words.len() < 2 {
            return TestResult::discard();
        }
        let segment = segment_from(lead, &words, tail);
        let split_index = 1 + at % (words.len() - 1);

        let mut engine = engine();
        let pair = engine.split_segment_at_word(&segment, split_index).unwrap();
        let merged = engine.merge_two_segments(&pair.first, &pair.second).unwrap();

        TestResult::from_bool(
            merged.word_alignments == segment.word_alignments
                && merged.start == segment.start
                && (merged.end() - segment.end()).abs() < 1e-9
                && merged.id == segment.id,
        )
    }

    fn every_result_validates(lead: u8, words: Vec<(u8, u8)>, tail: u8, at: usize) -> TestResult {
        if words.len() < 2 {
            return TestResult::discard();
        }
        let segment = segment_from(lead, &words, tail);
        let index = at % (words.len() - 1);
        let mut engine = engine();

        let pair = engine.split_segment_at_word(&segment, index + 1).unwrap();
        let merged_words = engine.merge_words_in_segment(&segment, index, index + 1).unwrap();

        TestResult::from_bool(
            validate(&pair.first).is_ok()
                && validate(&pair.second).is_ok()
                && pair.first.end() <= pair.second.start + 1e-9
                && validate(&merged_words).is_ok()
                && merged_words.word_alignments.len() == segment.word_alignments.len() - 1,
        )
    }

    fn split_index_bounds_rejected(lead: u8, words: Vec<(u8, u8)>, tail: u8) -> TestResult {
        if words.is_empty() {
            return TestResult::discard();
        }
        let segment = segment_from(lead, &words, tail);
        let len = words.len();
        let mut engine = engine();

        TestResult::from_bool(
            engine.split_segment_at_word(&segment, 0)
                == Err(EditError::InvalidSplitIndex { index: 0, len })
                && engine.split_segment_at_word(&segment, len)
                    == Err(EditError::InvalidSplitIndex { index: len, len }),
        )
    }

    fn split_by_time_conserves(lead: u8, word: (u8, u8), tail: u8, letters: u8, at: usize, frac: u8) -> bool {
        let mut segment = segment_from(lead, &[word], tail);
        let text = spelled(letters);
        segment.word_alignments[0].word = text.clone();
        let original = segment.word_alignments[0].clone();
        let time = time_inside(&original, frac);
        let index = 1 + at % (text.len() - 1);

        let pair = engine().split_segment_by_time(&segment, time, index).unwrap();
        let head_word = &pair.first.word_alignments[0];
        let tail_word = &pair.second.word_alignments[0];

        validate(&pair.first).is_ok()
            && validate(&pair.second).is_ok()
            && pair.first.id == segment.id
            && pair.first.start == segment.start
            && close(pair.first.end(), time)
            && pair.second.start == time
            && close(pair.second.end(), segment.end())
            && format!("{}{}", head_word.word, tail_word.word) == text
            && head_word.start == original.start
            && close(head_word.length + tail_word.length, original.length)
    }

    fn split_word_conserves(
        lead: u8,
        words: Vec<(u8, u8)>,
        tail: u8,
        pick: usize,
        letters: u8,
        at: usize,
        frac: u8
    ) -> TestResult {
        if words.is_empty() {
            return TestResult::discard();
        }
        let mut segment = segment_from(lead, &words, tail);
        let picked = pick % words.len();
        let text = spelled(letters);
        segment.word_alignments[picked].word = text.clone();
        let original = segment.word_alignments[picked].clone();
        let time = time_inside(&original, frac);
        let index = 1 + at % (text.len() - 1);

        let updated = engine().split_word_in_segment(&segment, picked, index, time).unwrap();
        let head_word = &updated.word_alignments[picked];
        let tail_word = &updated.word_alignments[picked + 1];

        TestResult::from_bool(
            validate(&updated).is_ok()
                && updated.start == segment.start
                && updated.length == segment.length
                && updated.word_alignments.len() == segment.word_alignments.len() + 1
                && format!("{}{}", head_word.word, tail_word.word) == text
                && head_word.start == original.start
                && tail_word.start == time
                && close(tail_word.end(), original.end())
                && updated.word_alignments[..picked] == segment.word_alignments[..picked]
                && updated.word_alignments[picked + 2..] == segment.word_alignments[picked + 1..],
        )
    }

    fn merge_with_gap_conserves(
        lead: u8,
        first_words: Vec<(u8, u8)>,
        gap: u8,
        second_words: Vec<(u8, u8)>,
        tail: u8
    ) -> bool {
        let first = segment_from(lead, &first_words, tail);
        let second = shifted(
            segment_from(0, &second_words, tail),
            "t",
            first.end() + f64::from(gap) / 100.0,
        );

        let merged = engine().merge_two_segments(&first, &second).unwrap();
        let expected: Vec<WordAlignment> = first
            .word_alignments
            .iter()
            .chain(&second.word_alignments)
            .cloned()
            .collect();

        validate(&merged).is_ok()
            && merged.id == first.id
            && merged.start == first.start
            && close(merged.end(), second.end())
            && merged.word_alignments == expected
    }

    fn growing_bounds_keep_words(lead: u8, words: Vec<(u8, u8)>, tail: u8, front: u8, back: u8) -> bool {
        let segment = segment_from(lead, &words, tail);
        let start = (segment.start - f64::from(front) / 100.0).max(0.0);
        let length = segment.end() + f64::from(back) / 100.0 - start;

        let updated = engine().update_segment_time(&segment, start, length).unwrap();

        validate(&updated).is_ok()
            && updated.start == start
            && updated.length == length
            && updated.word_alignments == segment.word_alignments
            && updated.id == segment.id
    }

    fn reversed_merge_not_adjacent(lead: u8, words: Vec<(u8, u8)>, tail: u8) -> TestResult {
        if words.len() < 2 {
            return TestResult::discard();
        }
        let segment = segment_from(lead, &words, tail);
        let mut engine = engine();
        let pair = engine.split_segment_at_word(&segment, 1).unwrap();

        TestResult::from_bool(matches!(
            engine.merge_two_segments(&pair.second, &pair.first),
            Err(EditError::NotAdjacent { .. })
        ))
    }
}

#[test]
fn scenario_split_at_word() {
    let segment = Segment::new(
        "s",
        0.0,
        4.0,
        vec![
            WordAlignment::new("hello", 0.0, 2.0),
            WordAlignment::new("world", 2.0, 2.0),
        ],
    );
    let pair = engine().split_segment_at_word(&segment, 1).unwrap();

    assert_eq!((pair.first.start, pair.first.length), (0.0, 2.0));
    assert_eq!(pair.first.transcript(" "), "hello");
    assert_eq!((pair.second.start, pair.second.length), (2.0, 2.0));
    assert_eq!(pair.second.transcript(" "), "world");
}
