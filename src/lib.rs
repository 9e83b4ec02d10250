// Segment and word alignment model
pub mod alignment;

// Engine configuration
pub mod config;

// Edit engine module
pub mod edit;

// Error taxonomy
pub mod error;

// Transcript file operations module
pub mod file;

// Segment id generation
pub mod id;

// JSON request/response module
pub mod json;

// Character offset helpers
pub mod position;

// Owning segment sequence
pub mod transcript;

// Re-exports
pub use alignment::{Segment, TIME_EPSILON, WordAlignment, validate, validate_sequence};
pub use config::{ConfigError, EditConfig, SpeakerMergePolicy};
pub use edit::{EditEngine, SegmentPair};
pub use error::{AlignmentViolation, EditError};
pub use file::{FileError, TranscriptFile, checksum, read_transcript, write_transcript};
pub use id::{IdGenerator, SequentialIdGen, UuidIdGen};
pub use json::{EditRequest, EditResponse, RequestError, generate_execution_id};
pub use position::{char_len, char_to_byte, split_at_char};
pub use transcript::{EditOutcome, Operation, Transcript};
