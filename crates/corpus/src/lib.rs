//! Project corpus: which files exist, which are addable, and which ones a
//! free-text message refers to.
//!
//! - [`enumerator`] walks the project tree (the source file enumerator)
//! - [`index`] derives the addable set from the chat and read-only sets
//! - [`mentions`] infers file and identifier mentions from a message
//!
//! Everything here is built fresh per run and never mutates its inputs.

pub mod enumerator;
pub mod index;
pub mod mentions;

pub use enumerator::{SourceEnumerator, WalkEnumerator};
pub use index::{CorpusIndex, FileSets, addable_files};
pub use mentions::{MentionSet, extract_file_mentions, extract_identifier_mentions};
