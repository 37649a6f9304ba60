//! Session data model.
//!
//! Every entity here is owned by exactly one [`Session`]. The types describe
//! the well-typed shape that the integrity components guarantee on output.

pub mod conversation;
pub mod model;
pub mod note;
pub mod phase;
pub mod slide;
pub mod transcript;

pub use conversation::{AiConversation, AiMessage, MessageRole};
pub use model::{CURRENT_SCHEMA_VERSION, Session};
pub use note::{EnhancedNote, EnhancementStatus, Note};
pub use phase::SessionPhase;
pub use slide::{DEFAULT_SLIDE_HEIGHT, DEFAULT_SLIDE_WIDTH, Slide};
pub use transcript::TranscriptSegment;
