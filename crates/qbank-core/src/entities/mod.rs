//! Entity structs for qbank.
//!
//! Each entity maps to one table in the libSQL store. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and schema
//! validation.

mod question;
mod variants;

pub use question::Question;
pub use variants::{
    ChoiceOneOption, ChoiceOneQuestion, Conversation, ConversationTurn, ErrorIdentification,
    FillInBlankAnswer, OpenParagraphPrompt, RepetitionItem, SentenceTransformation,
};
