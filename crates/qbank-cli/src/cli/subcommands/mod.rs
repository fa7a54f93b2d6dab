mod question;
mod variant;

pub use question::QuestionCommands;
pub use variant::VariantCommands;
