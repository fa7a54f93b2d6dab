//! Repository modules for the parent table and every variant table.
//!
//! Free functions take a `&libsql::Connection` so they compose inside one
//! transaction; each module also adds methods to `QuestionDb` via
//! `impl QuestionDb` blocks.

pub mod changed_since;
pub mod child;
pub mod choice_one;
pub mod question;
pub mod variant;
