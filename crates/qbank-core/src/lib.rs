//! # qbank-core
//!
//! Core types and error types for qbank.
//!
//! This crate provides the foundational types shared across all qbank crates:
//! - Entity structs for the parent question and every variant child table
//! - Question type, skill, completion status, and variant kind enums
//! - The `QuestionDetail` aggregate and its type-tagged payload
//! - Completion rules per question type
//! - Caller inputs and their conversion into stored rows
//! - The search document projection and query types

pub mod aggregate;
pub mod clock;
pub mod completion;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod inputs;
pub mod search;
