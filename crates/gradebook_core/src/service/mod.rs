//! Core use-case services.
//!
//! # Responsibility
//! - Turn raw presentation input into validated store calls.
//! - Keep UI/CLI layers decoupled from storage details.

pub mod gradebook_service;
