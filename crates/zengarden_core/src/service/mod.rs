//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own the domain queries (gallery, filters, stats) so every storage
//!   backend shares one behavior.
//!
//! # Invariants
//! - Services never bypass repository validation.
//! - Time is read through an injected `Clock`.

pub mod garden_service;
pub mod journal_service;
pub mod meditation_service;
pub mod request_gate;
pub mod sound_service;
pub mod workspace;
