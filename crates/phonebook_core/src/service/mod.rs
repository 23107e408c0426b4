//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate identity assignment and store calls into use-case APIs.
//! - Keep the CLI and any web layer decoupled from storage details.

pub mod character_service;
