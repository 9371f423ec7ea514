//! Core domain types and utilities for the quizpress platform.
//!
//! This crate provides the foundational types and error handling shared by
//! the quizpress publishing application: strongly-typed IDs for quizzes,
//! the opaque identity token assigned by the hosted identity provider, and
//! the common `Result` alias.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{QuizId, Uid};
