//! Quiz catalog for quizpress.
//!
//! A quiz is one monthly document: a title, a month/year pair, and an
//! ordered list of question/answer pairs. The catalog is pure CRUD plumbing
//! over the hosted document store; it carries none of the authorization
//! logic, which lives in `quizpress-access`.

pub mod error;
pub mod quiz;
pub mod store;

pub use error::{CatalogError, StoreError};
pub use quiz::{Question, Quiz, QuizDraft};
pub use store::{QuizRepository, QuizStore};
