pub mod catalog;

pub use catalog::{catalog, QuizQuestion};
