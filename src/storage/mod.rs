//! Persistence boundary for parsed chapters
//!
//! The crawler never decides where or how a chapter is stored. It hands each
//! chapter to a [`Saver`] as soon as the page is parsed, and the backend owns
//! the layout. [`MemorySaver`] keeps chapters in a `Vec` for embedders and tests.

mod memory;
mod traits;

pub use memory::MemorySaver;
pub use traits::{SaveError, SaveResult, Saver};
