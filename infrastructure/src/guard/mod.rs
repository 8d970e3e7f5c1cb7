//! Content guard adapters.

mod word_list;

pub use word_list::WordListGuard;
