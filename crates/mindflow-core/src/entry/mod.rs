//! Entry domain: model, repository port, and the starter seed.

pub mod model;
pub mod repository;
pub mod seed;

pub use model::{Emotion, Entry, filter_entries, sort_newest_first};
pub use repository::EntryRepository;
pub use seed::starter_entries;
