pub mod types;

pub use types::SourceError;
