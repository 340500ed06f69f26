//! Dataset loading and model persistence

mod loader;
mod saver;

pub use loader::{split_target, ColumnInfo, DataLoader, DatasetInfo};
pub use saver::{load_model, save_model, ModelArtifact};
