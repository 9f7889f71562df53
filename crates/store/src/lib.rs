//! Document store implementations for CareTutor.

pub mod drive;
pub mod in_memory;

pub use drive::{DriveFolders, DriveStore};
pub use in_memory::InMemoryStore;
