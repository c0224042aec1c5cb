//! Request/response models for the items API.

pub mod item;
pub mod validation;

pub use item::{Item, ItemInput, ITEM_COLUMNS};
pub use validation::ValidationError;
