pub mod registry;
pub mod slot;
