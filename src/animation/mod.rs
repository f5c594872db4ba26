pub mod ease;
pub mod reveal;
