pub mod hook;
pub mod signal;
