pub mod phase;
pub mod scroll;
pub mod trigger;
