pub mod gate;
pub mod observer;
