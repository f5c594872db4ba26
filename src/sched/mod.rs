pub mod host;
pub mod liveness;
