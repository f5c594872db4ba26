pub mod scenario;
pub mod session;
