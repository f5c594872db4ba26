pub mod boundary;
pub mod resilient;
pub mod scene;
pub mod surface;
