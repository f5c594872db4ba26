pub mod form;
pub mod relay;
