#[macro_use]
extern crate smart_default;

pub mod error;
pub mod settings;
