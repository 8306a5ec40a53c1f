#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_derive_newtype;

pub mod impls;
pub mod newtypes;
pub mod sensitive;
pub mod source;
pub mod traits;
