pub mod parse;
pub mod properties;
pub mod sync;
