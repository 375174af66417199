#![forbid(unsafe_code)]

pub mod checks;
pub mod console;
