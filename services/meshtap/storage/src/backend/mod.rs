//! Record sink backends

pub mod file;
pub mod mem;
