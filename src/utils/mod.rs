pub mod formatter;

pub use formatter::{INDENT, bullet, indent};
