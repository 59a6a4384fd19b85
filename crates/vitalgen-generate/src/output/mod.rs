pub mod csv;
pub mod sink;
pub mod text;

pub use text::OutputFormat;
