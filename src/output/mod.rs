pub mod formatter;

pub use formatter::{format_json, format_markdown, format_text, should_use_colors};
