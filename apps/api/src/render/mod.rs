// Preview rendering: the inline marker formatter and its application to the
// free-text fields of a resume document.

pub mod handlers;
pub mod inline;
pub mod preview;

pub use inline::{escape_markup, format_inline, format_with_newlines};
pub use preview::{render_preview, PreviewDocument};
