pub mod slug;
pub mod text;
pub mod validation;

pub use slug::slugify;
pub use text::{smart_trim, strip_html, take_chars};
pub use validation::{Validator, is_email};
