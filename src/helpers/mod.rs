//! Helper functions shared by the content layer and the page templates

mod date;
mod url;

pub use date::*;
pub use url::*;
