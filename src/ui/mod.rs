pub mod json;
pub mod output;
