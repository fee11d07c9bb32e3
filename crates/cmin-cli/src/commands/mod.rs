pub mod minify;
pub mod symbols;
pub mod version;
