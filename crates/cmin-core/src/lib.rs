#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod error;
pub mod minify;
pub mod rewrite;
pub mod trace;
pub mod version;

pub use config::{Config, MinifyConfig, ScopePolicySetting};
pub use error::{Error, Result};
pub use minify::{minify_file, minify_source, MinifyOutput};
pub use rewrite::{apply_edits, SourceRewriter};
pub use trace::{Trace, TraceEvent};
pub use version::VERSION;
