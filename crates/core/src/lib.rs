pub mod config;
pub mod dedup;
pub mod document;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod query;
pub mod save;
pub mod worker;

pub use config::{Config, LogConfig, LogRotation, QueryConfig, SaveConfig, UiConfig};
pub use dedup::DedupLog;
pub use document::{Document, SAMPLE_DOCUMENT};
pub use engine::{CancelToken, JaqEngine, QueryEngine};
pub use error::{Error, EvalError, Result};
pub use evaluate::{Evaluator, NULL_RENDER};
pub use query::{IDENTITY, canonicalize, normalize};
pub use save::{SaveTarget, confirmation, default_save_dir};
pub use worker::ProcessEngine;
