mod analyzer;
mod cascade;
mod config;
mod error;
mod export;
mod history;
mod matcher;
mod parser;
mod rule;
mod ruleset;
mod window;

pub use analyzer::*;
pub use cascade::*;
pub use config::*;
pub use error::{Result, RulesError};
pub use export::*;
pub use history::*;
pub use matcher::*;
pub use parser::*;
pub use rule::*;
pub use ruleset::*;
pub use window::*;
