use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the rule core.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("out of memory while growing rule data: {0}")]
    Resource(#[from] TryReserveError),
}

pub type Result<T> = std::result::Result<T, RulesError>;

/// Push onto a vector, reporting allocation failure instead of aborting.
pub(crate) fn try_push<T>(items: &mut Vec<T>, item: T) -> Result<()> {
    items.try_reserve(1)?;
    items.push(item);
    Ok(())
}
