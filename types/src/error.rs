//! Errors raised while constructing shared types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid account id: {0:?}")]
    InvalidAccountId(String),

    #[error("invalid reward rate: {0}")]
    InvalidRate(String),
}
