use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, approved {approved}")]
    InsufficientAllowance { needed: u128, approved: u128 },

    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("arithmetic overflow in ledger balance")]
    Overflow,
}
