use thiserror::Error;

/// Every way a call into the engine can fail.
///
/// The taxonomy is flat: one parameterless variant per violated precondition.
/// A failed call leaves engine state and the event log untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum CalcError {
    #[error("magnitude must be non-zero")]
    ZeroMagnitude,
    #[error("phase out of range")]
    PhaseOutOfRange,
    #[error("magnitude bound exceeded")]
    MagnitudeBoundExceeded,
    #[error("caller is not the curator")]
    NotCurator,
    #[error("caller is not the oracle")]
    NotOracle,
    #[error("caller is not the keeper")]
    NotKeeper,
    #[error("zero address")]
    ZeroAddress,
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
    #[error("invalid triad")]
    InvalidTriad,
    #[error("array length mismatch")]
    ArrayLengthMismatch,
    #[error("empty operands")]
    EmptyOperands,
    #[error("division by zero")]
    DivisionByZero,
    #[error("reentrant call")]
    ReentrantCall,
    #[error("invalid slot")]
    InvalidSlot,
    /// Reserved. Nothing in the engine raises it.
    #[error("stale block")]
    StaleBlock,
    #[error("value forwarding failed")]
    ValueForwardFailed,
    #[error("unknown function")]
    UnknownFunction,
    #[error("invalid argument")]
    InvalidArgument,
}

pub type CalcResult<T> = std::result::Result<T, CalcError>;
