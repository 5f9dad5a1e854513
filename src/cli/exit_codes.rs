//! exit codes for ccond commands
//!
//! these follow Unix conventions where 0 = success and non-zero = error
//! specific codes help scripts distinguish between failure types

/// command completed successfully
pub const SUCCESS: i32 = 0;

/// general or unknown error
pub const ERROR: i32 = 1;

/// named container does not exist in the config
pub const CONTAINER_NOT_FOUND: i32 = 2;

/// invalid command-line arguments or context input
pub const INVALID_ARGS: i32 = 4;

/// configuration file or condition specification error
pub const CONFIG_ERROR: i32 = 5;

/// a condition could not be decided for the given context
pub const EVAL_ERROR: i32 = 6;
