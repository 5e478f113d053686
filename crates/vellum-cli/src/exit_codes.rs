//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Syntax error - a template could not be translated or compiled
pub const SYNTAX_ERROR: i32 = 2;

/// Template error - rendering failed at runtime
pub const TEMPLATE_ERROR: i32 = 3;

/// Not found - no template file and no precompiled unit
pub const NOT_FOUND: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
