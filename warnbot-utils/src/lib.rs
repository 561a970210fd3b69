/// Pure parser helpers for command input and chat identifiers.
pub mod parse;
/// Permission helper utilities.
pub mod permissions;
/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '.';
