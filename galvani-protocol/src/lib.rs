//! Operator serial terminal
//!
//! A line-oriented console over the UART, in the style of a small monitor
//! program:
//!
//! ```text
//! TERM> VO 0,30,12
//! OK
//! TERM> GO A
//! OK
//! CH0 started
//! CH1 started
//! ```
//!
//! Commands are a two-letter mnemonic followed by arguments separated by
//! spaces, commas, colons or tabs. Input is upper-cased as it is typed.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod line;
pub mod terminal;

pub use command::{Command, CommandError, ACCESS_CODE};
pub use line::{LineEditor, LineEvent, MAX_LINE_LENGTH};
pub use terminal::{SystemRequest, Terminal, PROMPT};
