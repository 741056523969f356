//! Interactive calibration room
//!
//! A readline-based room where participants vote, resolve consensus,
//! move employees on the grid and discuss, with live session events.

mod command;
mod repl;

pub use command::{ParseError, RoomCommand};
pub use repl::{CalibrationRoom, RoomServices};
