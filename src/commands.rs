//! This module defines the `Command` enum and its associated methods for
//! parsing and handling user commands in the disk analysis tool.
//!
//! The `Command` enum represents the commands a user can input, such as
//! opening a disk image, printing its layout, inspecting one volume, or
//! quitting.

/// Represents a user command in the disk analysis tool.
#[derive(Debug)]
pub enum Command {
    /// Command to quit the program.
    Quit,
    /// Command to open a disk image, encapsulating the file path as a `String`.
    Open(String),
    /// Command to print the partition table and detected volumes.
    Print,
    /// Command to show the details of one volume.
    Volume(u8),
    /// Command for an unknown input, encapsulating the raw input as a `String`.
    Unknown(String),
    /// Command for invalid input, encapsulating an error message as a `String`.
    Invalid(String),
    /// Command for an empty input.
    Empty,
}

impl Command {
    /// Parses a string into a `Command` instance.
    ///
    /// # Parameters
    /// - `s`: A string slice representing the user input.
    ///
    /// # Returns
    /// - `Command::Quit` if the input is "quit".
    /// - `Command::Open` with the file path if the input starts with "open"
    ///   followed by a valid argument.
    /// - `Command::Print` if the input is "print".
    /// - `Command::Volume` if the input is "vol" followed by a number.
    /// - `Command::Unknown` if the input does not match any known command.
    /// - `Command::Invalid` if a command is missing its argument.
    /// - `Command::Empty` if the input is empty or contains only whitespace.
    pub fn from_string(s: &str) -> Self {
        let mut parts = s.trim().split_whitespace();
        match parts.next() {
            Some("quit") => Command::Quit,
            Some("open") => match parts.next() {
                Some(arg) => Command::Open(arg.to_string()),
                None => Command::Invalid(String::from(
                    "Missing arg: 'open' expects the path to a disk image.",
                )),
            },
            Some("print") => Command::Print,
            Some("vol") => match parts.next() {
                Some(arg) => match arg.parse::<u8>() {
                    Ok(nb) => Command::Volume(nb),
                    Err(_) => Command::Invalid(String::from(
                        "Arg parsing error: 'vol' expects an unsigned integer.",
                    )),
                },
                None => Command::Invalid(String::from(
                    "Missing arg: 'vol' expects the partition number.",
                )),
            },
            Some(other) => Command::Unknown(other.to_string()),
            None => Command::Empty,
        }
    }
}
