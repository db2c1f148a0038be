//! Models where the bytes to patch come from and where they go.

use std::{
    fmt, fs,
    io::{self, Read as _, Write as _},
    path::PathBuf,
};

/// The source of the bytes to patch.
///
/// The whole input is read into memory up front; the scan never streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// The input is the file at the given path.
    File(PathBuf),
    /// The input is read from stdin.
    Stdin,
}

impl Input {
    /// Creates an input from a command line argument, mapping `-` to stdin.
    pub fn from_arg(arg: &str) -> Input {
        if arg == "-" {
            Input::Stdin
        } else {
            Input::File(PathBuf::from(arg))
        }
    }

    /// Reads the entire input into memory.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        match self {
            Input::File(path) => fs::read(path),
            Input::Stdin => {
                let mut buf = Vec::new();
                io::stdin().read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::File(path) => path.display().fmt(f),
            Input::Stdin => f.write_str("stdin"),
        }
    }
}

/// The sink the patched bytes are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// The output is the file at the given path, overwritten if it exists.
    File(PathBuf),
    /// The output is written to stdout.
    Stdout,
}

impl Output {
    /// Creates an output from a command line argument, mapping `-` to stdout.
    pub fn from_arg(arg: &str) -> Output {
        if arg == "-" {
            Output::Stdout
        } else {
            Output::File(PathBuf::from(arg))
        }
    }

    /// Writes the entire buffer, replacing any previous contents.
    pub fn write(&self, bytes: &[u8]) -> io::Result<()> {
        match self {
            Output::File(path) => fs::write(path, bytes),
            Output::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(bytes)?;
                stdout.flush()
            }
        }
    }

    /// Determines if the output goes to stdout.
    pub fn is_stdout(&self) -> bool {
        matches!(self, Output::Stdout)
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::File(path) => path.display().fmt(f),
            Output::Stdout => f.write_str("stdout"),
        }
    }
}
