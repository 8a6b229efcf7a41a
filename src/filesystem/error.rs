use snafu::Snafu;

/// Failure vocabulary of every descriptor operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Snafu)]
pub enum ErrorCode {
    #[snafu(display("No such file or directory"))]
    NoEntry,
    #[snafu(display("Not a directory"))]
    NotDirectory,
    #[snafu(display("Is a directory"))]
    IsDirectory,
    #[snafu(display("Invalid argument"))]
    Invalid,
    #[snafu(display("Operation not supported"))]
    Unsupported,
}

/// Failure of a stream binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Snafu)]
pub enum StreamError {
    /// The bound file is gone or the stream reached the end of its data.
    #[snafu(display("Stream is closed"))]
    Closed,
}
