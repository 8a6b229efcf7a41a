mod environment;

pub use environment::{Environment, PREOPEN_NAME};
