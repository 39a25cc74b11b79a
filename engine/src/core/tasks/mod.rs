mod executor;

pub use executor::{Executor, TaskError};
