pub mod command;
pub mod extract;
pub mod processor;
pub mod reply;
pub mod snapshot;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
