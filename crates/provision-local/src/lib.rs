pub mod engine;
pub mod local_runner;
pub mod materialize;

pub use engine::execute;
pub use local_runner::LocalRunner;
pub use materialize::materialize;
