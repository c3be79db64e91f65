pub mod controller;
pub mod orchestrator;
pub mod scheduler;

pub use controller::*;
pub use orchestrator::*;
pub use scheduler::*;
