pub mod classifier;
pub mod history;
pub mod intake;
pub mod store;
pub mod workflow;
