pub mod agents;
pub mod ask;
