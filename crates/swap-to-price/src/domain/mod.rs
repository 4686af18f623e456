pub mod chain;
pub mod eth;
pub mod executor;
pub mod reserves;
pub mod sizing;
