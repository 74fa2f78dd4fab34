pub mod experiments;
pub mod recommendation;
pub mod tracking;
