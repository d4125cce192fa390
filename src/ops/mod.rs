pub mod pipeline;
pub mod reconcile;
pub mod search;
pub mod selection;
