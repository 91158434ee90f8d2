pub mod cache;
pub mod engine;
pub mod limits;
pub mod model;
pub mod store;
pub mod wire;
