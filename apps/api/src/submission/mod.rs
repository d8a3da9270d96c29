pub mod handlers;
pub mod models;
pub mod normalize;
pub mod persistence;
pub mod resume;
