pub mod bulletin;
pub mod cache;
pub mod ec;
pub mod forecast;
pub mod geo;
