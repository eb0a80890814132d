pub mod bounds;
pub mod config;
pub mod constants;
pub mod geo;
pub mod limiter;
pub mod map;
pub mod memo;
pub mod projection;
pub mod viewport;
