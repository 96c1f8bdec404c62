pub mod matcher;
pub mod seed;

pub use matcher::VenueMatcher;
