pub mod aggregate;
pub mod buckets;
pub mod config;
pub mod fetch;
pub mod model;
pub mod output;
pub mod parser;
pub mod style;
pub mod time;
