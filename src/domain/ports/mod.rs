mod geo_database;
mod progress_sink;

pub use geo_database::{DatabaseLoader, GeoDatabase};
pub use progress_sink::ProgressSink;
