mod maxmind_database;
mod stdout_progress;

pub use maxmind_database::{MaxMindDatabase, MaxMindLoader};
pub use stdout_progress::{StdoutProgress, PROGRESS_PREFIX};
