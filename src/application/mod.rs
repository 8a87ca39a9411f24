//! Application Layer
//!
//! Use cases: refreshing the installed database and resolving addresses.

mod provisioner;
mod resolver;

pub use provisioner::Provisioner;
pub use resolver::Resolver;
