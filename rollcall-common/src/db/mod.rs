//! Database bootstrap, migrations and models

pub mod bootstrap;
pub mod migrations;
pub mod models;

pub use bootstrap::*;
pub use migrations::*;
pub use models::*;
