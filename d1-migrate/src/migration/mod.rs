// Migration module - identity mapping, row transforms, orchestration
pub mod executor;
pub mod identity;
pub mod recorder;
pub mod transform;

pub use executor::MigrationExecutor;
pub use identity::IdentityMap;
pub use recorder::MigrationMapping;
