// Worker module - API client and per-entity import steps
pub mod connection;
pub mod writer;

pub use connection::{connect, submit, WorkerApi, WorkerClient};
pub use writer::{HabitIdMap, Importer};
