// Supabase module - REST client and table export
pub mod connection;
pub mod reader;

pub use connection::{connect, http_client, SourceReader, SupabaseClient};
pub use reader::{export_table, export_tables};
