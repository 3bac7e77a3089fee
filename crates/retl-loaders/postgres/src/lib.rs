mod factory;
mod postgres_loader;

pub use factory::PostgresLoaderFactory;
pub use postgres_loader::{PostgresLoader, PostgresLoaderConfig};
