mod algolia_loader;
mod factory;

pub use algolia_loader::{AlgoliaConfig, AlgoliaLoader, OBJECT_ID};
pub use factory::AlgoliaLoaderFactory;
