//! Concrete collaborators wired into the flows at start-up.

pub mod cache;
pub mod provider;
pub mod store;

pub use cache::MemoryCache;
pub use provider::HttpGeocoder;
pub use store::MemoryStore;
