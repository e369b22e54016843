mod provider;
mod store;
mod vector;

pub use self::provider::ProviderRepository;
pub use self::store::StoreRepository;
pub use self::vector::VectorRepository;
