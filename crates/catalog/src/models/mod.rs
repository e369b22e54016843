mod file;
mod provider;
mod store;
mod vector;

pub use self::file::File;
pub use self::provider::{Provider, ProviderCategory};
pub use self::store::{Properties, Store};
pub use self::vector::Vector;
