use crate::error::{Error, ErrorKind};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = '/';

/// Composite identifier of an owner-scoped record, written `<owner>/<name>`.
///
/// Stores and providers are both addressed this way. A provider referenced by
/// a store is always looked up under the store's owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    pub owner: String,
    pub name: String,
}
impl ObjectId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self { owner: owner.into(), name: name.into() }
    }
}
impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.owner, self.name)
    }
}
impl FromStr for ObjectId {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(SEPARATOR) {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains(SEPARATOR) => {
                Ok(Self::new(owner, name))
            },
            _ => exn::bail!(ErrorKind::InvalidId(s.to_string())),
        }
    }
}
