use crate::error::{Error, ErrorKind};
use crate::id::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Which of a store's three slots a provider can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderCategory {
    Storage,
    Model,
    Embedding,
}
impl ProviderCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Storage => "Storage",
            Self::Model => "Model",
            Self::Embedding => "Embedding",
        }
    }
}
impl fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
impl FromStr for ProviderCategory {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "storage" => Ok(Self::Storage),
            "model" => Ok(Self::Model),
            "embedding" => Ok(Self::Embedding),
            _ => exn::bail!(ErrorKind::InvalidCategory(s.to_string())),
        }
    }
}

/// An owner-scoped description of how to reach a storage, model or embedding
/// backend.
///
/// `provider_type` names the backend family (`"OpenAI"`, `"Local"`, ...) and
/// `sub_type` a variant within it, typically a model name. What `endpoint`
/// means is up to whoever connects the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub owner: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_time: OffsetDateTime,
    pub display_name: String,
    pub category: ProviderCategory,
    #[serde(rename = "type")]
    pub provider_type: String,
    pub sub_type: String,
    pub endpoint: String,
    /// Most files the backend should be asked to process in one indexing
    /// pass, when the backend itself declares a limit.
    #[serde(default)]
    pub max_batch_size: Option<u32>,
    #[serde(default)]
    pub is_default: bool,
}

impl Provider {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        category: ProviderCategory,
        provider_type: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            owner: owner.into(),
            display_name: name.clone(),
            name,
            created_time: OffsetDateTime::now_utc(),
            category,
            provider_type: provider_type.into(),
            sub_type: String::new(),
            endpoint: String::new(),
            max_batch_size: None,
            is_default: false,
        }
    }

    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = sub_type.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_batch_size(mut self, max_batch_size: u32) -> Self {
        self.max_batch_size = Some(max_batch_size);
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn id(&self) -> ObjectId {
        ObjectId::new(&self.owner, &self.name)
    }
}
