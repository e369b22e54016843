use crate::id::ObjectId;
use crate::models::{File, ProviderCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Metadata about one ingested slice of a store's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    #[serde(with = "time::serde::rfc3339")]
    pub collected_time: OffsetDateTime,
    pub subject: String,
}

/// Tenant-scoped configuration root of a knowledge base.
///
/// Each provider reference is either empty (use the default provider of that
/// category) or the name of a provider owned by the same tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub owner: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_time: OffsetDateTime,
    pub display_name: String,

    pub storage_provider: String,
    pub model_provider: String,
    pub embedding_provider: String,

    pub frequency: u32,
    pub limit_minutes: u32,
    pub welcome: String,
    pub prompt: String,

    #[serde(default)]
    pub file_tree: Option<File>,
    #[serde(default)]
    pub properties: BTreeMap<String, Properties>,
}

impl Store {
    /// A store with no providers configured, created now.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            owner: owner.into(),
            display_name: name.clone(),
            name,
            created_time: OffsetDateTime::now_utc(),
            storage_provider: String::new(),
            model_provider: String::new(),
            embedding_provider: String::new(),
            frequency: 0,
            limit_minutes: 0,
            welcome: String::new(),
            prompt: String::new(),
            file_tree: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        ObjectId::new(&self.owner, &self.name)
    }

    /// The raw provider reference configured for a category (possibly empty).
    pub fn provider_reference(&self, category: ProviderCategory) -> &str {
        match category {
            ProviderCategory::Storage => &self.storage_provider,
            ProviderCategory::Model => &self.model_provider,
            ProviderCategory::Embedding => &self.embedding_provider,
        }
    }

    /// Id of the provider configured for a category, or `None` when the store
    /// defers to the default provider.
    pub fn provider_id(&self, category: ProviderCategory) -> Option<ObjectId> {
        match self.provider_reference(category) {
            "" => None,
            name => Some(ObjectId::new(&self.owner, name)),
        }
    }
}
