use crate::error::{ErrorKind, Result};
use crate::resolver::ProviderResolver;
use exn::ResultExt;
use kbase_catalog::{File, Store};
use tracing::instrument;

/// Rebuild a store's file tree from a full listing of its storage.
///
/// The root is titled with the store's display name, or its name when that is
/// empty. The tree is returned, not saved to the store.
#[instrument(skip_all, fields(store = %store.id()))]
pub async fn store_file_tree(resolver: &ProviderResolver, store: &Store) -> Result<File> {
    let backend = resolver.storage_backend(store).await?;
    let files = backend.list(None).await.or_raise(|| ErrorKind::Storage)?;
    tracing::debug!(files = files.len(), "listed store files");
    let title = match store.display_name.as_str() {
        "" => store.name.as_str(),
        display_name => display_name,
    };
    Ok(File::from_listing(title, &files, |info| backend.url(&info.path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, provider};
    use kbase_catalog::ProviderCategory;

    #[tokio::test]
    async fn test_store_file_tree() {
        let fixture = Fixture::new().await.with_files([
            ("handbook/leave.md", "12345"),
            ("handbook/faq.md", "123"),
            ("readme.md", "1"),
        ]);
        fixture.add(provider("t1", "files", ProviderCategory::Storage, "Local").as_default()).await;
        let mut store = Store::new("t1", "s1");
        store.display_name = "Team Docs".to_string();

        let tree = store_file_tree(&fixture.resolver(), &store).await.unwrap();
        assert_eq!(tree.title, "Team Docs");
        assert_eq!(tree.size, 9);
        let keys: Vec<_> = tree.leaves().into_iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["handbook/faq.md", "handbook/leave.md", "readme.md"]);
        let faq = tree.find("handbook/faq.md").unwrap();
        assert_eq!(faq.url.as_deref(), Some("mock://provider:files/handbook/faq.md"));
    }

    #[tokio::test]
    async fn test_store_file_tree_title_falls_back_to_name() {
        let fixture = Fixture::new().await;
        let mut store = Store::new("t1", "s1");
        store.display_name = String::new();
        store.storage_provider = "legacy".to_string();

        let tree = store_file_tree(&fixture.resolver(), &store).await.unwrap();
        assert_eq!(tree.title, "s1");
        assert!(tree.children.is_empty());
    }
}
