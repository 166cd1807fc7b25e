//! Remote object storage for packed sprite derivatives.

use std::cell::RefCell;
use std::collections::BTreeMap;

use tracing::info;

use crate::error::StorageError;

/// Something that can store a blob under a key and hand back its public URL.
pub trait ObjectStore {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String, StorageError>;
}

/// Connection details of an S3-style bucket reachable over plain HTTP PUT.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Upload endpoint, e.g. `https://s3.eu-west-1.amazonaws.com`.
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    /// Bearer token; omitted when the endpoint accepts anonymous writes.
    pub token: Option<String>,
    /// Base that objects are served from. Defaults to the bucket's
    /// virtual-hosted S3 address.
    pub public_base: Option<String>,
}

pub struct HttpObjectStore {
    config: StorageConfig,
    agent: ureq::Agent,
}

impl HttpObjectStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            agent: ureq::agent(),
        }
    }

    pub fn upload_url(&self, key: &str) -> String {
        let base = self.config.endpoint.trim_end_matches('/');
        format!("{base}/{}/{key}", self.config.bucket)
    }

    pub fn public_url(&self, key: &str) -> String {
        match &self.config.public_base {
            Some(base) => format!("{}/{key}", base.trim_end_matches('/')),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{key}",
                self.config.bucket, self.config.region
            ),
        }
    }
}

impl ObjectStore for HttpObjectStore {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String, StorageError> {
        let url = self.upload_url(key);
        let mut request = self.agent.put(&url).set("Content-Type", content_type);
        if let Some(token) = &self.config.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        request.send_bytes(bytes).map_err(|e| StorageError::Upload {
            key: key.to_owned(),
            message: e.to_string(),
        })?;
        info!(key, size = bytes.len(), "uploaded");
        Ok(self.public_url(key))
    }
}

/// In-process store keyed like a bucket; keeps uploads in memory.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    base_url: String,
    objects: RefCell<BTreeMap<String, (String, Vec<u8>)>>,
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RefCell::default(),
        }
    }

    /// Content type and bytes stored under `key`.
    pub fn get(&self, key: &str) -> Option<(String, Vec<u8>)> {
        self.objects.borrow().get(key).cloned()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String, StorageError> {
        self.objects
            .borrow_mut()
            .insert(key.to_owned(), (content_type.to_owned(), bytes.to_vec()));
        Ok(format!("{}/{key}", self.base_url.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> HttpObjectStore {
        HttpObjectStore::new(StorageConfig {
            endpoint: "https://s3.eu-west-1.amazonaws.com/".into(),
            bucket: "game-assets".into(),
            region: "eu-west-1".into(),
            token: None,
            public_base: None,
        })
    }

    #[test]
    fn urls_are_keyed_by_basename() {
        let s = store();
        assert_eq!(
            s.upload_url("fire.webp"),
            "https://s3.eu-west-1.amazonaws.com/game-assets/fire.webp"
        );
        assert_eq!(
            s.public_url("fire.webp"),
            "https://game-assets.s3.eu-west-1.amazonaws.com/fire.webp"
        );
    }

    #[test]
    fn public_base_overrides_s3_address() {
        let s = HttpObjectStore::new(StorageConfig {
            endpoint: "http://localhost:9000".into(),
            bucket: "game-assets".into(),
            region: "local".into(),
            token: None,
            public_base: Some("https://cdn.example.com/assets/".into()),
        });
        assert_eq!(s.upload_url("fire.webp"), "http://localhost:9000/game-assets/fire.webp");
        assert_eq!(s.public_url("fire.webp"), "https://cdn.example.com/assets/fire.webp");
    }

    #[test]
    fn memory_store_keeps_objects() {
        let s = MemoryObjectStore::new("https://cdn.test/");
        let url = s.put("hit.webp", b"abc", "image/webp").unwrap();
        assert_eq!(url, "https://cdn.test/hit.webp");
        assert_eq!(s.get("hit.webp"), Some(("image/webp".to_owned(), b"abc".to_vec())));
        assert!(s.get("other").is_none());
    }
}
