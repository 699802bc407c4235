use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use spots::{ComponentModel, DEFAULT_PAYLOAD_KEY, models_from_value};

use crate::{BlobStore, Result};

/// Entries written by a [`StateCache`] expire after three days unless configured otherwise.
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// Lowercase hex SHA-256 of `key`, used as the stored entry name.
pub fn cache_file_name(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut name = String::with_capacity(digest.len() * 2);
    for byte in digest.as_slice() {
        let _ = write!(name, "{byte:02x}");
    }
    name
}

/// Typed JSON state persisted under one key of a [`BlobStore`].
#[derive(Clone, Debug)]
pub struct StateCache<S> {
    key: String,
    file_name: String,
    expiry: Duration,
    store: S,
}

impl<S: BlobStore> StateCache<S> {
    pub fn new(key: impl Into<String>, store: S) -> Self {
        let key = key.into();
        Self {
            file_name: cache_file_name(&key),
            key,
            expiry: DEFAULT_EXPIRY,
            store,
        }
    }

    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn save<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.store.save(&self.file_name, &bytes, self.expiry)
    }

    /// Returns `Ok(None)` when nothing (or only an expired entry) is stored.
    pub fn load<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        let Some(bytes) = self.store.load(&self.file_name)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(&self.file_name)
    }

    /// Stores `models` as a `{"components": [...]}` payload.
    pub fn save_models(&mut self, models: &[ComponentModel]) -> Result<()> {
        #[derive(Serialize)]
        struct Payload<'a> {
            components: &'a [ComponentModel],
        }
        self.save(&Payload { components: models })
    }

    pub fn load_models(&mut self) -> Result<Option<Vec<ComponentModel>>> {
        let Some(value) = self.load::<serde_json::Value>()? else {
            return Ok(None);
        };
        Ok(Some(models_from_value(&value, DEFAULT_PAYLOAD_KEY, None)?))
    }
}

/// A cache hook for [`spots::Component::set_cache_hook`] that persists the component's model.
///
/// Write failures are logged and otherwise ignored.
pub fn component_cache_hook<S: BlobStore + 'static>(
    cache: Rc<RefCell<StateCache<S>>>,
) -> impl FnMut(&ComponentModel) + 'static {
    move |model: &ComponentModel| {
        if let Err(_err) = cache.borrow_mut().save(model) {
            awarn!(error = %_err, "StateCache: failed to write component model");
        }
    }
}
