//! Persistence for sender profiles, client templates and the invoice
//! counter.
//!
//! Stores are flat key-value maps whose values are JSON strings. The typed
//! operations are provided methods on [`InvoiceStore`], so a backend only
//! has to read and write raw values.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{ClientTemplate, SenderProfile};

pub const TEMPLATES_KEY: &str = "client-templates";
pub const PROFILES_KEY: &str = "sender-profiles";
pub const LAST_INVOICE_NUMBER_KEY: &str = "last-invoice-number";

pub trait InvoiceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    fn list_templates(&self) -> Result<Vec<ClientTemplate>, StoreError> {
        read_collection(self, TEMPLATES_KEY)
    }

    /// Insert, or replace the template with the same id.
    fn save_template(&mut self, template: ClientTemplate) -> Result<(), StoreError> {
        upsert(self, TEMPLATES_KEY, template)
    }

    /// Remove a template; a missing id is not an error.
    fn delete_template(&mut self, id: &str) -> Result<(), StoreError> {
        remove::<ClientTemplate, _>(self, TEMPLATES_KEY, id)
    }

    fn list_profiles(&self) -> Result<Vec<SenderProfile>, StoreError> {
        read_collection(self, PROFILES_KEY)
    }

    fn save_profile(&mut self, profile: SenderProfile) -> Result<(), StoreError> {
        upsert(self, PROFILES_KEY, profile)
    }

    fn delete_profile(&mut self, id: &str) -> Result<(), StoreError> {
        remove::<SenderProfile, _>(self, PROFILES_KEY, id)
    }

    /// The last delivered numeric invoice number, if any.
    fn last_invoice_number(&self) -> Result<Option<u64>, StoreError> {
        let Some(raw) = self.get(LAST_INVOICE_NUMBER_KEY)? else {
            return Ok(None);
        };
        match raw.trim().parse() {
            Ok(n) => Ok(Some(n)),
            Err(_) => {
                tracing::warn!(value = %raw, "ignoring unparsable invoice counter");
                Ok(None)
            }
        }
    }

    fn set_last_invoice_number(&mut self, number: u64) -> Result<(), StoreError> {
        self.set(LAST_INVOICE_NUMBER_KEY, number.to_string())?;
        tracing::info!(number, "invoice counter updated");
        Ok(())
    }
}

trait Keyed {
    fn id(&self) -> &str;
}

impl Keyed for ClientTemplate {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Keyed for SenderProfile {
    fn id(&self) -> &str {
        &self.id
    }
}

fn read_collection<T, S>(store: &S, key: &str) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
    S: InvoiceStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&raw) {
        Ok(items) => Ok(items),
        Err(err) => {
            tracing::warn!(key, error = %err, "stored collection is corrupt; treating it as empty");
            Ok(Vec::new())
        }
    }
}

fn write_collection<T, S>(store: &mut S, key: &str, items: &[T]) -> Result<(), StoreError>
where
    T: Serialize,
    S: InvoiceStore + ?Sized,
{
    store.set(key, serde_json::to_string(items)?)
}

fn upsert<T, S>(store: &mut S, key: &str, item: T) -> Result<(), StoreError>
where
    T: Keyed + Serialize + DeserializeOwned,
    S: InvoiceStore + ?Sized,
{
    let mut items: Vec<T> = read_collection(store, key)?;
    let id = item.id().to_string();
    match items.iter_mut().find(|existing| existing.id() == id) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
    write_collection(store, key, &items)?;
    tracing::info!(key, id = %id, "record saved");
    Ok(())
}

fn remove<T, S>(store: &mut S, key: &str, id: &str) -> Result<(), StoreError>
where
    T: Keyed + Serialize + DeserializeOwned,
    S: InvoiceStore + ?Sized,
{
    let mut items: Vec<T> = read_collection(store, key)?;
    let before = items.len();
    items.retain(|item| item.id() != id);
    if items.len() == before {
        tracing::debug!(key, id, "nothing to delete");
        return Ok(());
    }
    write_collection(store, key, &items)?;
    tracing::info!(key, id, "record deleted");
    Ok(())
}

/// `template-<unix millis>-<7 random chars>`.
pub fn new_template_id() -> String {
    generate_id("template")
}

/// `profile-<unix millis>-<7 random chars>`.
pub fn new_profile_id() -> String {
    generate_id("profile")
}

fn generate_id(prefix: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, Utc::now().timestamp_millis(), &random[..7])
}

/// In-process store, used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InvoiceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by one JSON object on disk. Every write replaces the file
/// atomically through a sibling temp file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// The file is created on first write; a missing file reads as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(self.io_error(err)),
        };
        match serde_json::from_str(&raw) {
            Ok(values) => Ok(values),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "store file is corrupt; starting empty");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let data = serde_json::to_vec_pretty(values)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, data).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

impl InvoiceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value);
        self.write_all(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClientInfo, DefaultService};

    fn template(id: &str, price: &str) -> ClientTemplate {
        ClientTemplate {
            id: id.into(),
            name: "Acme".into(),
            client: ClientInfo {
                name: "Acme".into(),
                ..ClientInfo::default()
            },
            service: DefaultService {
                description: "Consulting".into(),
                price: price.into(),
            },
        }
    }

    #[test]
    fn save_upserts_by_id() {
        let mut store = MemoryStore::new();
        store.save_template(template("t1", "$1")).unwrap();
        store.save_template(template("t2", "$2")).unwrap();
        store.save_template(template("t1", "$3")).unwrap();

        let templates = store.list_templates().unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].id, "t1");
        assert_eq!(templates[0].service.price, "$3");
    }

    #[test]
    fn delete_missing_id_is_noop() {
        let mut store = MemoryStore::new();
        store.save_template(template("t1", "$1")).unwrap();
        store.delete_template("nope").unwrap();
        assert_eq!(store.list_templates().unwrap().len(), 1);
        store.delete_template("t1").unwrap();
        assert!(store.list_templates().unwrap().is_empty());
    }

    #[test]
    fn corrupt_values_read_as_empty() {
        let mut store = MemoryStore::new();
        store.set(TEMPLATES_KEY, "{not json".into()).unwrap();
        store.set(LAST_INVOICE_NUMBER_KEY, "INV-7".into()).unwrap();
        assert!(store.list_templates().unwrap().is_empty());
        assert_eq!(store.last_invoice_number().unwrap(), None);
    }

    #[test]
    fn counter_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.last_invoice_number().unwrap(), None);
        store.set_last_invoice_number(41).unwrap();
        assert_eq!(store.last_invoice_number().unwrap(), Some(41));
    }

    #[test]
    fn generated_ids_have_expected_shape() {
        let id = new_template_id();
        let parts: Vec<&str> = id.splitn(3, '-').collect();
        assert_eq!(parts[0], "template");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 7);
        assert!(new_profile_id().starts_with("profile-"));
        assert_ne!(new_profile_id(), new_profile_id());
    }
}
