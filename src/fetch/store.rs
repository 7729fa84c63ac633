//! Cache store trait and its SQLite and in-memory implementations.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use super::types::{FetchResponse, RequestKey};

/// Storage backend for cached responses.
///
/// Entries are scoped to a generation (a version-tagged cache name); bumping
/// the generation string is the only migration path, so a backend only needs
/// whole-generation deletion, never per-entry eviction.
pub trait CacheStore: Send + Sync {
  /// Store a response under the given generation, overwriting any previous
  /// entry for the same request identity.
  fn put(&self, generation: &str, key: &RequestKey, response: &FetchResponse) -> Result<()>;

  /// Look up the most recent response for a request identity.
  fn get(&self, generation: &str, key: &RequestKey) -> Result<Option<FetchResponse>>;

  /// All generation names currently holding entries.
  fn list_generations(&self) -> Result<Vec<String>>;

  /// Drop every entry belonging to a generation.
  fn delete_generation(&self, generation: &str) -> Result<()>;
}

/// SQLite-backed response cache.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open the store at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    Self::open_at(&path)
  }

  /// Open the store at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self> {
    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;
    Self::from_connection(conn)
  }

  /// Open a transient in-memory store.
  pub fn open_in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory cache: {}", e))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;
    Ok(store)
  }

  /// Get the default database path.
  fn default_path() -> Result<std::path::PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("dhaba").join("cache.db"))
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for the response cache.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS response_cache (
    generation TEXT NOT NULL,
    request_hash TEXT NOT NULL,
    method TEXT NOT NULL,
    url TEXT NOT NULL,
    status INTEGER NOT NULL,
    headers BLOB NOT NULL,
    body BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (generation, request_hash)
);

CREATE INDEX IF NOT EXISTS idx_response_cache_generation
    ON response_cache(generation);
"#;

impl CacheStore for SqliteStore {
  fn put(&self, generation: &str, key: &RequestKey, response: &FetchResponse) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let headers = serde_json::to_vec(&response.headers)
      .map_err(|e| eyre!("Failed to serialize response headers: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO response_cache
           (generation, request_hash, method, url, status, headers, body, cached_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, datetime('now'))",
        params![
          generation,
          key.storage_hash(),
          key.method.as_str(),
          key.url.as_str(),
          response.status,
          headers,
          response.body,
        ],
      )
      .map_err(|e| eyre!("Failed to store cached response: {}", e))?;

    Ok(())
  }

  fn get(&self, generation: &str, key: &RequestKey) -> Result<Option<FetchResponse>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare(
        "SELECT status, headers, body FROM response_cache
         WHERE generation = ? AND request_hash = ?",
      )
      .map_err(|e| eyre!("Failed to prepare cache query: {}", e))?;

    let row: Option<(u16, Vec<u8>, Vec<u8>)> = stmt
      .query_row(params![generation, key.storage_hash()], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
      })
      .ok();

    match row {
      Some((status, headers, body)) => {
        let headers: Vec<(String, String)> = serde_json::from_slice(&headers)
          .map_err(|e| eyre!("Failed to parse cached headers: {}", e))?;
        Ok(Some(FetchResponse {
          status,
          headers,
          body,
        }))
      }
      None => Ok(None),
    }
  }

  fn list_generations(&self) -> Result<Vec<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare("SELECT DISTINCT generation FROM response_cache ORDER BY generation")
      .map_err(|e| eyre!("Failed to prepare generation query: {}", e))?;

    let generations = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| eyre!("Failed to list cache generations: {}", e))?
      .filter_map(|r| r.ok())
      .collect();

    Ok(generations)
  }

  fn delete_generation(&self, generation: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "DELETE FROM response_cache WHERE generation = ?",
        params![generation],
      )
      .map_err(|e| eyre!("Failed to delete cache generation {}: {}", generation, e))?;

    Ok(())
  }
}

/// In-memory response cache, keyed by (generation, request hash).
#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<(String, String), FetchResponse>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl CacheStore for MemoryStore {
  fn put(&self, generation: &str, key: &RequestKey, response: &FetchResponse) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.insert(
      (generation.to_string(), key.storage_hash()),
      response.clone(),
    );
    Ok(())
  }

  fn get(&self, generation: &str, key: &RequestKey) -> Result<Option<FetchResponse>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(
      entries
        .get(&(generation.to_string(), key.storage_hash()))
        .cloned(),
    )
  }

  fn list_generations(&self) -> Result<Vec<String>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    let mut generations: Vec<String> = entries.keys().map(|(g, _)| g.clone()).collect();
    generations.sort();
    generations.dedup();
    Ok(generations)
  }

  fn delete_generation(&self, generation: &str) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.retain(|(g, _), _| g != generation);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use reqwest::Method;

  fn key(method: Method, url: &str) -> RequestKey {
    RequestKey {
      method,
      url: url.parse().unwrap(),
    }
  }

  fn response(body: &str) -> FetchResponse {
    FetchResponse {
      status: 200,
      headers: vec![("Content-Type".to_string(), "application/json".to_string())],
      body: body.as_bytes().to_vec(),
    }
  }

  #[test]
  fn test_sqlite_round_trip() {
    let store = SqliteStore::open_in_memory().unwrap();
    let key = key(Method::GET, "https://backend.example/menu/items");

    assert!(store.get("v1", &key).unwrap().is_none());

    store.put("v1", &key, &response("[]")).unwrap();
    let cached = store.get("v1", &key).unwrap().unwrap();
    assert_eq!(cached, response("[]"));

    // Overwrite wins
    store.put("v1", &key, &response("[1]")).unwrap();
    let cached = store.get("v1", &key).unwrap().unwrap();
    assert_eq!(cached.body, b"[1]");
  }

  #[test]
  fn test_sqlite_generations_are_isolated() {
    let store = SqliteStore::open_in_memory().unwrap();
    let key = key(Method::GET, "https://backend.example/categories");

    store.put("v1", &key, &response("old")).unwrap();
    store.put("v2", &key, &response("new")).unwrap();

    assert_eq!(
      store.list_generations().unwrap(),
      vec!["v1".to_string(), "v2".to_string()]
    );

    store.delete_generation("v1").unwrap();
    assert_eq!(store.list_generations().unwrap(), vec!["v2".to_string()]);
    assert!(store.get("v1", &key).unwrap().is_none());
    assert_eq!(store.get("v2", &key).unwrap().unwrap().body, b"new");
  }

  #[test]
  fn test_memory_store_round_trip() {
    let store = MemoryStore::new();
    let key = key(Method::GET, "https://backend.example/menu/items");

    store.put("v1", &key, &response("cached")).unwrap();
    assert_eq!(store.get("v1", &key).unwrap().unwrap().body, b"cached");

    store.delete_generation("v1").unwrap();
    assert!(store.get("v1", &key).unwrap().is_none());
  }
}
