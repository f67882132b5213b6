//! Persistent key-value store shared by the engine and the view
//!
//! The store is a flat JSON object kept on disk. It is the single source of
//! truth for the timer and the session log, and the channel through which the
//! two halves of the application see each other's writes.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::{Session, TimerState};
use crate::error::{Error, Result};

/// Key holding the display name
pub const USER_NAME_KEY: &str = "userName";
/// Key holding the session log
pub const SESSIONS_KEY: &str = "sessions";
/// Key holding the timer state
pub const TIMER_STATE_KEY: &str = "timerState";

/// Keys whose value changed in one `set`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub keys: Vec<String>,
}

impl StoreChange {
    /// Check if `key` is among the changed keys
    pub fn touches(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

/// Flat key-value store, optionally backed by a file
#[derive(Debug)]
pub struct Store {
    path: Option<PathBuf>,
    values: Mutex<Map<String, Value>>,
    change_tx: broadcast::Sender<StoreChange>,
}

impl Store {
    /// Open a file-backed store. An unreadable or corrupt file starts empty;
    /// a corrupt file is first moved aside so nothing overwrites it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match load_file(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!("Failed to read store {}: {}, starting empty", path.display(), e);
                if path.exists() {
                    let backup = backup_path(&path);
                    match fs::rename(&path, &backup) {
                        Ok(()) => warn!("Moved unreadable store to {}", backup.display()),
                        Err(e) => warn!("Failed to back up unreadable store: {}", e),
                    }
                }
                Map::new()
            }
        };
        Self::with_values(Some(path), values)
    }

    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::with_values(None, Map::new())
    }

    fn with_values(path: Option<PathBuf>, values: Map<String, Value>) -> Self {
        let (change_tx, _) = broadcast::channel(100);
        Self {
            path,
            values: Mutex::new(values),
            change_tx,
        }
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Subscribe to store-change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.change_tx.subscribe()
    }

    /// Read the present values among `keys`
    pub fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let values = self.values.lock().map_err(|_| Error::Lock("store"))?;
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    /// Merge `entries` into the store, persist, and notify changed keys
    pub fn set(&self, entries: Map<String, Value>) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| Error::Lock("store"))?;

        let changed: Vec<String> = entries
            .iter()
            .filter(|(key, value)| values.get(key.as_str()) != Some(*value))
            .map(|(key, _)| key.clone())
            .collect();
        if changed.is_empty() {
            return Ok(());
        }

        let mut next = values.clone();
        next.extend(entries);
        if let Some(path) = &self.path {
            write_file(path, &next)?;
        }
        *values = next;
        drop(values);

        debug!("Store keys changed: {:?}", changed);
        // No subscribers is fine
        let _ = self.change_tx.send(StoreChange { keys: changed });
        Ok(())
    }

    /// Write install-time defaults for every absent key
    pub fn initialize(&self, user_name: &str, default_state: &TimerState) -> Result<()> {
        let present = self.get(&[USER_NAME_KEY, SESSIONS_KEY, TIMER_STATE_KEY])?;
        let mut defaults = Map::new();
        if !present.contains_key(USER_NAME_KEY) {
            defaults.insert(USER_NAME_KEY.to_string(), Value::from(user_name));
        }
        if !present.contains_key(SESSIONS_KEY) {
            defaults.insert(SESSIONS_KEY.to_string(), Value::Array(Vec::new()));
        }
        if !present.contains_key(TIMER_STATE_KEY) {
            defaults.insert(TIMER_STATE_KEY.to_string(), serde_json::to_value(default_state)?);
        }
        self.set(defaults)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = match self.get(&[key]) {
            Ok(mut values) => values.remove(key)?,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Ignoring malformed {}: {}", key, e);
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut entries = Map::new();
        entries.insert(key.to_string(), serde_json::to_value(value)?);
        self.set(entries)
    }

    /// Stored display name
    pub fn user_name(&self) -> Option<String> {
        self.read(USER_NAME_KEY)
    }

    /// Stored timer state, or `default` when there is none yet
    pub fn timer_state_or(&self, default: TimerState) -> TimerState {
        self.read::<TimerState>(TIMER_STATE_KEY)
            .map(TimerState::normalized)
            .unwrap_or(default)
    }

    /// Replace the timer state
    pub fn save_timer_state(&self, state: &TimerState) -> Result<()> {
        self.write(TIMER_STATE_KEY, state)
    }

    fn raw_sessions(&self) -> Result<Vec<Value>> {
        match self.get(&[SESSIONS_KEY])?.remove(SESSIONS_KEY) {
            None => Ok(Vec::new()),
            Some(Value::Array(entries)) => Ok(entries),
            Some(_) => Err(Error::Malformed(SESSIONS_KEY)),
        }
    }

    /// Full session log, empty when absent. Entries that fail to decode are
    /// skipped, not dropped from the store.
    pub fn sessions(&self) -> Vec<Session> {
        let entries = match self.raw_sessions() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring session log: {}", e);
                return Vec::new();
            }
        };
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| match serde_json::from_value(entry) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Skipping malformed session #{}: {}", i, e);
                    None
                }
            })
            .collect()
    }

    /// Append one session to the log, keeping every stored entry as is.
    /// Fails when the stored log is not a list.
    pub fn append_session(&self, session: Session) -> Result<()> {
        let mut entries = self.raw_sessions()?;
        entries.push(serde_json::to_value(session)?);
        self.write(SESSIONS_KEY, &entries)
    }

    /// Wipe the session log
    pub fn clear_sessions(&self) -> Result<()> {
        self.write(SESSIONS_KEY, &Vec::<Session>::new())
    }
}

fn load_file(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".corrupt");
    path.with_file_name(name)
}

fn write_file(path: &Path, values: &Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
