use crate::controller::ActionName;
use crate::label::Value;
use crate::menu::{DEADZONE_RADIUS, DeadzoneStrategy, PIE_RADIUS};
use directories::ProjectDirs;
use fs_err as fs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

/// Global defaults shared by every control. Read-only at runtime;
/// per-control state lives in the field store instead.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub pie_radius: f64,
    pub deadzone_radius: f64,
    pub sensitivity: u32,
    /// Threshold in seconds the host uses to tell short from long key
    /// presses. The core never measures time itself.
    pub short_vs_long_press_time: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pie_radius: PIE_RADIUS,
            deadzone_radius: DEADZONE_RADIUS,
            sensitivity: 50,
            short_vs_long_press_time: 0.3,
        }
    }
}

fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("org", "rondel", "rondel").ok_or(ConfigError::ConfigDirNotFound)
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// Path of the read-write field store (label order, rotation tweaks).
pub fn get_store_path() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().join("state.json"))
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("RONDEL"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_default() -> Settings {
    match load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Failed to load settings, using defaults: {e}");
            Settings::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

struct StoreInner {
    path: Option<PathBuf>,
    values: RefCell<HashMap<String, serde_json::Value>>,
    #[allow(clippy::type_complexity)]
    callbacks: RefCell<HashMap<String, Vec<Box<dyn Fn()>>>>,
}

/// Read-write key/value store backing the persisted [`Field`]s.
///
/// Single-threaded: all mutation happens on the GUI thread, so the
/// store is `Rc`-shared and never locked. Out-of-band file edits
/// reach it through [`ConfigStore::reload`], typically triggered by
/// [`crate::runtime::start_background_services`].
#[derive(Clone)]
pub struct ConfigStore {
    inner: Rc<StoreInner>,
}

impl ConfigStore {
    /// A store with no backing file. Writes stay in memory.
    pub fn in_memory() -> Self {
        Self {
            inner: Rc::new(StoreInner {
                path: None,
                values: RefCell::new(HashMap::new()),
                callbacks: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Open a file-backed store. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let values = Self::read_values(&path)?;
        Ok(Self {
            inner: Rc::new(StoreInner {
                path: Some(path),
                values: RefCell::new(values),
                callbacks: RefCell::new(HashMap::new()),
            }),
        })
    }

    pub fn open_default() -> Result<Self, ConfigError> {
        Self::load(get_store_path()?)
    }

    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    fn read_values(path: &Path) -> Result<HashMap<String, serde_json::Value>, ConfigError> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Re-read the backing file after an out-of-band edit and invoke
    /// the callbacks of every field whose value changed.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };
        let new_values = Self::read_values(path)?;

        let changed: HashSet<String> = {
            let old_values = self.inner.values.borrow();
            old_values
                .keys()
                .chain(new_values.keys())
                .filter(|key| old_values.get(*key) != new_values.get(*key))
                .cloned()
                .collect()
        };

        *self.inner.values.borrow_mut() = new_values;
        for key in &changed {
            self.fire(key);
        }
        Ok(())
    }

    fn save(&self) {
        let Some(path) = &self.inner.path else {
            return;
        };
        let result = (|| -> Result<(), ConfigError> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let raw = serde_json::to_string_pretty(&*self.inner.values.borrow())?;
            fs::write(path, raw)?;
            Ok(())
        })();
        if let Err(e) = result {
            log::error!("Failed to save field store: {e}");
        }
    }

    fn fire(&self, key: &str) {
        // Callbacks must not register further callbacks; the registry
        // stays borrowed while they run.
        if let Some(callbacks) = self.inner.callbacks.borrow().get(key) {
            for callback in callbacks {
                callback();
            }
        }
    }

    pub fn field<T>(&self, key: impl Into<String>, default: T) -> Field<T>
    where
        T: Serialize + DeserializeOwned + PartialEq + Clone,
    {
        Field {
            store: self.clone(),
            key: key.into(),
            default,
        }
    }

    pub fn group(&self, name: impl Into<String>) -> FieldGroup {
        FieldGroup {
            store: self.clone(),
            prefix: name.into(),
        }
    }
}

/// Namespace for the fields of one control, prefixing every key.
pub struct FieldGroup {
    store: ConfigStore,
    prefix: String,
}

impl FieldGroup {
    pub fn field<T>(&self, name: &str, default: T) -> Field<T>
    where
        T: Serialize + DeserializeOwned + PartialEq + Clone,
    {
        self.store.field(format!("{}: {name}", self.prefix), default)
    }
}

/// Handle to one persisted value.
pub struct Field<T> {
    store: ConfigStore,
    key: String,
    default: T,
}

impl<T> Field<T>
where
    T: Serialize + DeserializeOwned + PartialEq + Clone,
{
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn read(&self) -> T {
        match self.store.inner.values.borrow().get(&self.key) {
            Some(raw) => match serde_json::from_value(raw.clone()) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("Malformed value under {:?}, using default: {e}", self.key);
                    self.default.clone()
                }
            },
            None => self.default.clone(),
        }
    }

    /// Persist a new value. A no-op when the stored value is already
    /// equal; otherwise saves and invokes the field's callbacks.
    pub fn write(&self, value: &T) {
        let raw = match serde_json::to_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Failed to serialize value for {:?}: {e}", self.key);
                return;
            }
        };
        {
            let mut values = self.store.inner.values.borrow_mut();
            if values.get(&self.key) == Some(&raw) {
                return;
            }
            values.insert(self.key.clone(), raw);
        }
        self.store.save();
        self.store.fire(&self.key);
    }

    /// Register a callback invoked whenever this field's stored value
    /// changes, including out-of-band edits picked up by `reload`.
    pub fn register_callback(&self, callback: impl Fn() + 'static) {
        self.store
            .inner
            .callbacks
            .borrow_mut()
            .entry(self.key.clone())
            .or_default()
            .push(Box::new(callback));
    }
}

/// Persisted per-pie state: the label order plus size scales.
pub struct PieConfig<V> {
    pub pie_radius_scale: Field<f64>,
    pub icon_radius_scale: Field<f64>,
    /// Label values in angular order. This is what drag reordering
    /// commits on edit-mode exit.
    pub order: Field<Vec<V>>,
}

impl<V> PieConfig<V>
where
    V: Value + Serialize + DeserializeOwned,
{
    pub fn new(store: &ConfigStore, name: &ActionName, default_values: Vec<V>) -> Self {
        let group = store.group(format!("Rondel: {name}"));
        Self {
            pie_radius_scale: group.field("Pie scale", 1.0),
            icon_radius_scale: group.field("Icon scale", 1.0),
            order: group.field("Values", default_values),
        }
    }

    pub fn values(&self) -> Vec<V> {
        self.order.read()
    }

    /// Merge a live list of available values with the saved order:
    /// saved entries that are still available keep their position,
    /// newcomers append at the end.
    pub fn resolve_order(&self, available: &[V]) -> Vec<V> {
        let saved = self.order.read();
        let mut ordered: Vec<V> = saved
            .iter()
            .filter(|value| available.contains(value))
            .cloned()
            .collect();
        ordered.extend(
            available
                .iter()
                .filter(|value| !saved.contains(value))
                .cloned(),
        );
        ordered
    }
}

/// Persisted per-rotation state. Immutable for the duration of a
/// session through [`crate::menu::RotationParams::snapshot`].
pub struct RotationConfig {
    pub deadzone_scale: Field<f64>,
    pub inner_zone_scale: Field<f64>,
    pub divisions: Field<u32>,
    pub is_counterclockwise: Field<bool>,
    pub offset: Field<i32>,
    pub inverse_zones: Field<bool>,
    pub deadzone_strategy: Field<DeadzoneStrategy>,
}

impl RotationConfig {
    pub fn new(store: &ConfigStore, name: &ActionName) -> Self {
        let group = store.group(format!("Rondel: {name}"));
        Self {
            // Scales multiply the pie radius; the defaults leave room
            // for both a discrete and a continuous band.
            deadzone_scale: group.field("Deadzone scale", 0.4),
            inner_zone_scale: group.field("Inner zone scale", 0.7),
            divisions: group.field("Divisions", 24),
            is_counterclockwise: group.field("Is counterclockwise", false),
            offset: group.field("Offset", 0),
            inverse_zones: group.field("Inverse zones", false),
            deadzone_strategy: group.field("Deadzone strategy", DeadzoneStrategy::KeepChange),
        }
    }
}

use crate::events::AppEvent;
use async_channel::Sender;

/// Watch the field store for out-of-band edits, forwarding a reload
/// event to the host's event loop for every meaningful change.
pub async fn run_async_watcher(store_path: PathBuf, tx: Sender<AppEvent>) {
    let watch_dir = match store_path.parent() {
        Some(parent) => parent.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs::create_dir_all(&watch_dir) {
        log::error!("Failed to create config directory for watching: {e}");
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(watcher) => watcher,
        Err(e) => {
            log::error!("Failed to create watcher: {e}");
            return;
        }
    };

    if let Err(e) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {e}");
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &store_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {e}"),
        }
    }
}
