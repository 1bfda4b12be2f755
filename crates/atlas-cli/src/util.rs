use std::{fs, path::Path};

use anyhow::Context as _;
use atlas_classifier::{ClassifierModel, load_model};
use atlas_engine::{CountryCatalog, CountryRecord};
use serde::{Serialize, de::DeserializeOwned};

/// Where `train` writes the model and `play` looks for it by default.
pub const DEFAULT_MODEL_PATH: &str = "models/classifier.json";

/// Writes `bytes` and a trailing newline to `path`, creating missing parent
/// directories.
pub fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    let mut contents = Vec::with_capacity(bytes.len() + 1);
    contents.extend_from_slice(bytes);
    contents.push(b'\n');
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Writes `value` as pretty-printed JSON, see [`write_file`].
pub fn write_json_file<T>(path: &Path, value: &T) -> anyhow::Result<()>
where
    T: Serialize,
{
    let json = serde_json::to_vec_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    write_file(path, &json)
}

pub fn read_json_file<T>(file_kind: &str, path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read {file_kind} file: {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse {file_kind} file: {}", path.display()))
}

/// Reads a configuration file, or returns the defaults when no path is given.
pub fn read_config_file<T>(path: Option<&Path>) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
{
    path.map_or_else(|| Ok(T::default()), |path| read_json_file("configuration", path))
}

/// Loads a country list file, or the built-in catalog when no path is given.
pub fn load_catalog(path: Option<&Path>) -> anyhow::Result<CountryCatalog> {
    let Some(path) = path else {
        return Ok(CountryCatalog::builtin());
    };
    let records: Vec<CountryRecord> = read_json_file("country list", path)?;
    let catalog = CountryCatalog::from_records(records)
        .with_context(|| format!("Invalid country list: {}", path.display()))?;
    log::info!("loaded {} countries from {}", catalog.len(), path.display());
    Ok(catalog)
}

pub fn load_model_file(path: &Path) -> anyhow::Result<ClassifierModel> {
    let bytes = fs::read(path).with_context(|| {
        format!(
            "Failed to read model file: {} (run `atlas train` first)",
            path.display()
        )
    })?;
    let model =
        load_model(bytes).with_context(|| format!("Invalid model file: {}", path.display()))?;
    Ok(model)
}
