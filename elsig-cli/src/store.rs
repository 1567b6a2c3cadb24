//! On-disk state: config, keystore and parameter files, all JSON.

use anyhow::{anyhow, bail, Context, Result};
use elsig_crypto::encoding::{format_biguint, parse_biguint};
use elsig_crypto::{DomainParameters, HashAlgorithm, KeyPair, ParameterPolicy, ParameterSpec};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub params_path: Option<PathBuf>,
    pub hash: HashAlgorithm,
    pub min_prime_bits: u64,
    pub primality_rounds: u32,
    pub require_safe_prime: bool,
}

impl Default for Config {
    fn default() -> Self {
        let policy = ParameterPolicy::default();
        Self {
            params_path: None,
            hash: HashAlgorithm::default(),
            min_prime_bits: policy.min_prime_bits,
            primality_rounds: policy.primality_rounds,
            require_safe_prime: policy.require_safe_prime,
        }
    }
}

impl Config {
    pub fn policy(&self) -> ParameterPolicy {
        ParameterPolicy {
            min_prime_bits: self.min_prime_bits,
            primality_rounds: self.primality_rounds,
            require_safe_prime: self.require_safe_prime,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Keystore {
    pub keys: Vec<KeyEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyEntry {
    pub name: String,
    /// Fingerprint of the group the key belongs to.
    pub group: String,
    pub public_key: String,
    pub private_key: String,
}

impl KeyEntry {
    pub fn new(name: String, params: &DomainParameters, pair: &KeyPair) -> Self {
        Self {
            name,
            group: params.fingerprint(),
            public_key: format_biguint(pair.public_key().value()),
            private_key: format_biguint(pair.private_key().expose()),
        }
    }

    /// Rebuilds the keypair, refusing entries made for a different group.
    pub fn keypair(&self, params: &DomainParameters) -> Result<KeyPair> {
        if self.group != params.fingerprint() {
            bail!(
                "key '{}' belongs to group {}, current parameters are {}",
                self.name,
                self.group,
                params.fingerprint()
            );
        }
        let private = parse_biguint(&self.private_key)?;
        let public = parse_biguint(&self.public_key)?;
        Ok(KeyPair::from_parts(params, private, public)?)
    }

    /// `name  (0x1234abcd…)`, as shown in menus.
    pub fn label(&self) -> String {
        let short: String = self.public_key.chars().take(10).collect();
        format!("{}  ({}…)", self.name, short)
    }
}

impl Keystore {
    pub fn find(&self, name: &str) -> Option<&KeyEntry> {
        self.keys.iter().find(|k| k.name == name)
    }

    pub fn index_from_label(&self, label: &str) -> Option<usize> {
        self.keys.iter().position(|k| k.label() == label)
    }

    pub fn insert(&mut self, entry: KeyEntry) -> Result<()> {
        if self.find(&entry.name).is_some() {
            bail!("a key named '{}' already exists", entry.name);
        }
        self.keys.push(entry);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<KeyEntry> {
        let idx = self.keys.iter().position(|k| k.name == name)?;
        Some(self.keys.remove(idx))
    }
}

/// Home directory of the tool: `$HOME/.elsig` unless overridden.
#[derive(Clone, Debug)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: Option<PathBuf>) -> Self {
        let dir = dir.unwrap_or_else(default_dir);
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join("config.json")
    }

    pub fn keystore_path(&self) -> PathBuf {
        self.dir.join("keystore.json")
    }

    /// `Ok(None)` only when the file does not exist yet.
    pub fn load_config(&self) -> Result<Option<Config>> {
        load_json(&self.config_path())
    }

    pub fn save_config(&self, cfg: &Config) -> Result<()> {
        save_json(&self.dir, &self.config_path(), cfg)
    }

    pub fn load_keystore(&self) -> Result<Option<Keystore>> {
        load_json(&self.keystore_path())
    }

    /// The stored keystore, or an empty one on first use.
    pub fn keystore(&self) -> Result<Keystore> {
        Ok(self.load_keystore()?.unwrap_or_default())
    }

    pub fn save_keystore(&self, ks: &Keystore) -> Result<()> {
        save_json(&self.dir, &self.keystore_path(), ks)
    }
}

fn default_dir() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".elsig")
}

fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    let value = serde_json::from_str(&s)
        .with_context(|| format!("parsing {}; fix or move the file aside", path.display()))?;
    Ok(Some(value))
}

fn save_json<T: Serialize>(dir: &Path, path: &Path, value: &T) -> Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    debug!(path = %path.display(), "saved");
    Ok(())
}

/// Reads and validates a `{ "prime": ..., "generator": ... }` file.
pub fn load_params(cfg: &Config) -> Result<DomainParameters> {
    let path = cfg.params_path.as_ref().ok_or_else(|| {
        anyhow!("no domain parameters configured; pass --params <file> or set params_path in the config")
    })?;
    read_params(path, &cfg.policy())
}

pub fn read_params(path: &Path, policy: &ParameterPolicy) -> Result<DomainParameters> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading parameter file {}", path.display()))?;
    let spec: ParameterSpec = serde_json::from_str(&text)
        .with_context(|| format!("parsing parameter file {}", path.display()))?;
    let params = spec
        .validate(policy)
        .with_context(|| format!("validating parameters from {}", path.display()))?;
    Ok(params)
}
