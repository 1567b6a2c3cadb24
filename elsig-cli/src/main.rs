use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use elsig_crypto::encoding::format_biguint;
use elsig_crypto::{DomainParameters, ElGamalEngine, HashAlgorithm, KeyPair, MessageDigest, PublicKey, Signature};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, Level};

mod store;
mod tui;

use store::{load_params, read_params, Config, KeyEntry, Store};

#[derive(Parser)]
#[command(name = "elsig", version, about = "ElGamal digital signatures over a prime field")]
struct Cli {
    /// State directory (default: ~/.elsig)
    #[arg(long, global = true)]
    home: Option<PathBuf>,
    /// Domain parameter file; remembered in the config
    #[arg(long, global = true)]
    params: Option<PathBuf>,
    /// Hash used to turn messages into digests; remembered in the config
    #[arg(long, global = true)]
    hash: Option<HashAlgorithm>,
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    Tui,
    /// Validate a parameter file against the configured policy
    CheckParams {
        file: Option<PathBuf>,
    },
    Keygen {
        #[arg(long, default_value = "default")]
        name: String,
    },
    Sign {
        #[arg(long)]
        key: String,
        #[command(flatten)]
        input: MessageInput,
        /// Write the signature JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Verify {
        /// Signature JSON produced by `sign`
        #[arg(long)]
        signature: PathBuf,
        #[command(flatten)]
        input: MessageInput,
        /// Check against this keystore entry instead of the key embedded in the file
        #[arg(long)]
        key: Option<String>,
    },
    /// Generate a throwaway key, sign a message and verify it, printing every step
    Demo {
        #[arg(long)]
        message: Option<String>,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Args, Clone, Debug)]
struct MessageInput {
    #[arg(long, conflicts_with = "file")]
    message: Option<String>,
    #[arg(long)]
    file: Option<PathBuf>,
}

impl MessageInput {
    fn bytes(&self) -> Result<Vec<u8>> {
        match (&self.message, &self.file) {
            (Some(m), _) => Ok(m.as_bytes().to_vec()),
            (None, Some(path)) => {
                fs::read(path).with_context(|| format!("reading message file {}", path.display()))
            }
            (None, None) => bail!("pass --message <text> or --file <path>"),
        }
    }
}

/// What `sign` writes and `verify` reads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct SignatureFile {
    pub group: String,
    pub hash: HashAlgorithm,
    pub public_key: PublicKey,
    pub signature: Signature,
}

const DEMO_MESSAGE: &str = "This is a test message for digital signature demonstration";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = Store::new(cli.home.clone());
    let mut cfg = store.load_config()?.unwrap_or_default();
    let mut changed = false;
    if let Some(params) = &cli.params {
        cfg.params_path = Some(params.clone());
        changed = true;
    }
    if let Some(hash) = cli.hash {
        cfg.hash = hash;
        changed = true;
    }
    if changed {
        store.save_config(&cfg)?;
    }

    match cli.cmd {
        None | Some(Cmd::Tui) => tui::run(&store, cfg),
        Some(Cmd::CheckParams { file }) => cmd_check_params(&cfg, file),
        Some(Cmd::Keygen { name }) => cmd_keygen(&store, &cfg, name),
        Some(Cmd::Sign { key, input, out }) => cmd_sign(&store, &cfg, &key, &input.bytes()?, out),
        Some(Cmd::Verify {
            signature,
            input,
            key,
        }) => cmd_verify(&store, &cfg, &signature, &input.bytes()?, key.as_deref()),
        Some(Cmd::Demo { message }) => {
            let message = message.unwrap_or_else(|| DEMO_MESSAGE.to_string());
            cmd_demo(&cfg, message.as_bytes())
        }
        Some(Cmd::Config) => {
            println!("config file: {}", store.config_path().display());
            println!("{}", serde_json::to_string_pretty(&cfg)?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_check_params(cfg: &Config, file: Option<PathBuf>) -> Result<()> {
    let params = match file {
        Some(path) => read_params(&path, &cfg.policy())?,
        None => load_params(cfg)?,
    };
    print_params(&params);
    println!("Parameters OK");
    Ok(())
}

pub(crate) fn print_params(params: &DomainParameters) {
    println!("Prime p: {} bits", params.bits());
    println!("Generator g: {}", format_biguint(params.generator()));
    println!("Group fingerprint: {}", params.fingerprint());
}

pub(crate) fn generate_key(store: &Store, cfg: &Config, name: String) -> Result<KeyEntry> {
    let params = load_params(cfg)?;
    let engine = ElGamalEngine::new(params);
    let pair = engine.generate_keypair(&mut rand::thread_rng())?;
    let entry = KeyEntry::new(name, engine.params(), &pair);

    let mut keystore = store.keystore()?;
    keystore.insert(entry.clone())?;
    store.save_keystore(&keystore)?;
    info!(name = %entry.name, group = %entry.group, "key stored");
    Ok(entry)
}

fn cmd_keygen(store: &Store, cfg: &Config, name: String) -> Result<()> {
    let entry = generate_key(store, cfg, name)?;
    println!("name: {}", entry.name);
    println!("public key: {}", entry.public_key);
    println!("stored in {}", store.keystore_path().display());
    Ok(())
}

fn load_keypair(store: &Store, params: &DomainParameters, name: &str) -> Result<KeyPair> {
    let keystore = store.keystore()?;
    let entry = keystore
        .find(name)
        .with_context(|| format!("no key named '{}' in {}", name, store.keystore_path().display()))?;
    entry.keypair(params)
}

pub(crate) fn sign_message(store: &Store, cfg: &Config, key: &str, message: &[u8]) -> Result<SignatureFile> {
    let params = load_params(cfg)?;
    let pair = load_keypair(store, &params, key)?;
    let engine = ElGamalEngine::new(params);
    let digest = cfg.hash.digest(message);
    let signature = engine.sign(pair.private_key(), &digest, &mut rand::thread_rng())?;
    Ok(SignatureFile {
        group: engine.params().fingerprint(),
        hash: cfg.hash,
        public_key: pair.public_key().clone(),
        signature,
    })
}

fn cmd_sign(store: &Store, cfg: &Config, key: &str, message: &[u8], out: Option<PathBuf>) -> Result<()> {
    let file = sign_message(store, cfg, key, message)?;
    let json = serde_json::to_string_pretty(&file)?;
    match out {
        Some(path) => {
            fs::write(&path, json)?;
            println!("signature written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Checks `message` against a signature file. `Ok(false)` means a well-formed
/// signature that does not match.
pub(crate) fn verify_message(
    store: &Store,
    cfg: &Config,
    file: &SignatureFile,
    message: &[u8],
    key: Option<&str>,
) -> Result<bool> {
    let params = load_params(cfg)?;
    if file.group != params.fingerprint() {
        bail!(
            "signature was made in group {}, current parameters are {}",
            file.group,
            params.fingerprint()
        );
    }
    let public_key = match key {
        Some(name) => load_keypair(store, &params, name)?.public_key().clone(),
        None => file.public_key.clone(),
    };
    let engine = ElGamalEngine::new(params);
    let digest = file.hash.digest(message);
    Ok(engine.verify(&public_key, &digest, &file.signature))
}

/// Which public key a verification was checked against. A key taken from the
/// signature file only shows the file is self-consistent, not who signed it.
pub(crate) fn key_source(key: Option<&str>) -> String {
    match key {
        Some(name) => format!("checked against stored key '{}'", name),
        None => "checked against the public key embedded in the signature file; \
                 pass --key <name> to check against a key you trust"
            .to_string(),
    }
}

fn cmd_verify(store: &Store, cfg: &Config, path: &Path, message: &[u8], key: Option<&str>) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let file: SignatureFile =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    let valid = verify_message(store, cfg, &file, message, key)?;
    println!("note: {}", key_source(key));
    if valid {
        println!("Signature valid: true");
        Ok(())
    } else {
        println!("Signature valid: false");
        bail!("signature does not verify")
    }
}

/// End-to-end walk-through. Prints public values only; the private key and
/// the nonce never leave the engine.
pub(crate) fn cmd_demo(cfg: &Config, message: &[u8]) -> Result<()> {
    let params = load_params(cfg)?;
    let engine = ElGamalEngine::new(params);
    let mut rng = rand::thread_rng();

    println!("=== ElGamal Digital Signature with {} ===", cfg.hash);
    print_params(engine.params());

    let pair = engine.generate_keypair(&mut rng)?;
    println!("Public key y: {}", pair.public_key());

    println!("Message: {}", String::from_utf8_lossy(message));
    let digest: MessageDigest = cfg.hash.digest(message);
    println!("{} digest: {}", cfg.hash, digest);

    let signature = engine.sign(pair.private_key(), &digest, &mut rng)?;
    let (r, s) = signature.display_pair();
    println!("Signature (r, s): r={}, s={}", r, s);

    let Some((left, right)) = engine.verification_terms(pair.public_key(), &digest, &signature) else {
        bail!("freshly produced signature is out of range");
    };
    println!("Verification: left={}", format_biguint(&left));
    println!("Verification: right={}", format_biguint(&right));
    let valid = left == right;
    println!("Signature valid: {}", valid);
    if !valid {
        bail!("demo signature failed to verify");
    }
    Ok(())
}
