//! Interactive menus on top of the same commands the flags expose.

use anyhow::Result;
use elsig_crypto::HashAlgorithm;
use inquire::{Confirm, CustomType, Select, Text};
use std::{fs, io, path::PathBuf};

use crate::store::{load_params, Config, Store};
use crate::{cmd_demo, generate_key, key_source, print_params, sign_message, verify_message, SignatureFile, DEMO_MESSAGE};

pub fn run(store: &Store, mut cfg: Config) -> Result<()> {
    loop {
        let group = load_params(&cfg)
            .map(|p| format!("{}-bit group {}", p.bits(), p.fingerprint()))
            .unwrap_or_else(|_| "no parameters".to_string());
        let title = format!("elsig  •  {}  •  hash: {}", group, cfg.hash);
        let choice = Select::new(
            &title,
            vec!["Keys", "Sign message", "Verify signature", "Demo", "Settings", "Quit"],
        )
        .prompt()?;

        let outcome = match choice {
            "Keys" => tui_keys(store, &cfg),
            "Sign message" => tui_sign(store, &cfg),
            "Verify signature" => tui_verify(store, &cfg),
            "Demo" => cmd_demo(&cfg, DEMO_MESSAGE.as_bytes()),
            "Settings" => tui_settings(store, &mut cfg),
            "Quit" => break,
            _ => Ok(()),
        };
        if let Err(e) = outcome {
            eprintln!("Error: {e:#}");
        }
        wait_enter()?;
    }
    Ok(())
}

fn tui_keys(store: &Store, cfg: &Config) -> Result<()> {
    let ks = store.keystore()?;
    let mut items: Vec<String> = ks.keys.iter().map(|k| k.label()).collect();
    items.push("➕  Create new".into());
    items.push("⬅️  Back".into());

    let choice = Select::new("Keys", items).prompt()?;
    if choice.starts_with('➕') {
        let name = Text::new("Name for key:").with_default("default").prompt()?;
        let entry = generate_key(store, cfg, name)?;
        println!("Created key. Public key: {}", entry.public_key);
    } else if let Some(idx) = ks.index_from_label(&choice) {
        let entry = &ks.keys[idx];
        println!("Name: {}", entry.name);
        println!("Group: {}", entry.group);
        println!("Public key: {}", entry.public_key);
        let delete = Confirm::new("Delete this key?").with_default(false).prompt()?;
        if delete {
            let mut ks2 = ks.clone();
            ks2.remove(&entry.name);
            store.save_keystore(&ks2)?;
            println!("Deleted.");
        }
    }
    Ok(())
}

fn pick_key(store: &Store) -> Result<Option<String>> {
    let ks = store.keystore()?;
    if ks.keys.is_empty() {
        println!("No keys yet. Create one first.");
        return Ok(None);
    }
    let labels: Vec<String> = ks.keys.iter().map(|k| k.label()).collect();
    let sel = Select::new("Choose key", labels).prompt()?;
    Ok(ks.index_from_label(&sel).map(|i| ks.keys[i].name.clone()))
}

fn tui_sign(store: &Store, cfg: &Config) -> Result<()> {
    let Some(key) = pick_key(store)? else {
        return Ok(());
    };
    let message = Text::new("Message:").prompt()?;
    let file = sign_message(store, cfg, &key, message.as_bytes())?;
    let (r, s) = file.signature.display_pair();
    println!("Signature (r, s): r={}, s={}", r, s);

    let path: String = Text::new("Save signature to (empty to skip):").prompt()?;
    if !path.trim().is_empty() {
        fs::write(path.trim(), serde_json::to_string_pretty(&file)?)?;
        println!("Saved.");
    }
    Ok(())
}

fn tui_verify(store: &Store, cfg: &Config) -> Result<()> {
    let path = Text::new("Signature file:").prompt()?;
    let file: SignatureFile = serde_json::from_str(&fs::read_to_string(path.trim())?)?;
    let message = Text::new("Message:").prompt()?;
    let key = pick_key(store)?;
    let valid = verify_message(store, cfg, &file, message.as_bytes(), key.as_deref())?;
    println!("note: {}", key_source(key.as_deref()));
    println!("Signature valid: {}", valid);
    Ok(())
}

fn tui_settings(store: &Store, cfg: &mut Config) -> Result<()> {
    let current_params = cfg
        .params_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "unset".to_string());
    let choice = Select::new(
        "Settings",
        vec![
            format!("Set parameter file (current: {})", current_params),
            format!("Set hash (current: {})", cfg.hash),
            format!("Set primality rounds (current: {})", cfg.primality_rounds),
            format!("Set minimum prime bits (current: {})", cfg.min_prime_bits),
            "Back".into(),
        ],
    )
    .prompt()?;
    match choice.as_str() {
        s if s.starts_with("Set parameter file") => {
            let path = Text::new("Path to parameter JSON:").prompt()?;
            let path = PathBuf::from(path.trim());
            let params = crate::store::read_params(&path, &cfg.policy())?;
            print_params(&params);
            cfg.params_path = Some(path);
        }
        s if s.starts_with("Set hash") => {
            cfg.hash = Select::new("Hash:", HashAlgorithm::ALL.to_vec()).prompt()?;
        }
        s if s.starts_with("Set primality rounds") => {
            cfg.primality_rounds = CustomType::new("Miller–Rabin rounds:")
                .with_default(cfg.primality_rounds)
                .prompt()?;
        }
        s if s.starts_with("Set minimum prime bits") => {
            cfg.min_prime_bits = CustomType::new("Minimum bits:")
                .with_default(cfg.min_prime_bits)
                .prompt()?;
        }
        _ => return Ok(()),
    }
    store.save_config(cfg)?;
    println!("Saved.");
    Ok(())
}

fn wait_enter() -> io::Result<()> {
    use std::io::Write;
    print!("Press ENTER to continue…");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(())
}
