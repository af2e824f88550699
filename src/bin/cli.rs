use clap::{Parser, Subcommand};
use prefstore::PrefStore;
use std::env;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the preference file (falls back to PREFSTORE_FILE)
    #[arg(short, long)]
    file: Option<String>,

    /// Passphrase for encrypted values (falls back to PREFSTORE_PASSPHRASE)
    #[arg(short, long)]
    passphrase: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Print the string value for a key
    Get { key: String, #[arg(default_value = "")] default: String },
    /// Print the integer value for a key
    GetInt { key: String, #[arg(default_value_t = 0)] default: i32 },
    /// Print the float value for a key
    GetFloat { key: String, #[arg(default_value_t = 0.0)] default: f32 },
    /// Store a string value
    Set { key: String, value: String, #[arg(short, long)] encrypt: bool },
    /// Store an integer value
    SetInt { key: String, value: i32, #[arg(short, long)] encrypt: bool },
    /// Store a float value
    SetFloat { key: String, value: f32, #[arg(short, long)] encrypt: bool },
    /// Delete a key
    Del { key: String },
    /// Check whether a key exists
    Has { key: String },
    /// List all stored keys
    Dump,
    /// Remove every record and persist the empty store
    Clear,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let file = cli
        .file
        .or_else(|| env::var("PREFSTORE_FILE").ok())
        .unwrap_or_else(|| "prefs.json".to_string());
    let passphrase = cli
        .passphrase
        .or_else(|| env::var("PREFSTORE_PASSPHRASE").ok())
        .unwrap_or_default();

    let mut store = PrefStore::open(&file, &passphrase)?;

    match cli.command {
        Commands::Get { key, default } => {
            println!("{}", store.get_string(&key, &default)?);
        }
        Commands::GetInt { key, default } => {
            println!("{}", store.get_int(&key, default)?);
        }
        Commands::GetFloat { key, default } => {
            println!("{}", store.get_float(&key, default)?);
        }
        Commands::Set { key, value, encrypt } => {
            store.set_string(&key, &value, encrypt);
            store.save()?;
            println!("OK");
        }
        Commands::SetInt { key, value, encrypt } => {
            store.set_int(&key, value, encrypt);
            store.save()?;
            println!("OK");
        }
        Commands::SetFloat { key, value, encrypt } => {
            store.set_float(&key, value, encrypt);
            store.save()?;
            println!("OK");
        }
        Commands::Del { key } => {
            store.delete_key(&key);
            store.save()?;
            println!("OK");
        }
        Commands::Has { key } => {
            println!("{}", store.has_key(&key));
        }
        Commands::Dump => {
            for record in store.records() {
                if record.encrypt {
                    println!("{} (encrypted)", record.key);
                } else {
                    println!("{} = {}", record.key, record.value);
                }
            }
        }
        Commands::Clear => {
            store.clear_and_persist()?;
            println!("OK");
        }
    }

    Ok(())
}
