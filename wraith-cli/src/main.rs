//! WRAITH CLI
//!
//! Command-line interface for Ed25519 stealth payments on Solana and Sui.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wraith_bridge::{poll_until_ready, AttestationClient, AttestationConfig, PollError, Probe};
use wraith_core::cancel::CancelToken;
use wraith_core::traits::{AttestationSource, Indexer, TokioSleeper};
use wraith_core::types::{AttestationStatus, Chain, MetaAddress, StealthBalance};
use wraith_crypto::MetaKeyPair;
use wraith_indexer::{HttpIndexer, IndexerConfig};
use wraith_stealth::{recover_spend_key, scan_balances, StealthPaymentBuilder};
use wraith_withdraw::{select_balances, total_available};

use crate::config::WraithConfig;

/// WRAITH - Ed25519 Stealth Payments
#[derive(Parser)]
#[command(name = "wraith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Chain to operate on (overrides WRAITH_CHAIN)
    #[arg(long, global = true)]
    chain: Option<Chain>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the message your wallet must sign to derive keys
    Message,

    /// Derive meta keys from a wallet signature and PIN
    Keys {
        /// Wallet signature over the key message (hex or base58)
        #[arg(short, long)]
        signature: String,
        /// 4-digit PIN (prompted if omitted)
        #[arg(long)]
        pin: Option<String>,
        /// Indexer id to check the registration against
        #[arg(long)]
        lookup: Option<String>,
        /// Also print the view private key (safe to give to an indexer)
        #[arg(long)]
        show_view_key: bool,
    },

    /// Create a stealth payment
    Pay {
        /// Recipient meta-address (base58) or indexer id
        recipient: String,
        /// Link label bound into the transfer
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Find our payments in a set of balances and recover their keys
    Open {
        /// Wallet signature over the key message (hex or base58)
        #[arg(short, long)]
        signature: String,
        /// 4-digit PIN (prompted if omitted)
        #[arg(long)]
        pin: Option<String>,
        /// JSON file with stealth balances
        #[arg(short, long, conflicts_with = "owner")]
        balances: Option<PathBuf>,
        /// Fetch balances for this indexer id instead
        #[arg(long)]
        owner: Option<String>,
        /// Print one-time private keys
        #[arg(long)]
        reveal: bool,
    },

    /// Show which balances a withdrawal would draw from
    Plan {
        /// Token mint / coin type
        #[arg(short, long)]
        mint: String,
        /// Amount in base units
        #[arg(short, long)]
        amount: u64,
        /// JSON file with stealth balances
        #[arg(short, long, conflicts_with = "owner")]
        balances: Option<PathBuf>,
        /// Fetch balances for this indexer id instead
        #[arg(long)]
        owner: Option<String>,
    },

    /// Wait for a bridge burn to be attested
    Attest {
        /// Source bridge domain
        #[arg(short, long)]
        domain: u32,
        /// Burn transaction hash
        #[arg(short, long)]
        tx: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "wraith=debug,info"
    } else {
        "wraith=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = WraithConfig::from_env()?;
    if let Some(chain) = cli.chain {
        config.chain = chain;
    }

    match cli.command {
        Commands::Message => cmd_message(&config),
        Commands::Keys {
            signature,
            pin,
            lookup,
            show_view_key,
        } => cmd_keys(&config, &signature, pin, lookup.as_deref(), show_view_key).await,
        Commands::Pay { recipient, label } => cmd_pay(&config, &recipient, label).await,
        Commands::Open {
            signature,
            pin,
            balances,
            owner,
            reveal,
        } => {
            let keys = derive_keys(&signature, pin)?;
            let balances = load_balances(&config, balances.as_deref(), owner.as_deref()).await?;
            cmd_open(&keys, balances, reveal)
        }
        Commands::Plan {
            mint,
            amount,
            balances,
            owner,
        } => {
            let balances = load_balances(&config, balances.as_deref(), owner.as_deref()).await?;
            cmd_plan(&balances, &mint, amount)
        }
        Commands::Attest { domain, tx } => cmd_attest(&config, domain, &tx).await,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Accepts `0x`-prefixed hex, bare hex of exactly one signature, or base58.
fn decode_signature(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    let bytes = if let Some(stripped) = trimmed.strip_prefix("0x") {
        hex::decode(stripped).context("signature is not valid hex")?
    } else if trimmed.len() == wraith_core::constants::SIGNATURE_SIZE * 2
        && trimmed.chars().all(|c| c.is_ascii_hexdigit())
    {
        hex::decode(trimmed)?
    } else {
        bs58::decode(trimmed)
            .into_vec()
            .context("signature is neither hex nor base58")?
    };
    if bytes.is_empty() {
        bail!("signature is empty");
    }
    Ok(bytes)
}

fn read_pin(pin: Option<String>) -> Result<String> {
    match pin {
        Some(pin) => Ok(pin),
        None => Password::new()
            .with_prompt("PIN (4 digits)")
            .interact()
            .context("Failed to read PIN"),
    }
}

fn derive_keys(signature: &str, pin: Option<String>) -> Result<MetaKeyPair> {
    let signature = decode_signature(signature)?;
    let pin = read_pin(pin)?;
    MetaKeyPair::derive(&signature, &pin).context("Failed to derive meta keys")
}

fn indexer(config: &WraithConfig) -> Result<HttpIndexer> {
    let url = config
        .indexer_url
        .as_ref()
        .context("WRAITH_INDEXER_URL is not set")?;
    let indexer_config = IndexerConfig::new(url).with_timeout(config.http_timeout_secs);
    Ok(HttpIndexer::with_config(indexer_config)?)
}

async fn load_balances(
    config: &WraithConfig,
    file: Option<&Path>,
    owner: Option<&str>,
) -> Result<Vec<StealthBalance>> {
    match (file, owner) {
        (Some(path), _) => {
            let reader = std::fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            serde_json::from_reader(reader).context("Invalid balances file")
        }
        (None, Some(owner)) => indexer(config)?
            .balances(owner)
            .await
            .context("Failed to fetch balances"),
        (None, None) => bail!("pass --balances <file> or --owner <id>"),
    }
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message.to_string());
    Ok(pb)
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMMANDS
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_message(config: &WraithConfig) -> Result<()> {
    println!(
        "{} {}",
        "✍️  Sign this message with your".cyan().bold(),
        config.chain.as_str().cyan().bold()
    );
    println!("\n{}", config.chain.key_message());
    Ok(())
}

async fn cmd_keys(
    config: &WraithConfig,
    signature: &str,
    pin: Option<String>,
    lookup: Option<&str>,
    show_view_key: bool,
) -> Result<()> {
    println!("{}", "🔑 Deriving WRAITH meta keys...".cyan().bold());
    let keys = derive_keys(signature, pin)?;
    let meta = keys.meta_address();

    if let Some(id) = lookup {
        let record = indexer(config)?
            .lookup_address(id)
            .await
            .with_context(|| format!("Failed to look up {id}"))?;
        let registered = record.meta_address()?;
        keys.check_registration(Some(&registered))
            .context("Derived keys do not match the registration")?;
        println!("   {} {}", "✅ Matches registration for".green(), id);
    }

    println!("\n{}", "Meta-address:".yellow().bold());
    println!("   {}", meta.to_base58());
    println!("   {} {}", "Spend key:".dimmed(), config.chain.format_address(&meta.spend_pub));
    println!("   {} {}", "View key:".dimmed(), config.chain.format_address(&meta.view_pub));

    if show_view_key {
        println!(
            "\n   {} {}",
            "View private key:".yellow(),
            hex::encode(keys.view().secret.as_bytes())
        );
        println!("   It lets the holder see your payments, not spend them.");
    }

    Ok(())
}

async fn cmd_pay(config: &WraithConfig, recipient: &str, label: Option<String>) -> Result<()> {
    println!("{} {}", "💸 Creating stealth payment to:".cyan().bold(), recipient);

    let meta = match MetaAddress::from_base58(recipient) {
        Ok(meta) => meta,
        Err(_) => {
            println!("   Looking up recipient on the indexer...");
            indexer(config)?
                .lookup_address(recipient)
                .await
                .context("Failed to look up recipient")?
                .meta_address()?
        }
    };

    let mut builder = StealthPaymentBuilder::new().recipient(meta);
    if let Some(label) = label {
        builder = builder.label(label);
    }
    let payment = builder.build().context("Failed to create stealth payment")?;

    println!("\n{}", "✅ Stealth payment created:".green().bold());
    println!(
        "   {} {}",
        "Address:".yellow(),
        config.chain.format_address(&payment.stealth_address)
    );
    println!("   {} {}", "Ephemeral key:".dimmed(), payment.ephemeral_pubkey);

    println!("\n{}", "📋 Payment (JSON):".yellow().bold());
    println!("{}", serde_json::to_string_pretty(&payment)?);

    println!("\n{}", "ℹ️  Next steps:".cyan());
    println!("   1. Send funds to the stealth address above");
    println!("   2. Put the envelope hex in the transfer memo");

    Ok(())
}

fn cmd_open(keys: &MetaKeyPair, balances: Vec<StealthBalance>, reveal: bool) -> Result<()> {
    println!("{}", "🔎 Scanning balances...".cyan().bold());

    let (ours, stats) = scan_balances(keys, balances);
    println!(
        "   Scanned {}, found {}, unusable {}",
        stats.total_scanned, stats.discoveries, stats.errors
    );

    if ours.is_empty() {
        println!("\n{}", "No payments found.".yellow());
        return Ok(());
    }

    for balance in &ours {
        let key = recover_spend_key(keys, balance)
            .with_context(|| format!("Failed to recover key for {}", balance.address))?;
        println!(
            "\n   {} {} ({} {})",
            "✅".green(),
            balance.address,
            balance.amount,
            balance.mint
        );
        if reveal {
            println!(
                "      {} {}",
                "One-time key:".red(),
                hex::encode(key.scalar_bytes())
            );
        }
    }

    if reveal {
        println!("\n{}", "⚠️  Anyone holding a one-time key can spend its balance.".red().bold());
    }
    Ok(())
}

fn cmd_plan(balances: &[StealthBalance], mint: &str, amount: u64) -> Result<()> {
    println!(
        "{} {} {}",
        "🧮 Planning withdrawal of".cyan().bold(),
        amount,
        mint
    );
    println!("   Available: {}", total_available(balances, mint));

    let picks = select_balances(balances, mint, amount)?;
    for (i, pick) in picks.iter().enumerate() {
        let drained = if pick.drains_balance() { " (drained)" } else { "" };
        println!(
            "   {}. {} take {} of {}{}",
            i + 1,
            pick.balance.address,
            pick.amount_to_take,
            pick.balance.amount,
            drained.dimmed()
        );
    }
    println!("\n   {} transaction(s), sent one after another.", picks.len());
    Ok(())
}

async fn cmd_attest(config: &WraithConfig, domain: u32, tx: &str) -> Result<()> {
    println!("{} {}", "⏳ Waiting for attestation of".cyan().bold(), tx);

    let client = AttestationClient::with_config(
        AttestationConfig::new(&config.attestation_url).with_timeout(config.http_timeout_secs),
    )?;
    let policy = config.retry_policy();

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let pb = spinner("polling")?;
    let client = Arc::new(client);
    let result = poll_until_ready(&policy, &TokioSleeper, &cancel, |attempt| {
        let client = client.clone();
        let pb = pb.clone();
        let tx = tx.to_string();
        async move {
            pb.set_message(format!("attempt {attempt}/{}", policy.max_attempts));
            Ok(match client.fetch_attestation(domain, &tx).await? {
                AttestationStatus::Pending => Probe::Pending,
                AttestationStatus::Ready(bytes) => Probe::Ready(bytes),
            })
        }
    })
    .await;
    pb.finish_and_clear();

    match result {
        Ok(attestation) => {
            println!("{}", "✅ Attested".green().bold());
            println!("   0x{}", hex::encode(attestation));
            Ok(())
        }
        Err(PollError::Exhausted { attempts, last_error }) => {
            if let Some(e) = last_error {
                println!("   {} {}", "Last error:".dimmed(), e);
            }
            bail!(wraith_core::WraithError::AttestationTimeout {
                source_domain: domain,
                tx_hash: tx.to_string(),
                attempts,
            })
        }
        Err(PollError::Cancelled { attempts }) => {
            bail!("cancelled after {attempts} attempt(s); burn {tx} on domain {domain} is unchanged")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_signature_hex_and_base58() {
        assert_eq!(decode_signature("0xdead").unwrap(), vec![0xde, 0xad]);

        let raw = [7u8; 64];
        assert_eq!(decode_signature(&hex::encode(raw)).unwrap(), raw.to_vec());
        let b58 = bs58::encode(raw).into_string();
        assert_eq!(decode_signature(&b58).unwrap(), raw.to_vec());

        assert!(decode_signature("").is_err());
        assert!(decode_signature("0OIl").is_err());
    }

    #[test]
    fn test_short_hex_alphabet_input_is_base58() {
        // Uses only hex digits but is not a bare 64-byte hex signature
        let input = "beef";
        let expected = bs58::decode(input).into_vec().unwrap();
        assert_eq!(decode_signature(input).unwrap(), expected);
        assert_ne!(expected, vec![0xbe, 0xef]);

        assert!(decode_signature("0xzz").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "wraith", "--chain", "sui", "plan", "--mint", "USDC", "--amount", "7", "--owner", "bob",
        ])
        .unwrap();
        assert_eq!(cli.chain, Some(Chain::Sui));
        assert!(matches!(cli.command, Commands::Plan { amount: 7, .. }));
    }

    #[test]
    fn test_plan_rejects_shortfall() {
        assert!(cmd_plan(&[], "USDC", 1).is_err());
    }
}
