use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use zeroize::Zeroizing;

use bmpstego::config::CURRENT_VERSION;
use bmpstego::{blob, secure_fs, CarrierLayout, EmbedOptions};

#[derive(Parser)]
#[command(
    name = "bmpstego",
    version,
    about = "Hide password-protected messages in the pixel bytes of BMP images.",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a message and embed it into a carrier image
    Embed {
        /// Path to carrier image
        #[arg(long)]
        carrier: PathBuf,

        /// Output image
        #[arg(long)]
        out: PathBuf,

        /// Message to embed (mutually exclusive with --input; read from stdin if neither)
        #[arg(long, conflicts_with = "input")]
        message: Option<String>,

        /// File whose contents are the message
        #[arg(long)]
        input: Option<PathBuf>,

        /// Password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Extract and decrypt a message from a carrier image
    Extract {
        /// Path to carrier image
        #[arg(long)]
        carrier: PathBuf,

        /// Write the message here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show how large a message a carrier can hold
    Capacity {
        /// Path to carrier image
        #[arg(long)]
        carrier: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Print the structure of an embedded blob as JSON (no password needed)
    Inspect {
        /// Path to carrier image
        #[arg(long)]
        carrier: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

#[derive(Args)]
struct LayoutArgs {
    /// Carrier header bytes to skip (default: 54, the classic BMP header)
    #[arg(long, conflicts_with = "legacy_offset")]
    header_len: Option<usize>,

    /// Skip 55 bytes, matching images written by the legacy web encoder
    #[arg(long, default_value_t = false)]
    legacy_offset: bool,

    /// Protocol version selecting the key-derivation parameters
    #[arg(long, default_value_t = CURRENT_VERSION)]
    protocol: u8,
}

impl LayoutArgs {
    fn options(&self) -> Result<EmbedOptions> {
        let layout = match (self.header_len, self.legacy_offset) {
            (Some(n), _) => CarrierLayout::with_header_len(n),
            (None, true) => CarrierLayout::legacy(),
            (None, false) => CarrierLayout::bmp(),
        };
        Ok(EmbedOptions::for_version(self.protocol, layout)?)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Embed {
            carrier,
            out,
            message,
            input,
            password,
            layout,
        } => {
            let password = get_password(password)?;
            let message = get_message(message, input.as_deref())?;
            cmd_embed(&carrier, &out, &message, &password, &layout.options()?)
        }

        Commands::Extract {
            carrier,
            out,
            password,
            layout,
        } => {
            let password = get_password(password)?;
            cmd_extract(&carrier, out.as_deref(), &password, &layout.options()?)
        }

        Commands::Capacity { carrier, layout } => cmd_capacity(&carrier, &layout.options()?),

        Commands::Inspect { carrier, layout } => cmd_inspect(&carrier, &layout.options()?),
    }
}

fn get_password(password: Option<String>) -> Result<Zeroizing<String>> {
    let p = match password {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ")?,
    };
    Ok(Zeroizing::new(p))
}

fn get_message(message: Option<String>, input: Option<&Path>) -> Result<Zeroizing<Vec<u8>>> {
    if let Some(m) = message {
        return Ok(Zeroizing::new(m.into_bytes()));
    }
    if let Some(p) = input {
        let bytes = std::fs::read(p).with_context(|| format!("read input file: {}", p.display()))?;
        return Ok(Zeroizing::new(bytes));
    }
    if atty::is(atty::Stream::Stdin) {
        bail!("Provide one of --message or --input, or pipe the message on stdin.");
    }
    let mut buf = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buf)
        .context("read message from stdin")?;
    Ok(Zeroizing::new(buf))
}

fn read_carrier(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read carrier file: {}", path.display()))
}

fn cmd_embed(
    carrier_path: &Path,
    out_path: &Path,
    message: &[u8],
    password: &str,
    opts: &EmbedOptions,
) -> Result<()> {
    let carrier = read_carrier(carrier_path)?;

    let out = bmpstego::hide(&carrier, message, password.as_bytes(), opts).context("embed failed")?;

    secure_fs::write_atomic(out_path, &out, false)
        .with_context(|| format!("write output image: {}", out_path.display()))?;

    info!(
        "embedded {} message bytes into {} (header {} bytes)",
        message.len(),
        out_path.display(),
        opts.layout.header_len
    );
    println!("OK: embedded {} bytes", message.len());
    println!("Wrote: {}", out_path.display());
    Ok(())
}

fn cmd_extract(
    carrier_path: &Path,
    out_path: Option<&Path>,
    password: &str,
    opts: &EmbedOptions,
) -> Result<()> {
    let carrier = read_carrier(carrier_path)?;

    let Some(message) = bmpstego::reveal(&carrier, password.as_bytes(), opts) else {
        bail!("No message recovered (wrong password, corrupted image, or nothing embedded).");
    };

    match out_path {
        Some(p) => {
            secure_fs::write_atomic(p, &message, true)
                .with_context(|| format!("write extracted message: {}", p.display()))?;
            println!("OK: extracted {} bytes", message.len());
            println!("Wrote: {}", p.display());
        }
        None => println!("{}", String::from_utf8_lossy(&message)),
    }
    Ok(())
}

fn cmd_capacity(carrier_path: &Path, opts: &EmbedOptions) -> Result<()> {
    let carrier = read_carrier(carrier_path)?;
    let raw = bmpstego::stego::lsb::capacity(carrier.len(), &opts.layout);
    let max_msg = bmpstego::max_message_len(carrier.len(), opts);
    let ceiling = blob::max_embeddable_len(blob::SEAL_ATTEMPTS);

    println!("Capacity for: {}", carrier_path.display());
    println!("  File size:     {} bytes", carrier.len());
    println!("  Header skip:   {} bytes", opts.layout.header_len);
    println!("  Raw payload:   {} bytes (1 bit per carrier byte)", raw);
    println!(
        "  Message max:   {} bytes (after {} bytes salt+iv+tag)",
        max_msg,
        opts.cipher.overhead()
    );
    println!("  Seal ceiling:  {} bytes (zero-free ciphertext)", ceiling);
    if max_msg == ceiling {
        println!("  NOTE: Message size is limited by sealing, not by the carrier.");
    }
    if max_msg == 0 {
        println!("  NOTE: Carrier is too small for any message.");
    }
    Ok(())
}

fn cmd_inspect(carrier_path: &Path, opts: &EmbedOptions) -> Result<()> {
    let carrier = read_carrier(carrier_path)?;
    let Some(summary) = bmpstego::inspect(&carrier, opts) else {
        bail!("Carrier does not hold enough bytes for a ciphertext header.");
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
