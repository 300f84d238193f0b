use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use eip712_core::eip712::{self, PrivateKey, TypedData};
use eip712_core::types::{EncodeResponse, HashResponse, SignResponse, TypeSignatureResponse};
use eip712_core::utils::config::EncodingSettings;
use eip712_core::utils::crypto::to_hex_prefixed;
use eip712_core::utils::logging;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use zeroize::Zeroize;

const LOG_MODULE: &str = "cli";

#[derive(Parser)]
#[command(name = "eip712", version, about = "EIP-712 typed data encoding, hashing and signing")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Enforce fixed array lengths and a tighter depth limit
    #[arg(long, global = true)]
    strict: bool,

    /// Maximum struct/array nesting depth
    #[arg(long, value_name = "N", global = true)]
    max_depth: Option<usize>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct Input {
    /// Typed-data JSON document (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the signable payload parts as hex
    Encode {
        #[command(flatten)]
        input: Input,
    },
    /// Print the digest, domain separator and message hash
    Hash {
        #[command(flatten)]
        input: Input,
    },
    /// Sign the digest with a secp256k1 private key
    Sign {
        #[command(flatten)]
        input: Input,
        /// Hex private key, `0x` prefix optional
        #[arg(long, env = "EIP712_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },
    /// Print the canonical type string and type hash of a struct
    TypeSignature {
        #[command(flatten)]
        input: Input,
        /// Struct to render (defaults to the document's primaryType)
        #[arg(long, value_name = "TYPE")]
        type_name: Option<String>,
    },
    /// Check the document's schema without hashing it
    Validate {
        #[command(flatten)]
        input: Input,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        logging::enable_debug();
    }
    let settings = settings(&cli);

    match cli.cmd {
        Command::Encode { input } => {
            let typed_data = read_typed_data(&input)?;
            let payload = eip712::encode_typed_data_with_settings(&typed_data, &settings)?;
            print_json(&EncodeResponse::from(&payload))
        }
        Command::Hash { input } => {
            let typed_data = read_typed_data(&input)?;
            let payload = eip712::encode_typed_data_with_settings(&typed_data, &settings)?;
            print_json(&HashResponse::from(&payload))
        }
        Command::Sign { input, mut private_key } => {
            let typed_data = read_typed_data(&input)?;
            let parsed_key = PrivateKey::from_hex(&private_key);
            private_key.zeroize();
            let private_key = parsed_key?;
            let hash = eip712::hash_typed_data_with_settings(&typed_data, &settings)?;
            let signature = eip712::sign_hash(&hash, &private_key)?;
            eip712_core::log_info!(LOG_MODULE, "signed typed data", primary_type = typed_data.primary_type);
            print_json(&SignResponse::new(&signature, &hash))
        }
        Command::TypeSignature { input, type_name } => {
            let typed_data = read_typed_data(&input)?;
            let type_name = type_name.unwrap_or_else(|| typed_data.primary_type.clone());
            let type_signature = eip712::encode_type(&type_name, &typed_data.types)?;
            let type_hash = eip712_core::keccak256(type_signature.as_bytes());
            print_json(&TypeSignatureResponse {
                type_name,
                type_signature,
                type_hash: to_hex_prefixed(&type_hash),
            })
        }
        Command::Validate { input } => {
            let typed_data = read_typed_data(&input)?;
            typed_data.validate()?;
            println!("valid");
            Ok(())
        }
    }
}

fn settings(cli: &Cli) -> EncodingSettings {
    let mut settings = if cli.strict {
        EncodingSettings::strict()
    } else {
        EncodingSettings::from_env()
    };
    if let Some(depth) = cli.max_depth {
        settings = settings.with_max_depth(depth);
    }
    for warning in settings.validate() {
        eip712_core::log_warn!(LOG_MODULE, "encoding settings", warning = warning);
    }
    settings
}

fn read_typed_data(input: &Input) -> anyhow::Result<TypedData> {
    let payload = match &input.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };
    Ok(TypedData::from_json(&payload)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
