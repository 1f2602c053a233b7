//! `license-seal` command-line tool.
//!
//! ```text
//! license-seal keygen   --out-dir dist/ --key-dir keys/
//! license-seal issue    --major 2 --minor 0 --expire 2030-01-01 --out-dir dist/ --key-dir keys/
//! license-seal sign     --private-key keys/private.key --out dist/license.data --major 2 ...
//! license-seal validate --root dist/ --app-version 3.1.4
//! ```

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use license_seal::{
    ArtifactPaths, FileStorage, KeyGenConfig, LicenseIssuer, LicenseTerms, LicenseValidator,
    TermValue, ValidationContext,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about = "Issue and validate signed offline licenses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a key pair only.
    Keygen {
        /// Directory receiving public.key.
        #[arg(long)]
        out_dir: PathBuf,
        /// Directory receiving private.key; must differ from --out-dir.
        #[arg(long)]
        key_dir: PathBuf,
        #[command(flatten)]
        secret: Secret,
    },
    /// Generate a key pair and sign a license with it.
    Issue {
        #[command(flatten)]
        terms: TermsArgs,
        /// Directory receiving public.key and license.data.
        #[arg(long)]
        out_dir: PathBuf,
        /// Directory receiving private.key; must differ from --out-dir.
        #[arg(long)]
        key_dir: PathBuf,
        #[command(flatten)]
        secret: Secret,
    },
    /// Sign a license with an existing private key.
    Sign {
        #[command(flatten)]
        terms: TermsArgs,
        /// Private key to sign with.
        #[arg(long)]
        private_key: PathBuf,
        /// Where to write the signed license.
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        secret: Secret,
    },
    /// Validate public.key + license.data and print the result as JSON.
    Validate {
        /// Directory holding public.key and license.data.
        #[arg(long)]
        root: PathBuf,
        /// Version of the application being licensed.
        #[arg(long, default_value = "")]
        app_version: String,
    },
}

#[derive(Debug, Args)]
struct TermsArgs {
    /// Licensed major version.
    #[arg(long)]
    major: String,
    /// Licensed minor version.
    #[arg(long)]
    minor: String,
    /// Expiry date, e.g. 2030-01-01.
    #[arg(long)]
    expire: String,
    /// Extra attribute as key=value; the value is read as JSON when it parses.
    #[arg(long = "field", value_name = "KEY=VALUE")]
    fields: Vec<String>,
}

impl TermsArgs {
    fn into_terms(self) -> Result<LicenseTerms> {
        let mut terms = LicenseTerms::new(self.major, self.minor, self.expire);
        for field in &self.fields {
            let Some((key, value)) = field.split_once('=') else {
                bail!("field '{}' is not in key=value form", field);
            };
            terms = terms.with_field(key.trim(), TermValue::parse_lenient(value));
        }
        Ok(terms)
    }
}

#[derive(Debug, Args)]
struct Secret {
    /// Passphrase protecting the private key.
    #[arg(long, env = "LICENSE_SEAL_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,
}

impl Secret {
    fn key_gen_config(self) -> KeyGenConfig {
        KeyGenConfig {
            passphrase: self.passphrase,
            ..KeyGenConfig::default()
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen {
            out_dir,
            key_dir,
            secret,
        } => {
            let issuer = LicenseIssuer::new(FileStorage::new(), secret.key_gen_config())?;
            let key_pair = issuer
                .issue_key_pair(&ArtifactPaths::new(out_dir, key_dir))
                .context("key generation failed")?;
            println!("{}", key_pair.key_id());
        }
        Commands::Issue {
            terms,
            out_dir,
            key_dir,
            secret,
        } => {
            let terms = terms.into_terms()?;
            let issuer = LicenseIssuer::new(FileStorage::new(), secret.key_gen_config())?;
            let issued = issuer
                .issue(&terms, &ArtifactPaths::new(out_dir, key_dir))
                .context("license issuance failed")?;
            println!("{}", issued.key_pair.key_id());
        }
        Commands::Sign {
            terms,
            private_key,
            out,
            secret,
        } => {
            let terms = terms.into_terms()?;
            let issuer = LicenseIssuer::new(FileStorage::new(), secret.key_gen_config())?;
            issuer
                .sign_with_stored_key(&terms, &private_key, &out)
                .context("license signing failed")?;
        }
        Commands::Validate { root, app_version } => {
            let validator = LicenseValidator::new(FileStorage::new());
            let result = validator.validate_in(
                &ArtifactPaths::in_dir(&root),
                &ValidationContext::new(app_version),
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.success {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
