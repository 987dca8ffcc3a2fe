use chaosvault::cli::{
    decrypt_file, encrypt_file, show_info, verify_file, DecryptOptions, EncryptOptions,
};
use chaosvault::{fingerprint, VaultError, DEFAULT_CHUNK_SIZE};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Version info from build.rs
const VERSION: &str = env!("CHAOSVAULT_VERSION");
const BUILD: &str = env!("CHAOSVAULT_BUILD");
const PROFILE: &str = env!("CHAOSVAULT_PROFILE");
const GIT_HASH: &str = env!("CHAOSVAULT_GIT_HASH");

/// Default file extension for envelopes
const ENVELOPE_EXTENSION: &str = ".cvlt";

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "chaosvault")]
#[command(author, about = "Password-seeded chaotic-map cipher container", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file into an envelope
    #[command(alias = "e")]
    Encrypt {
        /// Password for the envelope
        #[arg(long, env = "CHAOSVAULT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Input file to encrypt
        input: PathBuf,

        /// Output envelope (defaults to <INPUT>.cvlt)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Bytes processed between progress reports
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Report progress on stderr
        #[arg(long)]
        progress: bool,
    },

    /// Decrypt an envelope
    #[command(alias = "d")]
    Decrypt {
        /// Password for the envelope
        #[arg(long, env = "CHAOSVAULT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Input envelope
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Bytes processed between progress reports
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Report progress on stderr
        #[arg(long)]
        progress: bool,
    },

    /// Check password and integrity without writing plaintext
    Verify {
        /// Password for the envelope
        #[arg(long, env = "CHAOSVAULT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Envelope to check
        file: PathBuf,
    },

    /// Show information about an envelope
    #[command(alias = "i")]
    Info {
        /// Envelope to inspect
        file: PathBuf,
    },

    /// Print the fingerprint of a password
    Fingerprint {
        #[arg(long, env = "CHAOSVAULT_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

fn default_output_path(input: &Path) -> PathBuf {
    let mut os = input.as_os_str().to_os_string();
    os.push(ENVELOPE_EXTENSION);
    PathBuf::from(os)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chaosvault=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    if cli.version {
        println!("chaosvault {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if let Err(e) = Cli::command().print_help() {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    let result = match command {
        Commands::Encrypt {
            password,
            input,
            output,
            chunk_size,
            progress,
        } => {
            let options = EncryptOptions {
                password,
                chunk_size,
                progress,
            };
            let output_path = output.unwrap_or_else(|| default_output_path(&input));

            encrypt_file(&input, &output_path, &options).map(|header| {
                println!(
                    "Encrypted {} bytes to {} (id {})",
                    header.original_size,
                    output_path.display(),
                    header.id
                );
            })
        }

        Commands::Decrypt {
            password,
            input,
            output,
            chunk_size,
            progress,
        } => {
            let options = DecryptOptions {
                password,
                chunk_size,
                progress,
            };
            decrypt_file(&input, &output, &options).map(|written| {
                println!("Decrypted {} bytes to {}", written, output.display());
            })
        }

        Commands::Verify { password, file } => verify_file(&file, &password).map(|header| {
            println!("{}: OK (id {})", file.display(), header.id);
        }),

        Commands::Info { file } => show_info(&file).map(|info| print!("{}", info)),

        Commands::Fingerprint { password } => {
            println!("{}", fingerprint(&password));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Rejections are collapsed to one message; the specific kind only goes to the log.
fn report_error(e: &VaultError) {
    if e.is_rejection() {
        tracing::debug!(kind = %e, "rejected");
    }
    eprintln!("Error: {}", e.public_message());
}
