use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "packrat deduplicating archiver", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Closed set of digest choices surfaced on the command line.
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum HashChoice {
    Blake3,
    Sha256,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack a directory tree into an archive, storing duplicate content once
    Pack {
        /// Root directory to scan
        input: PathBuf,
        /// Output archive path
        out: PathBuf,

        /// Copy buffer size in bytes (0 = 4 MiB default)
        #[arg(long, default_value_t = 0)]
        chunk_size: u64,

        /// Stage to a temp file and rename into place on success
        #[arg(long)]
        atomic: bool,

        /// Content digest algorithm
        #[arg(long, value_enum, default_value = "blake3")]
        hash: HashChoice,
    },

    /// Restore the full tree from an archive
    Unpack {
        archive: PathBuf,
        dest: PathBuf,

        /// Copy buffer size in bytes (0 = 4 MiB default)
        #[arg(long, default_value_t = 0)]
        chunk_size: u64,
    },

    /// List archive contents without extracting
    List { archive: PathBuf },

    /// Check data ranges and re-hash stored duplicate content
    Verify {
        archive: PathBuf,

        /// Digest algorithm the archive was packed with
        #[arg(long, value_enum, default_value = "blake3")]
        hash: HashChoice,
    },
}
