pub mod handlers;

use clap::Parser;
use packrat_core::error::Result;

use crate::presentation::cli::{Cli, Commands};

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Pack {
            input,
            out,
            chunk_size,
            atomic,
            hash,
        } => handlers::handle_pack(input, out, chunk_size, atomic, hash),
        Commands::Unpack {
            archive,
            dest,
            chunk_size,
        } => handlers::handle_unpack(archive, dest, chunk_size),
        Commands::List { archive } => handlers::handle_list(archive),
        Commands::Verify { archive, hash } => handlers::handle_verify(archive, hash),
    }
}
