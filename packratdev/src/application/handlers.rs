use packrat_core::error::Result;
use packrat_core::{
    ExtractOptions, HashAlgorithm, PackOptions, ScanOptions, VerifyOptions, extract, list_entries,
    pack_tree, verify,
};
use std::path::PathBuf;

use crate::presentation::cli::HashChoice;

fn algorithm_from(choice: HashChoice) -> HashAlgorithm {
    match choice {
        HashChoice::Blake3 => HashAlgorithm::Blake3,
        HashChoice::Sha256 => HashAlgorithm::Sha256,
    }
}

pub fn handle_pack(
    input: PathBuf,
    out: PathBuf,
    chunk_size: u64,
    atomic: bool,
    hash: HashChoice,
) -> Result<()> {
    let scan_opts = ScanOptions {
        algorithm: algorithm_from(hash),
    };
    let pack_opts = PackOptions { chunk_size, atomic };
    pack_tree(&input, &out, Some(&scan_opts), Some(&pack_opts))?;
    tracing::info!("packed {} into {}", input.display(), out.display());
    Ok(())
}

pub fn handle_unpack(archive: PathBuf, dest: PathBuf, chunk_size: u64) -> Result<()> {
    let opts = ExtractOptions { chunk_size };
    extract(&archive, &dest, Some(&opts))?;
    tracing::info!("unpacked {} into {}", archive.display(), dest.display());
    Ok(())
}

pub fn handle_list(archive: PathBuf) -> Result<()> {
    let entries = list_entries(&archive)?;
    for meta in &entries {
        if meta.is_duplicate() {
            let digest = hex::encode(&meta.hash);
            println!(
                "{}  {} bytes  off={}  dup {}",
                meta.rel_path,
                meta.size,
                meta.data_offset,
                &digest[..digest.len().min(12)]
            );
        } else {
            println!(
                "{}  {} bytes  off={}",
                meta.rel_path, meta.size, meta.data_offset
            );
        }
    }
    Ok(())
}

pub fn handle_verify(archive: PathBuf, hash: HashChoice) -> Result<()> {
    let opts = VerifyOptions {
        algorithm: algorithm_from(hash),
        ..Default::default()
    };
    verify(&archive, Some(&opts))?;
    eprintln!("verify: OK");
    Ok(())
}
