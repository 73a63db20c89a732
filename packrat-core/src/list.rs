use crate::container::record::FileMeta;
use crate::error::Result;
use crate::read::extract::load_index;
use std::fs::File;
use std::path::Path;

/// Decode the metadata index without touching any file data.
pub fn list_entries(archive: &Path) -> Result<Vec<FileMeta>> {
    let mut f = File::open(archive)?;
    let (records, _) = load_index(&mut f)?;
    Ok(records)
}
