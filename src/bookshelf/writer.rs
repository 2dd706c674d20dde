//! Bookshelf `.pl` writer.

use std::path::Path;

use super::records::PlRecord;
use crate::error::{PlacerError, Result};

/// Format placement records as a Bookshelf `.pl` document.
///
/// Coordinates use Rust's shortest round-trip float formatting, so reading
/// the output back gives the exact same values.
pub fn write_pl(records: &[PlRecord]) -> String {
    let mut out = String::from("UCLA pl 1.0\n\n");
    for record in records {
        let fixed = if record.fixed { " /FIXED" } else { "" };
        out.push_str(&format!("{}\t{}\t{}\t: N{}\n", record.id, record.x, record.y, fixed));
    }
    out
}

/// Write placement records to a `.pl` file.
pub fn write_pl_file(path: &Path, records: &[PlRecord]) -> Result<()> {
    std::fs::write(path, write_pl(records)).map_err(|e| PlacerError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
