//! # Output Files
//!
//! Naming and backup of the ASCII dump written next to each input.
//!
//! `heap.hprof` is converted to `heap.hprof.txt`. If that file already exists
//! it is renamed to `heap.hprof.txt.prev` first, replacing any older backup.
//! Only one generation is kept.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ConvertError, ConvertResult};

/// Suffix appended to the input path for the ASCII dump.
pub const OUTPUT_SUFFIX: &str = ".txt";

/// Suffix appended to the output path for the previous dump.
pub const BACKUP_SUFFIX: &str = ".prev";

fn with_suffix(path: &Path, suffix: &str) -> PathBuf
{
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Output path for an input file.
#[must_use]
pub fn output_path_for(input: &Path) -> PathBuf
{
    with_suffix(input, OUTPUT_SUFFIX)
}

/// Backup path for an output file.
#[must_use]
pub fn backup_path_for(output: &Path) -> PathBuf
{
    with_suffix(output, BACKUP_SUFFIX)
}

/// Move an existing output file to its backup path.
///
/// Returns the backup path when a file was moved.
///
/// ## Errors
///
/// [`ConvertError::BackupFailed`] when the old backup cannot be removed or the
/// output cannot be renamed. The conversion must not go on in that case, it
/// would overwrite the previous output.
pub fn rotate_existing(output: &Path) -> ConvertResult<Option<PathBuf>>
{
    if !output.exists() {
        return Ok(None);
    }

    let backup = backup_path_for(output);
    let failed = |source| ConvertError::BackupFailed {
        path: output.to_path_buf(),
        source,
    };

    if backup.exists() {
        fs::remove_file(&backup).map_err(failed)?;
    }
    fs::rename(output, &backup).map_err(failed)?;

    info!(output = %output.display(), backup = %backup.display(), "existing output moved to backup");
    Ok(Some(backup))
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_paths()
    {
        let output = output_path_for(Path::new("dumps/heap.hprof"));
        assert_eq!(output, PathBuf::from("dumps/heap.hprof.txt"));
        assert_eq!(backup_path_for(&output), PathBuf::from("dumps/heap.hprof.txt.prev"));
    }

    #[test]
    fn test_rotate_missing_output()
    {
        let path = std::env::temp_dir().join(format!("hprofconv-output-missing-{}.txt", std::process::id()));
        assert!(rotate_existing(&path).unwrap().is_none());
    }

    #[test]
    fn test_rotate_replaces_old_backup()
    {
        let dir = std::env::temp_dir().join(format!("hprofconv-output-rotate-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let output = dir.join("heap.hprof.txt");
        let backup = backup_path_for(&output);

        fs::write(&backup, "oldest").unwrap();
        fs::write(&output, "previous").unwrap();

        assert_eq!(rotate_existing(&output).unwrap(), Some(backup.clone()));
        assert!(!output.exists());
        assert_eq!(fs::read_to_string(&backup).unwrap(), "previous");

        fs::remove_dir_all(&dir).unwrap();
    }
}
