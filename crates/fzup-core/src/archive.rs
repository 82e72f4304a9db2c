//! SDK archive extraction.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use crate::error::Result;

/// Extract a zip archive into `dest`, creating it if needed.
///
/// Entry paths are sanitized via `enclosed_name`; entries that would
/// escape the destination are skipped. Unix permission bits recorded in
/// the archive are restored.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    debug!(
        "extracting {} to {}",
        archive_path.display(),
        dest.display()
    );
    std::fs::create_dir_all(dest)?;

    let reader = BufReader::new(File::open(archive_path)?);
    let mut archive = zip::ZipArchive::new(reader)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        let out_path = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => continue,
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
        } else {
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out_file = File::create(&out_path)?;
            std::io::copy(&mut entry, &mut out_file)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    let _ = std::fs::set_permissions(
                        &out_path,
                        std::fs::Permissions::from_mode(mode),
                    );
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_zip(path: &Path) {
        let mut file = File::create(path).expect("create zip file");
        let mut zip = zip::ZipWriter::new(&mut file);
        let options = zip::write::SimpleFileOptions::default();

        zip.add_directory("scripts/", options).expect("add dir");
        zip.start_file("sdk_symbols.csv", options)
            .expect("start file");
        zip.write_all(b"entry,name\n").expect("write entry");
        zip.start_file("scripts/fzup", options).expect("start file");
        zip.write_all(b"#!/bin/sh\n").expect("write entry");
        zip.finish().expect("finish zip");
    }

    #[test]
    fn extracts_nested_entries() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("sdk.zip");
        write_test_zip(&archive);

        let dest = temp.path().join("current");
        extract_zip(&archive, &dest).unwrap();

        assert!(dest.join("sdk_symbols.csv").is_file());
        assert!(dest.join("scripts").join("fzup").is_file());
    }

    #[test]
    fn invalid_archive_fails() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("broken.zip");
        std::fs::write(&archive, b"not a zip").unwrap();

        assert!(extract_zip(&archive, &temp.path().join("out")).is_err());
    }
}
