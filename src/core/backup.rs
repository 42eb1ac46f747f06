use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{confirm, info, success};
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the database file to `dest_file`, optionally zipping it.
    /// Returns the path of the file actually written.
    pub fn backup(
        pool: &mut DbPool,
        db_path: &str,
        dest_file: &str,
        compress: bool,
        force: bool,
    ) -> AppResult<Option<PathBuf>> {
        let src = Path::new(db_path);
        let dest = Path::new(dest_file);

        // 1️⃣ Check DB exists
        if !src.exists() {
            return Err(AppError::NotFound(format!(
                "database {}",
                src.display()
            )));
        }

        // 2️⃣ Ensure destination folder exists
        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // 3️⃣ Final file: the zip replaces the plain copy when compressing
        let final_path = if compress {
            dest.with_extension("zip")
        } else {
            dest.to_path_buf()
        };
        if final_path == src {
            return Err(AppError::InvalidArgument(format!(
                "backup file {} is the database itself",
                final_path.display()
            )));
        }

        // 4️⃣ If destination file exists → ask confirmation
        if final_path.exists()
            && !force
            && !confirm(&format!(
                "The file '{}' already exists. Overwrite it?",
                final_path.display()
            ))
        {
            info("Backup cancelled by user.");
            return Ok(None);
        }

        // 5️⃣ Copy or compress straight from the database file
        if compress {
            let entry = src
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "database.sqlite".to_string());
            zip_single_file(src, &final_path, &entry)?;
            println!("📦 Compressed: {}", final_path.display());
        } else {
            fs::copy(src, &final_path)?;
        }
        success(format!("Backup created: {}", final_path.display()));

        // 6️⃣ Log in DB
        ttlog(
            &pool.conn,
            "backup",
            &final_path.to_string_lossy(),
            if compress {
                "Backup created and compressed"
            } else {
                "Backup created"
            },
        )?;

        Ok(Some(final_path))
    }
}

/// Write `src` into a new zip archive at `zip_path` as a single deflated entry.
pub fn zip_single_file(src: &Path, zip_path: &Path, entry_name: &str) -> AppResult<()> {
    if src == zip_path {
        return Err(AppError::InvalidArgument(format!(
            "cannot zip {} onto itself",
            src.display()
        )));
    }

    let file = fs::File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut f = fs::File::open(src)?;
    zip.start_file(entry_name, options)
        .map_err(std::io::Error::other)?;

    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;

    Ok(())
}
