use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::category::Language;
use crate::design::DesignRecord;
use crate::error::{ScanError, StorageError};

const DESIGN_EXTENSION: &str = "pes";

/// Filesystem adapter: design discovery and category-folder placement.
pub struct DesignStore {
    output_directory: PathBuf,
}

impl DesignStore {
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Recursively finds .pes files (case-insensitive) under `directory`,
    /// in a stable scan order.
    pub fn find_designs(&self, directory: &Path) -> Result<Vec<DesignRecord>, ScanError> {
        if !directory.exists() {
            return Err(ScanError::DirectoryNotFound(directory.to_path_buf()));
        }
        if !directory.is_dir() {
            return Err(ScanError::NotADirectory(directory.to_path_buf()));
        }

        let mut designs = Vec::new();
        for entry in WalkDir::new(directory).sort_by_file_name() {
            let entry = entry.map_err(|e| ScanError::ScanFailed {
                path: directory.to_path_buf(),
                source: e,
            })?;

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            // Don't rediscover already-categorized output
            if path.starts_with(&self.output_directory) {
                continue;
            }

            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                if ext.eq_ignore_ascii_case(DESIGN_EXTENSION) {
                    debug!("Found design: {}", path.display());
                    designs.push(DesignRecord::new(path));
                }
            }
        }

        info!(
            "Found {} designs in {}",
            designs.len(),
            directory.display()
        );
        Ok(designs)
    }

    /// Copies the original design file, plus its preview when present,
    /// into `<output>/<folder-name>/` for the record's category.
    pub fn place_in_category_folder(
        &self,
        record: &DesignRecord,
        language: Language,
    ) -> Result<(), StorageError> {
        let category = record
            .category
            .as_ref()
            .ok_or_else(|| StorageError::MissingCategory(record.name.clone()))?;

        let folder_name = category.folder_name(language);
        let category_dir = self.output_directory.join(folder_name);
        ensure_directory(&category_dir)?;

        copy_into(&record.source_path, &category_dir)?;

        if let Some(ref preview) = record.preview_path {
            if preview.exists() {
                copy_into(preview, &category_dir)?;
                info!(
                    "Files copied: {} (.pes + .jpg) -> {}/",
                    record.name, folder_name
                );
                return Ok(());
            }
        }

        info!("File copied: {} (.pes) -> {}/", record.name, folder_name);
        Ok(())
    }

    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

fn ensure_directory(path: &Path) -> Result<(), StorageError> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

fn copy_into(source: &Path, directory: &Path) -> Result<(), StorageError> {
    let file_name = source
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("design"));
    let destination = directory.join(file_name);

    std::fs::copy(source, &destination).map_err(|e| StorageError::CopyFile {
        from: source.to_path_buf(),
        to: destination.clone(),
        source: e,
    })?;

    debug!("Copied {} -> {}", source.display(), destination.display());
    Ok(())
}
