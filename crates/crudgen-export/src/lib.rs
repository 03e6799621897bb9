//! Packaging for crudgen output.
//!
//! Turns the emitted file list into the final [`Artifact`]:
//! - `FILES_ONLY`: the emitted files unchanged
//! - `COMPLETE_PROJECT`: emitted files plus framework bootstrap files,
//!   also written into a ZIP archive

pub mod archive;
pub mod bootstrap;
pub mod templates;

use std::collections::HashSet;

use tracing::info;

use crudgen_core::{Framework, GeneratedFile, GenerationType, PackagingError};

pub use archive::{write_archive, ArchiveOptions, Compression};
pub use bootstrap::{bootstrap_files, BootstrapData};
pub use templates::TemplateEngine;

/// Inputs the packager needs besides the files themselves.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    pub package_name: String,
    pub framework: Framework,
    /// Entity count reported back to the caller.
    pub class_count: usize,
    pub archive: ArchiveOptions,
}

/// The packaged result of one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub files: Vec<GeneratedFile>,
    /// ZIP bytes, present for complete projects.
    pub archive: Option<Vec<u8>>,
    pub class_count: usize,
    pub message: String,
}

/// Package emitted files according to `mode`.
pub fn package(
    files: Vec<GeneratedFile>,
    mode: GenerationType,
    options: &PackageOptions,
) -> Result<Artifact, PackagingError> {
    let artifact = match mode {
        GenerationType::FilesOnly => {
            check_unique(&files)?;
            let message = format!(
                "Generated {} files for {} classes ({})",
                files.len(),
                options.class_count,
                options.framework
            );
            Artifact {
                files,
                archive: None,
                class_count: options.class_count,
                message,
            }
        }
        GenerationType::CompleteProject => {
            let data = BootstrapData::new(&options.package_name, options.class_count);
            let mut files = files;
            files.extend(bootstrap_files(options.framework, &data)?);
            check_unique(&files)?;

            let archive = write_archive(&files, &options.archive)?;
            let message = format!(
                "Generated {} project with {} files for {} classes",
                options.framework,
                files.len(),
                options.class_count
            );
            Artifact {
                files,
                archive: Some(archive),
                class_count: options.class_count,
                message,
            }
        }
    };

    info!(
        framework = %options.framework,
        mode = ?mode,
        files = artifact.files.len(),
        "packaged output"
    );
    Ok(artifact)
}

fn check_unique(files: &[GeneratedFile]) -> Result<(), PackagingError> {
    let mut seen = HashSet::with_capacity(files.len());
    for file in files {
        if !seen.insert(file.relative_path.as_str()) {
            return Err(PackagingError::DuplicatePath {
                path: file.relative_path.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudgen_core::Language;

    fn options(framework: Framework) -> PackageOptions {
        PackageOptions {
            package_name: "com.example.shop".into(),
            framework,
            class_count: 1,
            archive: ArchiveOptions::default(),
        }
    }

    fn emitted() -> Vec<GeneratedFile> {
        vec![GeneratedFile::new(
            "src/main/java/com/example/shop/entity/Product.java",
            "package com.example.shop.entity;\n",
            Language::Java,
        )]
    }

    #[test]
    fn test_files_only_passes_through() {
        let artifact = package(emitted(), GenerationType::FilesOnly, &options(Framework::SpringBoot)).unwrap();
        assert_eq!(artifact.files, emitted());
        assert!(artifact.archive.is_none());
        assert_eq!(artifact.class_count, 1);
        assert!(artifact.message.contains("1 files"));
    }

    #[test]
    fn test_complete_project_adds_bootstrap_and_archive() {
        let artifact = package(emitted(), GenerationType::CompleteProject, &options(Framework::SpringBoot)).unwrap();
        let paths: Vec<_> = artifact.files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(paths[0], "src/main/java/com/example/shop/entity/Product.java");
        assert!(paths.contains(&"pom.xml"));
        assert!(paths.contains(&"src/main/java/com/example/shop/Application.java"));

        let bytes = artifact.archive.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), artifact.files.len());
    }

    #[test]
    fn test_duplicate_emitted_path() {
        let mut files = emitted();
        files.extend(emitted());
        let err = package(files, GenerationType::FilesOnly, &options(Framework::SpringBoot)).unwrap_err();
        assert!(matches!(err, PackagingError::DuplicatePath { .. }));
    }

    #[test]
    fn test_emitted_file_collides_with_bootstrap() {
        let files = vec![GeneratedFile::new("run.py", "", Language::Python)];
        let err = package(files, GenerationType::CompleteProject, &options(Framework::Flask)).unwrap_err();
        assert!(matches!(err, PackagingError::DuplicatePath { ref path } if path == "run.py"));
    }
}
