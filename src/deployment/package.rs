use crate::configuration::PackageEntry;
use std::fs::{self, File};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

#[derive(thiserror::Error, Debug)]
pub enum PackageError {
    #[error("Package entry {} does not exist", .0.display())]
    MissingEntry(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

/// A zip archive ready to be uploaded as function code.
#[derive(Debug)]
pub struct DeploymentPackage {
    path: PathBuf,
    size_bytes: u64,
}

impl DeploymentPackage {
    #[tracing::instrument(
        name = "Creating deployment package",
        skip_all,
        fields(path = %path.display())
    )]
    pub fn build(path: &Path, entries: &[PackageEntry]) -> Result<Self, PackageError> {
        // Nothing is written unless every entry can be found.
        if let Some(missing) = entries.iter().find(|entry| !entry.source.exists()) {
            return Err(PackageError::MissingEntry(missing.source.clone()));
        }

        let mut zip = ZipWriter::new(File::create(path)?);
        for entry in entries {
            let options = entry_options(entry.executable);
            tracing::info!(source = %entry.source.display(), name = %entry.name, "Adding to archive");
            if entry.source.is_dir() {
                add_directory(&mut zip, &entry.source, &entry.name, options)?;
            } else {
                add_file(&mut zip, &entry.source, &entry.name, options)?;
            }
        }
        zip.finish()?;

        let size_bytes = fs::metadata(path)?.len();
        let package = Self {
            path: path.to_path_buf(),
            size_bytes,
        };
        tracing::info!(
            bytes = package.size_bytes,
            megabytes = %package.size_megabytes(),
            "Created deployment package"
        );

        Ok(package)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn size_megabytes(&self) -> String {
        format!("{:.2}", self.size_bytes as f64 / BYTES_PER_MEGABYTE)
    }

    /// The `--zip-file` argument the CLI expects for a local archive.
    pub fn zip_file_arg(&self) -> String {
        format!("fileb://{}", self.path.display())
    }
}

/// Delete a package left on disk, returning whether there was one.
pub fn remove_package(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

fn entry_options(executable: bool) -> FileOptions {
    let mode = if executable { 0o755 } else { 0o644 };
    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9))
        .unix_permissions(mode)
}

fn add_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    source: &Path,
    name: &str,
    options: FileOptions,
) -> Result<(), PackageError> {
    zip.start_file(name, options)?;
    let mut file = File::open(source)?;
    std::io::copy(&mut file, zip)?;
    Ok(())
}

fn add_directory<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    source: &Path,
    name: &str,
    options: FileOptions,
) -> Result<(), PackageError> {
    let prefix = name.trim_end_matches('/');
    zip.add_directory(prefix, options.unix_permissions(0o755))?;

    let mut children = fs::read_dir(source)?.collect::<Result<Vec<_>, _>>()?;
    children.sort_by_key(|child| child.file_name());
    for child in children {
        let child_name = format!("{}/{}", prefix, child.file_name().to_string_lossy());
        let child_path = child.path();
        if child_path.is_dir() {
            add_directory(zip, &child_path, &child_name, options)?;
        } else {
            add_file(zip, &child_path, &child_name, options)?;
        }
    }
    Ok(())
}
