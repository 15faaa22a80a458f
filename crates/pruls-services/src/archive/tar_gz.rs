use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::{ArchiveError, Archiver};

/// gzip-compressed tarball. The source directory appears in the archive under
/// its own name, e.g. `/srv/data/a.txt` is stored as `data/a.txt`.
#[derive(Debug, Clone, Copy)]
pub struct TarGzArchiver {
    compression: Compression,
}

impl Default for TarGzArchiver {
    fn default() -> Self {
        TarGzArchiver {
            compression: Compression::default(),
        }
    }
}

impl TarGzArchiver {
    pub fn new(level: u32) -> Self {
        TarGzArchiver {
            compression: Compression::new(level),
        }
    }
}

#[async_trait]
impl Archiver for TarGzArchiver {
    async fn create_archive(
        &self,
        source_dir: &Path,
        output_path: &Path,
    ) -> Result<(), ArchiveError> {
        let source = source_dir.to_path_buf();
        let output = output_path.to_path_buf();
        let compression = self.compression;
        let start = Instant::now();

        let size = tokio::task::spawn_blocking(move || {
            ensure_output_outside_source(&source, &output)?;
            write_tar_gz(&source, &output, compression)
        })
        .await
        .map_err(|e| ArchiveError::Task(e.to_string()))??;

        tracing::info!(
            path = %output_path.display(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Archive created"
        );

        Ok(())
    }
}

/// Writing the archive into the tree being archived would make it include
/// its own partial contents.
fn ensure_output_outside_source(source_dir: &Path, output_path: &Path) -> Result<(), ArchiveError> {
    let parent = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let (Ok(source), Ok(parent)) = (source_dir.canonicalize(), parent.canonicalize()) else {
        // Missing paths surface as I/O errors when the archive is written.
        return Ok(());
    };
    if parent.starts_with(&source) {
        return Err(ArchiveError::OutputInsideSource {
            output: output_path.to_path_buf(),
            source_dir: source_dir.to_path_buf(),
        });
    }
    Ok(())
}

fn entry_root(source_dir: &Path) -> PathBuf {
    source_dir
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn write_tar_gz(
    source_dir: &Path,
    output_path: &Path,
    compression: Compression,
) -> Result<u64, ArchiveError> {
    let finalize_err = |source: io::Error| ArchiveError::Finalize {
        path: output_path.to_path_buf(),
        source,
    };

    let file = File::create(output_path).map_err(|source| ArchiveError::Create {
        path: output_path.to_path_buf(),
        source,
    })?;

    let encoder = GzEncoder::new(BufWriter::new(file), compression);
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    builder
        .append_dir_all(entry_root(source_dir), source_dir)
        .map_err(|source| ArchiveError::Append {
            path: source_dir.to_path_buf(),
            source,
        })?;

    // into_inner writes the tar end-of-archive blocks.
    let encoder = builder.into_inner().map_err(finalize_err)?;
    let writer = encoder.finish().map_err(finalize_err)?;
    let file = writer
        .into_inner()
        .map_err(|e| finalize_err(e.into_error()))?;
    file.sync_all().map_err(finalize_err)?;

    let size = file.metadata().map_err(finalize_err)?.len();
    Ok(size)
}
