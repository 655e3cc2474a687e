//! Input decoding: archives, directories and loose report files.
//!
//! Every file entry is read fully into memory and decoded as text (invalid
//! UTF-8 is replaced, line endings are normalized). Directory entries inside
//! archives are skipped.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

use report_extract_core::ReportEntry;

use crate::error::{IngestError, Result};

/// Container format of an input path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Directory,
    Zip,
    Tar,
    TarGz,
    /// A single gzip-compressed file.
    Gzip,
    /// Anything else is read as one plain-text report.
    PlainText,
}

impl ArchiveKind {
    /// Detects the kind from the path: directories first, then the file
    /// name suffix (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use report_extract_ingest::ArchiveKind;
    ///
    /// assert_eq!(ArchiveKind::detect("batch.ZIP"), ArchiveKind::Zip);
    /// assert_eq!(ArchiveKind::detect("logs.tar.gz"), ArchiveKind::TarGz);
    /// assert_eq!(ArchiveKind::detect("logs.tgz"), ArchiveKind::TarGz);
    /// assert_eq!(ArchiveKind::detect("unit.log.gz"), ArchiveKind::Gzip);
    /// assert_eq!(ArchiveKind::detect("report.txt"), ArchiveKind::PlainText);
    /// ```
    pub fn detect(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.is_dir() {
            return Self::Directory;
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if name.ends_with(".zip") {
            Self::Zip
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Self::TarGz
        } else if name.ends_with(".tar") {
            Self::Tar
        } else if name.ends_with(".gz") {
            Self::Gzip
        } else {
            Self::PlainText
        }
    }
}

fn decode(name: impl Into<String>, bytes: &[u8]) -> ReportEntry {
    ReportEntry::from_text(name, &String::from_utf8_lossy(bytes))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_zip(path: &Path) -> Result<Vec<ReportEntry>> {
    let mut archive = zip::ZipArchive::new(BufReader::new(File::open(path)?))?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        entries.push(decode(file.name(), &bytes));
    }
    Ok(entries)
}

fn read_tar<R: Read>(reader: R) -> Result<Vec<ReportEntry>> {
    let mut archive = tar::Archive::new(reader);
    let mut entries = Vec::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = entry.path()?.to_string_lossy().into_owned();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        entries.push(decode(name, &bytes));
    }
    Ok(entries)
}

fn read_gzip(path: &Path) -> Result<Vec<ReportEntry>> {
    let mut bytes = Vec::new();
    GzDecoder::new(BufReader::new(File::open(path)?)).read_to_end(&mut bytes)?;
    let name = file_name(path);
    let name = name
        .strip_suffix(".gz")
        .or_else(|| name.strip_suffix(".GZ"))
        .unwrap_or(&name)
        .to_string();
    Ok(vec![decode(name, &bytes)])
}

fn read_directory(path: &Path) -> Result<Vec<ReportEntry>> {
    let mut files = Vec::new();
    for dir_entry in std::fs::read_dir(path)? {
        let dir_entry = dir_entry?;
        if dir_entry.file_type()?.is_file() {
            files.push(dir_entry.path());
        }
    }
    files.sort_by_key(|file| file_name(file));

    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let bytes = std::fs::read(&file)?;
        entries.push(decode(file_name(&file), &bytes));
    }
    Ok(entries)
}

/// Reads every file entry of `path` in archive order (directories: sorted
/// by file name).
///
/// # Errors
///
/// [`IngestError::NotFound`] when the path is missing,
/// [`IngestError::EmptyArchive`] when it holds no file entries, and I/O or
/// container errors when it cannot be decoded.
pub fn read_entries(path: impl AsRef<Path>) -> Result<Vec<ReportEntry>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IngestError::NotFound(path.to_path_buf()));
    }
    let kind = ArchiveKind::detect(path);
    let entries = match kind {
        ArchiveKind::Directory => read_directory(path)?,
        ArchiveKind::Zip => read_zip(path)?,
        ArchiveKind::Tar => read_tar(BufReader::new(File::open(path)?))?,
        ArchiveKind::TarGz => read_tar(GzDecoder::new(BufReader::new(File::open(path)?)))?,
        ArchiveKind::Gzip => read_gzip(path)?,
        ArchiveKind::PlainText => vec![decode(file_name(path), &std::fs::read(path)?)],
    };
    if entries.is_empty() {
        return Err(IngestError::EmptyArchive(path.to_path_buf()));
    }
    debug!(path = %path.display(), kind = ?kind, entries = entries.len(), "Input decoded");
    Ok(entries)
}
