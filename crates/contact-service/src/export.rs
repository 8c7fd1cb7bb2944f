use crate::csv_codec::write_contacts;
use crate::error::ServiceError;
use core_types::Contact;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use tempfile::NamedTempFile;

/// A CSV export spooled to a temporary file.
///
/// The file is deleted when this value is dropped, whether the export was
/// consumed, abandoned, or an error occurred after it was created.
#[derive(Debug)]
pub struct CsvExport {
    file: NamedTempFile,
    rows: usize,
}

impl CsvExport {
    /// Serializes `contacts` into a fresh temporary file.
    pub(crate) fn write(contacts: &[Contact]) -> Result<Self, ServiceError> {
        let mut file = tempfile::Builder::new()
            .prefix("contacts.")
            .suffix(".csv")
            .tempfile()?;
        write_contacts(file.as_file_mut(), contacts)?;
        Ok(Self { file, rows: contacts.len() })
    }

    /// Number of contact rows, excluding the header.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Location of the spooled file while this value is alive.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Opens an independent read handle positioned at the start of the file.
    ///
    /// The handle stays readable only while this value is alive; keep the
    /// export next to it until the last byte is read.
    pub fn reopen(&self) -> io::Result<File> {
        self.file.reopen()
    }

    /// Reads the whole export once and releases the temporary file.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, ServiceError> {
        let handle = self.file.as_file_mut();
        handle.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        handle.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}
