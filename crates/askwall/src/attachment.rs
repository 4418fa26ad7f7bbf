//! File attachments held in two fixed slots.
//!
//! The holder only stores what the user picked. Whether the files are sent
//! depends on the active mode and is decided when a request is composed,
//! so switching modes never discards a selection.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

/// File extensions the assistant server knows how to read. Anything else is
/// still uploaded, but the server skips it.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "csv", "xls", "xlsx", "html", "mp3", "mp4", "wav", "avi", "mkv",
    "flv", "mov",
];

/// Fallback MIME type when the extension gives no hint.
const OCTET_STREAM: &str = "application/octet-stream";

/// Errors from loading an attachment.
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("not a file name: {}", .0.display())]
    NoFileName(PathBuf),
}

/// One of the two attachment positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::First, Slot::Second];

    /// Multipart field name the server reads this slot from.
    pub fn field_name(self) -> &'static str {
        match self {
            Slot::First => "uploaded_file1",
            Slot::Second => "uploaded_file2",
        }
    }

    /// 1-based slot number for display.
    pub fn number(self) -> u8 {
        match self {
            Slot::First => 1,
            Slot::Second => 2,
        }
    }

    fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file {}", self.number())
    }
}

// ── Attachment ─────────────────────────────────────────────────────

/// A snapshot of a user-chosen local file.
///
/// The content is read once when the file is picked. Cloning is cheap: the
/// bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl Attachment {
    /// Build an attachment from in-memory content. The MIME type is guessed
    /// from the file name.
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let file_name = file_name.into();
        let bytes: Vec<u8> = bytes.into();
        let mime_type = mime_guess::from_path(&file_name)
            .first_raw()
            .unwrap_or(OCTET_STREAM)
            .to_string();
        Self {
            file_name,
            mime_type,
            bytes: Arc::from(bytes),
        }
    }

    /// Read a file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AttachmentError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| AttachmentError::NoFileName(path.to_path_buf()))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AttachmentError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Loaded attachment {} ({} bytes)", file_name, bytes.len());
        Ok(Self::from_bytes(file_name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercased extension, if the name has one.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    pub fn is_supported_extension(&self) -> bool {
        self.extension()
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

// ── Holder ─────────────────────────────────────────────────────────

/// Zero, one or two attachments, one per [`Slot`].
#[derive(Clone, Debug, Default)]
pub struct AttachmentHolder {
    slots: [Option<Attachment>; 2],
}

impl AttachmentHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the content of `slot`. `None` empties it.
    pub fn set_file(&mut self, slot: Slot, file: Option<Attachment>) {
        if let Some(ref f) = file
            && !f.is_supported_extension()
        {
            warn!(
                "{} has an extension the server does not read; it will be ignored there",
                f.file_name
            );
        }
        self.slots[slot.index()] = file;
    }

    pub fn file(&self, slot: Slot) -> Option<&Attachment> {
        self.slots[slot.index()].as_ref()
    }

    /// Populated slots in slot order.
    pub fn files(&self) -> Vec<(Slot, &Attachment)> {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| self.file(slot).map(|f| (slot, f)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.slots = [None, None];
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn slot_field_names() {
        assert_eq!(Slot::First.field_name(), "uploaded_file1");
        assert_eq!(Slot::Second.field_name(), "uploaded_file2");
        assert_eq!(Slot::Second.to_string(), "file 2");
    }

    #[test]
    fn from_bytes_guesses_mime() {
        let pdf = Attachment::from_bytes("brief.PDF", b"%PDF".to_vec());
        assert_eq!(pdf.mime_type, "application/pdf");
        assert_eq!(pdf.extension().as_deref(), Some("pdf"));
        assert!(pdf.is_supported_extension());

        let odd = Attachment::from_bytes("blob", vec![1, 2, 3]);
        assert_eq!(odd.mime_type, OCTET_STREAM);
        assert!(odd.extension().is_none());
        assert!(!odd.is_supported_extension());
    }

    #[test]
    fn holder_replaces_and_clears_slots() {
        let mut holder = AttachmentHolder::new();
        assert!(holder.is_empty());

        holder.set_file(Slot::Second, Some(Attachment::from_bytes("b.txt", "b")));
        holder.set_file(Slot::First, Some(Attachment::from_bytes("a.txt", "a")));
        let names: Vec<(Slot, &str)> = holder
            .files()
            .into_iter()
            .map(|(s, f)| (s, f.file_name.as_str()))
            .collect();
        assert_eq!(names, vec![(Slot::First, "a.txt"), (Slot::Second, "b.txt")]);

        holder.set_file(Slot::First, Some(Attachment::from_bytes("c.txt", "c")));
        assert_eq!(holder.file(Slot::First).unwrap().file_name, "c.txt");

        holder.set_file(Slot::First, None);
        assert!(holder.file(Slot::First).is_none());
        assert_eq!(holder.files().len(), 1);

        holder.clear();
        assert!(holder.is_empty());
    }

    #[test]
    fn unsupported_extension_is_still_held() {
        let mut holder = AttachmentHolder::new();
        holder.set_file(Slot::First, Some(Attachment::from_bytes("run.exe", "MZ")));
        assert!(holder.file(Slot::First).is_some());
    }

    #[tokio::test]
    async fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"project notes").unwrap();

        let att = Attachment::from_path(&path).await.unwrap();
        assert_eq!(att.file_name, "notes.txt");
        assert_eq!(att.mime_type, "text/plain");
        assert_eq!(&*att.bytes, b"project notes");
    }

    #[tokio::test]
    async fn from_path_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = Attachment::from_path(dir.path().join("nope.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentError::Read { .. }));
        assert!(err.to_string().contains("nope.pdf"));
    }
}
