//! File kind detection for desktop entries

use std::fs::Metadata;
use std::path::Path;

/// Broad file category, used to pick a themed icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Folder,
    Symlink,
    Executable,
    Image,
    Document,
    Archive,
    Video,
    Audio,
    File,
}

impl FileKind {
    /// Classify `path`. `metadata` comes from `symlink_metadata` so links
    /// are recognised as links.
    pub fn detect(path: &Path, metadata: Option<&Metadata>) -> Self {
        if let Some(metadata) = metadata {
            if metadata.file_type().is_symlink() {
                return FileKind::Symlink;
            }
            if metadata.is_dir() {
                return FileKind::Folder;
            }
        }

        if let Some(kind) = Self::from_extension(path) {
            return kind;
        }
        if let Some(kind) = Self::from_mime(path) {
            return kind;
        }

        #[cfg(unix)]
        if let Some(metadata) = metadata {
            use std::os::unix::fs::PermissionsExt;
            if metadata.permissions().mode() & 0o111 != 0 {
                return FileKind::Executable;
            }
        }

        FileKind::File
    }

    fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        let kind = match ext.as_str() {
            "sh" | "bash" | "zsh" | "fish" | "py" | "rb" | "pl" | "desktop" => FileKind::Executable,
            "zip" | "tar" | "gz" | "bz2" | "xz" | "7z" | "rar" | "zst" => FileKind::Archive,
            "md" | "rst" | "odt" | "doc" | "docx" => FileKind::Document,
            _ => return None,
        };
        Some(kind)
    }

    fn from_mime(path: &Path) -> Option<Self> {
        let mime = mime_guess::from_path(path).first()?;
        let kind = match (mime.type_().as_str(), mime.subtype().as_str()) {
            ("image", _) => FileKind::Image,
            ("video", _) => FileKind::Video,
            ("audio", _) => FileKind::Audio,
            ("text", _) | ("application", "pdf") => FileKind::Document,
            _ => return None,
        };
        Some(kind)
    }

    /// Icon name in the freedesktop naming scheme
    pub fn icon_name(&self) -> &'static str {
        match self {
            FileKind::Folder => "folder",
            FileKind::Symlink => "emblem-symbolic-link",
            FileKind::Executable => "application-x-executable",
            FileKind::Image => "image-x-generic",
            FileKind::Document => "x-office-document",
            FileKind::Archive => "package-x-generic",
            FileKind::Video => "video-x-generic",
            FileKind::Audio => "audio-x-generic",
            FileKind::File => "text-x-generic",
        }
    }

    /// Sort bucket: folders first
    pub fn sort_priority(&self) -> i32 {
        match self {
            FileKind::Folder => 0,
            _ => 1,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            FileKind::Folder => "Folder",
            FileKind::Symlink => "Link",
            FileKind::Executable => "Program",
            FileKind::Image => "Image",
            FileKind::Document => "Document",
            FileKind::Archive => "Archive",
            FileKind::Video => "Video",
            FileKind::Audio => "Audio",
            FileKind::File => "File",
        }
    }
}
