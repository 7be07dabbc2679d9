use std::path::{Path, PathBuf};

/// Error raised while converting notebooks.
///
/// Every variant that touches the filesystem carries the offending path so
/// a failed batch can be diagnosed from the message alone.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: invalid notebook JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{}: failed to write image: {source}", path.display())]
    Image {
        path: PathBuf,
        source: png::EncodingError,
    },

    #[error("{}: failed to load font: {message}", path.display())]
    Font { path: PathBuf, message: String },

    #[error("no usable font found (pass one with --font)")]
    NoFont,

    #[error("invalid color {0:?}: expected #rrggbb")]
    InvalidColor(String),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("no .{} files found in {}", crate::pipeline::NOTEBOOK_EXTENSION, .0.display())]
    NoNotebooks(PathBuf),

    /// A failure while rendering one code cell.
    #[error("{}: cell {cell}: {source}", path.display())]
    Cell {
        path: PathBuf,
        cell: usize,
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Attach notebook path and cell index to an error raised for that cell.
    pub fn in_cell(self, path: impl AsRef<Path>, cell: usize) -> Self {
        Error::Cell {
            path: path.as_ref().to_path_buf(),
            cell,
            source: Box::new(self),
        }
    }

    /// Render the error for the terminal (with ANSI color codes when `color` is true)
    pub fn render(&self, color: bool) -> String {
        let red = if color { "\x1b[1;31m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };
        format!("{}error:{} {}\n", red, reset, self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
