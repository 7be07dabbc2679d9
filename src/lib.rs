//! Student versions of Jupyter notebooks.
//!
//! Every code cell of a notebook is rendered as a syntax-highlighted PNG,
//! an image-link cell is inserted above it, and the code cell itself is
//! blanked to a practice placeholder.
//!
//! ```no_run
//! use nb_student::{Config, Pipeline, PngRenderer, Style};
//!
//! let config = Config::new("lessons");
//! let mut pipeline = Pipeline::new(config, Style::default(), PngRenderer::discover()?);
//! let summary = pipeline.run()?;
//! println!("{} images", summary.image_count());
//! # Ok::<(), nb_student::Error>(())
//! ```

pub mod error;
pub mod layout;
pub mod notebook;
pub mod pipeline;
pub mod preview;
pub mod render;
pub mod style;

pub use error::{Error, Result};
pub use layout::{CellLayout, Fragment, LineLayout, TokenClass, dump_cell, layout_cell, layout_line};
pub use notebook::{Cell, CellType, Notebook};
pub use pipeline::{Config, NotebookReport, Pipeline, Summary};
pub use render::{CellRenderer, PageGeometry, PngRenderer};
pub use style::{Color, Palette, Style};
