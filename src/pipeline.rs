//! Batch conversion of a notebook folder into student versions.
//!
//! Notebooks are processed one at a time: read, render every code cell,
//! rewrite, save. The first failure aborts the batch; a half-converted
//! folder is easier to notice than a silently skipped notebook.

use crate::error::{Error, Result};
use crate::layout::layout_cell;
use crate::notebook::{Cell, Notebook};
use crate::render::CellRenderer;
use crate::style::Style;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Where to read notebooks from and how to name what gets written.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: PathBuf,
    pub image_dir: PathBuf,
    /// Directory prefix used in the markdown image links, relative to the notebook
    pub link_dir: String,
    /// Replacement source for every code cell
    pub placeholder: String,
    /// Appended to the notebook stem for the student version
    pub suffix: String,
}

impl Config {
    /// Images go to `codeimg/` inside the input folder, matching the links.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        let input_dir = input_dir.into();
        Self {
            image_dir: input_dir.join("codeimg"),
            input_dir,
            link_dir: "codeimg".to_string(),
            placeholder: "# 代码练习区...\n\n".to_string(),
            suffix: "_学员版".to_string(),
        }
    }

    pub fn with_image_dir(mut self, image_dir: impl Into<PathBuf>) -> Self {
        self.image_dir = image_dir.into();
        self
    }

    pub fn with_link_dir(mut self, link_dir: impl Into<String>) -> Self {
        self.link_dir = link_dir.into();
        self
    }
}

/// What one notebook produced
#[derive(Debug, Clone, PartialEq)]
pub struct NotebookReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub images: Vec<PathBuf>,
}

/// What a whole run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub notebooks: Vec<NotebookReport>,
}

impl Summary {
    pub fn image_count(&self) -> usize {
        self.notebooks.iter().map(|n| n.images.len()).sum()
    }
}

/// Notebooks directly inside `dir`, sorted by path. Symlinks are followed.
/// Student versions written by an earlier run (stem ending in `suffix`) are
/// left out.
pub fn list_notebooks(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    let mut notebooks = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            Error::io(&path, e.into())
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != NOTEBOOK_EXTENSION) {
            continue;
        }
        let is_student_version = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.ends_with(suffix));
        if is_student_version {
            debug!(path = %path.display(), "skipping student version");
            continue;
        }
        notebooks.push(path.to_path_buf());
    }

    notebooks.sort();
    Ok(notebooks)
}

/// `{stem}_cell_{index}.png`, spaces in the stem replaced by `_`.
pub fn image_name(stem: &str, cell_index: usize) -> String {
    format!("{}_cell_{}.png", stem.replace(' ', "_"), cell_index)
}

/// `{stem}{suffix}.ipynb` next to the original.
pub fn student_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    path.with_file_name(format!("{}{}.{}", stem, suffix, NOTEBOOK_EXTENSION))
}

fn notebook_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Render every code cell of `notebook` into `config.image_dir`.
///
/// Returns the image file names in cell order. `path` is only used for
/// naming and error context.
pub fn convert_code_cells_to_images<R: CellRenderer + ?Sized>(
    notebook: &Notebook,
    path: &Path,
    config: &Config,
    style: &Style,
    renderer: &mut R,
) -> Result<Vec<String>> {
    let stem = notebook_stem(path);
    let mut names = Vec::new();

    for (index, cell) in notebook.cells.iter().enumerate() {
        if !cell.is_code() {
            continue;
        }
        let layout = layout_cell(&cell.source, style);
        let name = image_name(&stem, index);
        let image_path = config.image_dir.join(&name);
        renderer
            .render(&layout, style, &image_path)
            .map_err(|e| e.in_cell(path, index))?;
        debug!(cell = index, lines = layout.line_count(), image = %image_path.display(), "rendered code cell");
        names.push(name);
    }

    Ok(names)
}

/// Put an image-link cell above every code cell and blank the code cell.
///
/// `image_names` pairs with the code cells in order.
pub fn studentize(mut notebook: Notebook, image_names: &[String], config: &Config) -> Notebook {
    let with_ids = notebook.uses_cell_ids();
    let original = std::mem::take(&mut notebook.cells);
    let mut taken: HashSet<String> = original.iter().filter_map(|c| c.id.clone()).collect();
    let mut names = image_names.iter();
    let mut cells = Vec::with_capacity(original.len() + image_names.len());

    for mut cell in original {
        if cell.is_code() {
            if let Some(name) = names.next() {
                let link = format!("![]({}/{})", config.link_dir.trim_end_matches('/'), name);
                let id = with_ids.then(|| {
                    let id = fresh_id(&format!("codeimg-{}", cells.len()), &taken);
                    taken.insert(id.clone());
                    id
                });
                cells.push(Cell::markdown(link, id));
            }
            cell.source = config.placeholder.clone();
        }
        cells.push(cell);
    }

    notebook.cells = cells;
    notebook
}

/// `base`, or `base-N` for the smallest N not in `taken`.
fn fresh_id(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (1usize..)
        .map(|n| format!("{}-{}", base, n))
        .find(|id| !taken.contains(id))
        .unwrap_or_else(|| base.to_string())
}

/// Drives a whole folder through a renderer.
pub struct Pipeline<R> {
    config: Config,
    style: Style,
    renderer: R,
}

impl<R: CellRenderer> Pipeline<R> {
    pub fn new(config: Config, style: Style, renderer: R) -> Self {
        Self {
            config,
            style,
            renderer,
        }
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Nothing is created on disk unless the input folder holds at least one notebook.
    pub fn run(&mut self) -> Result<Summary> {
        let input_dir = &self.config.input_dir;
        let notebooks = list_notebooks(input_dir, &self.config.suffix)?;
        if notebooks.is_empty() {
            return Err(Error::NoNotebooks(input_dir.clone()));
        }
        info!(count = notebooks.len(), dir = %input_dir.display(), "found notebooks");

        let image_dir = &self.config.image_dir;
        std::fs::create_dir_all(image_dir).map_err(|e| Error::io(image_dir, e))?;

        let mut summary = Summary::default();
        for path in notebooks {
            summary.notebooks.push(self.process_notebook(&path)?);
        }
        Ok(summary)
    }

    pub fn process_notebook(&mut self, path: &Path) -> Result<NotebookReport> {
        info!(path = %path.display(), "processing notebook");
        let notebook = Notebook::from_path(path)?;
        let names = convert_code_cells_to_images(&notebook, path, &self.config, &self.style, &mut self.renderer)?;
        let student = studentize(notebook, &names, &self.config);

        let output = student_path(path, &self.config.suffix);
        student.write_to(&output)?;
        info!(path = %output.display(), images = names.len(), "wrote student version");

        Ok(NotebookReport {
            source: path.to_path_buf(),
            output,
            images: names.iter().map(|n| self.config.image_dir.join(n)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::CellType;
    use serde_json::Map;

    fn code(source: &str) -> Cell {
        Cell {
            cell_type: CellType::Code,
            id: None,
            metadata: Map::new(),
            source: source.to_string(),
            extra: Map::new(),
        }
    }

    fn notebook(cells: Vec<Cell>, minor: u32) -> Notebook {
        Notebook {
            cells,
            metadata: Map::new(),
            nbformat: 4,
            nbformat_minor: minor,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_image_name() {
        assert_eq!(image_name("lesson 1", 3), "lesson_1_cell_3.png");
        assert_eq!(image_name("第一课", 0), "第一课_cell_0.png");
    }

    #[test]
    fn test_student_path() {
        assert_eq!(
            student_path(Path::new("/work/lesson 1.ipynb"), "_学员版"),
            PathBuf::from("/work/lesson 1_学员版.ipynb")
        );
    }

    #[test]
    fn test_studentize_inserts_links() {
        let config = Config::new("/work");
        let nb = notebook(
            vec![Cell::markdown("intro", None), code("x = 1"), code("y = 2")],
            2,
        );
        let names = vec!["n_cell_1.png".to_string(), "n_cell_2.png".to_string()];
        let out = studentize(nb, &names, &config);

        let summary: Vec<(CellType, &str)> = out.cells.iter().map(|c| (c.cell_type, c.source.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (CellType::Markdown, "intro"),
                (CellType::Markdown, "![](codeimg/n_cell_1.png)"),
                (CellType::Code, "# 代码练习区...\n\n"),
                (CellType::Markdown, "![](codeimg/n_cell_2.png)"),
                (CellType::Code, "# 代码练习区...\n\n"),
            ]
        );
        assert!(out.cells.iter().all(|c| c.id.is_none()));
    }

    #[test]
    fn test_studentize_keeps_outputs() {
        let config = Config::new("/work");
        let mut cell = code("print(1)");
        cell.extra.insert("execution_count".to_string(), 7.into());
        let out = studentize(notebook(vec![cell], 2), &["a.png".to_string()], &config);
        assert_eq!(out.cells[1].extra["execution_count"], 7);
    }

    #[test]
    fn test_studentize_assigns_unique_ids() {
        let config = Config::new("/work");
        let mut first = code("a");
        first.id = Some("codeimg-0".to_string());
        let nb = notebook(vec![first, code("b")], 5);
        let names = vec!["a.png".to_string(), "b.png".to_string()];
        let out = studentize(nb, &names, &config);

        let ids: Vec<&str> = out.cells.iter().filter_map(|c| c.id.as_deref()).collect();
        assert_eq!(ids, vec!["codeimg-0-1", "codeimg-0", "codeimg-2"]);
    }

    #[test]
    fn test_link_dir_trailing_slash() {
        let config = Config::new("/work").with_link_dir("img/");
        let out = studentize(notebook(vec![code("x")], 2), &["x.png".to_string()], &config);
        assert_eq!(out.cells[0].source, "![](img/x.png)");
    }

    #[test]
    fn test_list_notebooks_rejects_file() {
        let err = list_notebooks(Path::new("/nonexistent-dir-for-test"), "_学员版").unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));
    }
}
