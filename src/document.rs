//! Document assembly.
//!
//! Wraps rendered rows into one of three outputs: bare table rows, a
//! `tikztimingtable` graphic, or a standalone LaTeX document. Templates are
//! plain values handed to the assembler; placeholders are substituted
//! textually.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::Result;
use crate::model::WaveformModel;
use crate::render::{Renderer, RenderOptions, Rendering};
use crate::vwf;

/// Placeholder for the table rows in the graphic template.
pub const ROWS_PLACEHOLDER: &str = "{rows}";
/// Placeholder for the `\extracode` block in the graphic template.
pub const EXTRACODE_PLACEHOLDER: &str = "{extracode}";
/// Placeholder for the graphic in the document template.
pub const GRAPHIC_PLACEHOLDER: &str = "{graphic}";

const GRAPHIC_TEMPLATE: &str = r"\begin{tikztimingtable}[
  timing/slope=0.2,
  timing/rowdist=3ex,
  timing/coldist=1ex,
  timing/d/text/.style={font=\scriptsize},
]
{rows}
{extracode}\end{tikztimingtable}
";

const DOCUMENT_TEMPLATE: &str = r"\documentclass[tikz,border=5pt]{standalone}
\usepackage{tikz-timing}
\begin{document}
{graphic}\end{document}
";

/// Output flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Rows to embed in a caller-supplied `tikztimingtable`
    Rows,
    /// A complete `tikztimingtable` environment
    #[default]
    Graphic,
    /// A standalone LaTeX document
    Document,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rows" => Ok(Self::Rows),
            "graphic" => Ok(Self::Graphic),
            "document" => Ok(Self::Document),
            other => Err(format!("unknown output mode '{}'", other)),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rows => "rows",
            Self::Graphic => "graphic",
            Self::Document => "document",
        })
    }
}

/// Wrapping templates for the graphic and document modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    /// Must contain `{rows}` and `{extracode}`
    pub graphic: String,
    /// Must contain `{graphic}`
    pub document: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            graphic: GRAPHIC_TEMPLATE.to_string(),
            document: DOCUMENT_TEMPLATE.to_string(),
        }
    }
}

/// The `\extracode` block: grid, help lines and global fragments.
///
/// Empty when there is nothing to draw.
pub fn extracode(rendering: &Rendering) -> String {
    let mut lines = Vec::new();
    if rendering.grid {
        lines.push("\\tablegrid".to_string());
    }
    if !rendering.help_lines.is_empty() {
        let positions: Vec<String> = rendering.help_lines.iter().map(u64::to_string).collect();
        lines.push(format!("\\vertlines[help lines]{{{}}}", positions.join(",")));
    }
    lines.extend(rendering.extra_global.iter().cloned());

    if lines.is_empty() {
        return String::new();
    }
    let mut out = String::from("\\extracode\n");
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Assemble rendered rows into the requested output.
pub fn assemble(rendering: &Rendering, mode: OutputMode, templates: &Templates) -> String {
    let rows = rendering.rows.join("\n");
    let extra = extracode(rendering);

    match mode {
        OutputMode::Rows => format!("{}\n{}", rows, extra),
        OutputMode::Graphic => graphic(&rows, &extra, templates),
        OutputMode::Document => templates
            .document
            .replace(GRAPHIC_PLACEHOLDER, &graphic(&rows, &extra, templates)),
    }
}

fn graphic(rows: &str, extra: &str, templates: &Templates) -> String {
    templates
        .graphic
        .replace(ROWS_PLACEHOLDER, rows)
        .replace(EXTRACODE_PLACEHOLDER, extra)
}

/// Convert VWF text with custom templates.
pub fn render_vwf_with(
    text: &str,
    options: &RenderOptions,
    mode: OutputMode,
    templates: &Templates,
) -> Result<String> {
    let ast = vwf::parse(text)?;
    debug!(sections = ast.sections.len(), "parsed waveform file");

    let model = WaveformModel::from_ast(&ast, options)?;
    let rendering = Renderer::new(&model, options).render()?;
    Ok(assemble(&rendering, mode, templates))
}

/// Convert VWF text to tikz-timing output.
///
/// Either the whole output is produced or an error is returned.
pub fn render_vwf(text: &str, options: &RenderOptions, mode: OutputMode) -> Result<String> {
    render_vwf_with(text, options, mode, &Templates::default())
}

/// Convert a VWF file and write the result to `output`.
#[cfg(feature = "cli")]
pub fn convert_file(
    input: &std::path::Path,
    output: &std::path::Path,
    options: &RenderOptions,
    mode: OutputMode,
) -> Result<()> {
    use crate::error::VwfError;

    let text = std::fs::read_to_string(input).map_err(|source| VwfError::FileReadError {
        path: input.display().to_string(),
        source,
    })?;
    let rendered = render_vwf(&text, options, mode)?;
    std::fs::write(output, rendered).map_err(|source| VwfError::FileWriteError {
        path: output.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendering() -> Rendering {
        Rendering {
            rows: vec!["a & 2L \\\\".to_string(), "b & 2H \\\\".to_string()],
            help_lines: vec![1, 3],
            grid: true,
            extra_global: vec!["\\draw (0,0) -- (1,1);".to_string()],
        }
    }

    #[test]
    fn test_extracode() {
        assert_eq!(
            extracode(&rendering()),
            "\\extracode\n\\tablegrid\n\\vertlines[help lines]{1,3}\n\\draw (0,0) -- (1,1);\n"
        );

        let plain = Rendering {
            help_lines: Vec::new(),
            grid: false,
            extra_global: Vec::new(),
            ..rendering()
        };
        assert_eq!(extracode(&plain), "");
    }

    #[test]
    fn test_rows_mode() {
        let out = assemble(&rendering(), OutputMode::Rows, &Templates::default());
        assert!(out.starts_with("a & 2L \\\\\nb & 2H \\\\\n\\extracode\n"));
        assert!(!out.contains("tikztimingtable"));
    }

    #[test]
    fn test_graphic_and_document_modes() {
        let templates = Templates::default();
        let graphic = assemble(&rendering(), OutputMode::Graphic, &templates);
        assert!(graphic.starts_with("\\begin{tikztimingtable}"));
        assert!(graphic.contains("a & 2L \\\\\nb & 2H \\\\\n\\extracode"));
        assert!(graphic.ends_with("\\end{tikztimingtable}\n"));

        let document = assemble(&rendering(), OutputMode::Document, &templates);
        assert!(document.starts_with("\\documentclass"));
        assert!(document.contains(&graphic));
        assert!(document.ends_with("\\end{document}\n"));
    }

    #[test]
    fn test_custom_templates() {
        let templates = Templates {
            graphic: "<{rows}|{extracode}>".to_string(),
            document: "[{graphic}]".to_string(),
        };
        let plain = Rendering {
            rows: vec!["r".to_string()],
            help_lines: Vec::new(),
            grid: false,
            extra_global: Vec::new(),
        };
        assert_eq!(assemble(&plain, OutputMode::Document, &templates), "[<r|>]");
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Document".parse::<OutputMode>(), Ok(OutputMode::Document));
        assert!("pdf".parse::<OutputMode>().is_err());
    }
}
