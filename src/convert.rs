use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::engine::MathJax;
use crate::error::ConversionError;
use crate::scale;

pub const DEFAULT_FONT_SIZE: f64 = 12.0;
pub const DEFAULT_DPI: f64 = 300.0;
/// Smallest em, in pixels, the options may produce.
pub const MIN_EM_PX: f64 = 1.0;

/// How the math is typeset and sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    /// Font size in points.
    pub font_size: f64,
    pub dpi: f64,
    /// Display style when `true`, inline (text) style otherwise.
    pub display: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            dpi: DEFAULT_DPI,
            display: true,
        }
    }
}

impl Options {
    pub fn validate(&self) -> Result<(), ConversionError> {
        for (name, value) in [("font size", self.font_size), ("dpi", self.dpi)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConversionError::InvalidOption(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        let em_px = scale::em_in_pixels(self.font_size, self.dpi);
        if !em_px.is_finite() || em_px < MIN_EM_PX {
            return Err(ConversionError::InvalidOption(format!(
                "font size {} at {} dpi gives a {em_px} px em, expected a finite size of at least {MIN_EM_PX} px",
                self.font_size, self.dpi
            )));
        }
        Ok(())
    }
}

/// One TeX expression and where its SVG goes.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub tex_source: String,
    pub output_path: PathBuf,
    pub options: Options,
}

impl ConversionRequest {
    pub fn new(tex_source: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            tex_source: tex_source.into(),
            output_path: output_path.into(),
            options: Options::default(),
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Checks everything that can be checked without rendering.
    pub fn validate(&self) -> Result<(), ConversionError> {
        strip_delimiters(&self.tex_source)?;
        self.options.validate()?;
        check_parent(&self.output_path)
    }
}

/// Removes one surrounding pair of math delimiters.
///
/// Fails with [`ConversionError::EmptySource`] when nothing but whitespace
/// is left.
pub fn strip_delimiters(tex: &str) -> Result<&str, ConversionError> {
    const PAIRS: [(&str, &str); 4] = [("$$", "$$"), ("\\[", "\\]"), ("\\(", "\\)"), ("$", "$")];

    let trimmed = tex.trim();
    let inner = PAIRS
        .iter()
        .find_map(|(open, close)| {
            trimmed
                .strip_prefix(open)
                .and_then(|rest| rest.strip_suffix(close))
        })
        .unwrap_or(trimmed)
        .trim();

    if inner.is_empty() {
        return Err(ConversionError::EmptySource);
    }
    Ok(inner)
}

fn check_parent(path: &Path) -> Result<(), ConversionError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(ConversionError::io(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("directory {} does not exist", parent.display()),
                ),
            ))
        }
        _ => Ok(()),
    }
}

/// TeX to SVG converter backed by one MathJax engine.
pub struct Converter {
    engine: MathJax,
}

impl Converter {
    pub fn new() -> Result<Self, ConversionError> {
        Ok(Self {
            engine: MathJax::new()?,
        })
    }

    /// Renders `tex` to a sized SVG document in memory.
    pub fn render(&mut self, tex: &str, options: &Options) -> Result<String, ConversionError> {
        let tex = strip_delimiters(tex)?;
        options.validate()?;

        let svg = self.engine.to_svg(tex, options.display)?;
        let em_px = scale::em_in_pixels(options.font_size, options.dpi);
        match scale::resize(&svg, em_px) {
            Some(sized) => Ok(sized),
            None => {
                warn!("MathJax output has no usable viewBox; keeping its own size");
                Ok(svg)
            }
        }
    }

    /// Renders the request and writes the SVG, replacing any existing file.
    ///
    /// Nothing is written unless rendering succeeds.
    pub fn convert(&mut self, request: &ConversionRequest) -> Result<PathBuf, ConversionError> {
        request.validate()?;
        let svg = self.render(&request.tex_source, &request.options)?;

        fs::write(&request.output_path, svg.as_bytes())
            .map_err(|err| ConversionError::io(&request.output_path, err))?;
        info!(
            path = %request.output_path.display(),
            bytes = svg.len(),
            "wrote SVG"
        );
        Ok(request.output_path.clone())
    }
}

/// Converts `tex_source` and writes it to `output_path` with a fresh engine.
pub fn convert(
    tex_source: &str,
    output_path: impl AsRef<Path>,
    options: &Options,
) -> Result<PathBuf, ConversionError> {
    let request = ConversionRequest::new(tex_source, output_path.as_ref()).with_options(*options);
    // Fail on bad input before paying for engine startup
    request.validate()?;
    Converter::new()?.convert(&request)
}
