//! Convert TeX math expressions to standalone SVG files.
//!
//! Typesetting is done by MathJax, evaluated in an embedded V8 isolate.
//!
//! ```no_run
//! use tex2svg::{convert, Options};
//!
//! let path = convert("x^2 + y^2 = z^2", "out.svg", &Options::default())?;
//! # Ok::<(), tex2svg::ConversionError>(())
//! ```

mod convert;
pub mod engine;
mod error;
pub mod logging;
pub mod scale;

pub use convert::{
    convert, strip_delimiters, ConversionRequest, Converter, Options, DEFAULT_DPI,
    DEFAULT_FONT_SIZE, MIN_EM_PX,
};
pub use error::ConversionError;
