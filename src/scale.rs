//! Sizing of the `<svg>` root.
//!
//! MathJax sizes its output in `ex` and draws in thousandths of an em, so
//! the pixel size follows from the `viewBox` once the em is known.

/// Width of one em in pixels for a font size in points rendered at `dpi`.
pub fn em_in_pixels(font_size: f64, dpi: f64) -> f64 {
    font_size * dpi / 72.0
}

/// Rewrites the root `width` and `height` to pixels for the given em size.
///
/// Returns `None` when the document has no `<svg>` root with a usable
/// `viewBox`, or when the resulting size is not a finite, non-zero length.
pub fn resize(svg: &str, em_px: f64) -> Option<String> {
    let start = svg.find("<svg")?;
    // MathJax never puts `>` inside attribute values of the root tag
    let end = start + svg[start..].find('>')?;
    let tag = &svg[start..end];

    let view_box = attribute(tag, "viewBox")?;
    let mut numbers = view_box
        .split(|c: char| c.is_ascii_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse::<f64>);
    let (width, height) = match (
        numbers.next()?,
        numbers.next()?,
        numbers.next()?,
        numbers.next()?,
    ) {
        (Ok(_), Ok(_), Ok(w), Ok(h)) if w > 0.0 && h > 0.0 => (w, h),
        _ => return None,
    };

    let width = pixels(width / 1000.0 * em_px)?;
    let height = pixels(height / 1000.0 * em_px)?;
    let tag = set_attribute(tag, "width", &width);
    let tag = set_attribute(&tag, "height", &height);

    Some(format!("{}{}{}", &svg[..start], tag, &svg[end..]))
}

/// Formats a length in pixels, rejecting ones that print as zero or not at all.
fn pixels(value: f64) -> Option<String> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    let formatted = format!("{value:.3}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "0" {
        return None;
    }
    Some(format!("{trimmed}px"))
}

/// Byte range of the value of ` name="..."` inside `tag`.
fn value_range(tag: &str, name: &str) -> Option<(usize, usize)> {
    let needle = format!(" {name}=\"");
    let value_start = tag.find(&needle)? + needle.len();
    let value_end = value_start + tag[value_start..].find('"')?;
    Some((value_start, value_end))
}

fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    value_range(tag, name).map(|(start, end)| &tag[start..end])
}

fn set_attribute(tag: &str, name: &str, value: &str) -> String {
    match value_range(tag, name) {
        Some((start, end)) => format!("{}{}{}", &tag[..start], value, &tag[end..]),
        None => format!("{tag} {name}=\"{value}\""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATHJAX_ROOT: &str = r#"<svg style="vertical-align: -0.566ex;" xmlns="http://www.w3.org/2000/svg" width="11.6ex" height="2.262ex" role="img" focusable="false" viewBox="0 -750 5127 1000"><g stroke="currentColor" stroke-width="0"></g></svg>"#;

    #[test]
    fn default_em_is_fifty_pixels() {
        assert_eq!(em_in_pixels(12.0, 300.0), 50.0);
        assert_eq!(em_in_pixels(12.0, 72.0), 12.0);
    }

    #[test]
    fn rewrites_root_size_from_view_box() {
        let resized = resize(MATHJAX_ROOT, 50.0).unwrap();
        assert!(resized.contains(r#" width="256.35px""#));
        assert!(resized.contains(r#" height="50px""#));
        assert!(!resized.contains("11.6ex"));
        // children are untouched
        assert!(resized.contains(r#"stroke-width="0""#));
        assert!(resized.ends_with("</g></svg>"));
    }

    #[test]
    fn adds_missing_size_attributes() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 2000 1000"></svg>"#;
        let resized = resize(svg, 10.0).unwrap();
        assert!(resized.contains(r#" width="20px""#));
        assert!(resized.contains(r#" height="10px""#));
    }

    #[test]
    fn leaves_documents_without_view_box_alone() {
        assert_eq!(resize(r#"<svg width="1ex"></svg>"#, 50.0), None);
        assert_eq!(resize("<div></div>", 50.0), None);
        assert_eq!(resize(r#"<svg viewBox="0 0 0 1000"></svg>"#, 50.0), None);
    }

    #[test]
    fn refuses_infinite_sizes() {
        let em_px = em_in_pixels(1e200, 1e200);
        assert!(em_px.is_infinite());
        assert_eq!(resize(MATHJAX_ROOT, em_px), None);
    }

    #[test]
    fn refuses_sizes_that_round_to_zero() {
        assert_eq!(resize(MATHJAX_ROOT, em_in_pixels(1e-4, 1e-4)), None);
        assert_eq!(pixels(0.0004), None);
        assert_eq!(pixels(0.0005).as_deref(), Some("0.001px"));
    }

    #[test]
    fn stroke_width_is_not_mistaken_for_width() {
        let tag = r#"<svg stroke-width="3" width="1ex""#;
        assert_eq!(attribute(tag, "width"), Some("1ex"));
    }
}
