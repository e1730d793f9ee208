use tex2svg::{Converter, Options};

fn main() -> Result<(), tex2svg::ConversionError> {
    let mut converter = Converter::new()?;
    println!(
        "{}",
        converter.render(
            r#"\int_{-\infty}^\infty e^{-x^2}\,\mathrm dx"#,
            &Options::default()
        )?
    );
    Ok(())
}
