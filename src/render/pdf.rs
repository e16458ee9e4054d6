//! PDF conversion of drawn figures.

use svg2pdf::usvg;

use crate::error::{PlotError, PlotPhase};

/// Convert an SVG document into a single-page PDF
pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, PlotError> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| PlotError::new(PlotPhase::Save, format!("invalid SVG: {}", e)))?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|e| PlotError::new(PlotPhase::Save, format!("PDF conversion failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_to_pdf() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20">
            <rect x="0" y="0" width="40" height="20" fill="white"/>
            <circle cx="10" cy="10" r="5" fill="magenta"/>
        </svg>"#;
        let pdf = svg_to_pdf(svg).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn test_invalid_svg_is_save_error() {
        let err = svg_to_pdf("not an svg document").unwrap_err();
        assert_eq!(err.phase, PlotPhase::Save);
    }
}
