use crate::{CanvasSpec, RenderError};

pub fn svg_to_png(svg: &str, canvas: &CanvasSpec, has_text: bool) -> Result<Vec<u8>, RenderError> {
    let mut opt = usvg::Options::default();
    opt.dpi = canvas.dpi as f32;
    // Looking up system fonts is slow; only pay for it when there's text
    if has_text {
        opt.fontdb_mut().load_system_fonts();
    }
    let tree =
        usvg::Tree::from_str(svg, &opt).map_err(|err| RenderError::SvgParse(err.to_string()))?;

    let mut pixmap = tiny_skia::Pixmap::new(canvas.width_px, canvas.height_px)
        .ok_or(RenderError::PixmapAlloc(canvas.width_px, canvas.height_px))?;
    // The document is sized in inches; map it onto the pixel grid
    let scale_x = canvas.width_px as f32 / tree.size().width();
    let scale_y = canvas.height_px as f32 / tree.size().height();
    let transform = tiny_skia::Transform::from_scale(scale_x, scale_y);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|err| RenderError::PngEncode(err.to_string()))
}

pub fn svg_to_pdf(svg: &str, has_text: bool) -> Result<Vec<u8>, RenderError> {
    let mut opt = svg2pdf::usvg::Options::default();
    if has_text {
        opt.fontdb_mut().load_system_fonts();
    }
    let tree = svg2pdf::usvg::Tree::from_str(svg, &opt)
        .map_err(|err| RenderError::SvgParse(err.to_string()))?;

    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|err| RenderError::PdfConvert(err.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::render::tests::{region, segments, theme};
    use crate::render::{render, Poster};
    use crate::{CanvasSpec, OutputFormat};

    #[test]
    fn png() {
        let theme = theme();
        let segments = segments();
        let poster = Poster::from_theme(&theme, &segments, &[], region());
        let canvas = CanvasSpec::from_inches(1.0, 1.5, 40.0);

        let first = render(&poster, &canvas, OutputFormat::Png).unwrap();
        assert!(first.bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        let second = render(&poster, &canvas, OutputFormat::Png).unwrap();
        assert_eq!(first.bytes, second.bytes);
    }

    #[test]
    fn pdf() {
        let theme = theme();
        let segments = segments();
        let poster = Poster::from_theme(&theme, &segments, &[], region());
        let canvas = CanvasSpec::from_inches(1.0, 1.5, 40.0);

        let pdf = render(&poster, &canvas, OutputFormat::Pdf).unwrap();
        assert!(pdf.bytes.starts_with(b"%PDF-"));
        assert_eq!(pdf.mime(), "application/pdf");
    }
}
