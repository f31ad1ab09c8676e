use geom::{PolyLine, Polygon};

use crate::render::Poster;
use crate::{CanvasSpec, Color, Overlay, RenderError, TextOverlay, Viewport};

/// How much of the poster each gradient band covers, from the top and bottom edges
const FADE_FRACTION: f64 = 0.25;

/// Builds the SVG scene for a poster. The document is sized in inches, with a viewBox in canvas
/// pixels, so rasterizing at the canvas dpi lands exactly on the pixel grid.
pub fn to_svg(poster: &Poster, canvas: &CanvasSpec) -> Result<String, RenderError> {
    let viewport = Viewport::new(&poster.region, canvas)?;
    let (width, height) = (f64::from(canvas.width_px), f64::from(canvas.height_px));
    let px_per_pt = canvas.px_per_pt();

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}in\" height=\"{}in\" viewBox=\"0 0 {} {}\">\n",
        canvas.width_in(),
        canvas.height_in(),
        canvas.width_px,
        canvas.height_px
    ));
    out.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\"{}/>\n",
        canvas.width_px,
        canvas.height_px,
        fill(poster.background)
    ));

    for layer in &poster.areas {
        out.push_str(&format!(
            "<g id=\"areas_{}\"{} fill-rule=\"evenodd\">\n",
            layer.kind,
            fill(layer.color)
        ));
        for polygon in &layer.polygons {
            out.push_str(&format!(
                "<path d=\"{}\"/>\n",
                polygon_path(polygon, &viewport)
            ));
        }
        out.push_str("</g>\n");
    }

    for layer in &poster.layers {
        out.push_str(&format!(
            "<g id=\"layer_{}\" fill=\"none\"{} stroke-width=\"{:.2}\" stroke-linecap=\"round\" stroke-linejoin=\"round\">\n",
            layer.category,
            stroke(layer.style.color),
            layer.style.line_width * px_per_pt
        ));
        for pl in &layer.geometry {
            if pl.points().len() < 2 {
                return Err(RenderError::InvalidGeometry {
                    category: layer.category.to_string(),
                    num_pts: pl.points().len(),
                });
            }
            out.push_str(&format!(
                "<path d=\"{}\"/>\n",
                polyline_path(pl, &viewport)
            ));
        }
        out.push_str("</g>\n");
    }

    if let Some(color) = poster.gradient {
        let band = height * FADE_FRACTION;
        out.push_str("<defs>\n");
        // Opaque at the edge of the poster, transparent towards the middle
        for (id, y1, y2) in [("fade_top", 0, 1), ("fade_bottom", 1, 0)] {
            out.push_str(&format!(
                "<linearGradient id=\"{}\" x1=\"0\" y1=\"{}\" x2=\"0\" y2=\"{}\">\
                 <stop offset=\"0\" stop-color=\"{}\" stop-opacity=\"{}\"/>\
                 <stop offset=\"1\" stop-color=\"{}\" stop-opacity=\"0\"/>\
                 </linearGradient>\n",
                id,
                y1,
                y2,
                color.to_hex(),
                color.opacity(),
                color.to_hex()
            ));
        }
        out.push_str("</defs>\n");
        out.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{:.2}\" fill=\"url(#fade_top)\"/>\n",
            canvas.width_px, band
        ));
        out.push_str(&format!(
            "<rect x=\"0\" y=\"{:.2}\" width=\"{}\" height=\"{:.2}\" fill=\"url(#fade_bottom)\"/>\n",
            height - band,
            canvas.width_px,
            band
        ));
    }

    for overlay in &poster.overlays {
        match overlay {
            Overlay::Text(text) => out.push_str(&text_element(text, width, height, px_per_pt)),
            Overlay::Divider {
                x1,
                x2,
                y,
                width_pt,
                color,
            } => {
                let y = height * (1.0 - y);
                out.push_str(&format!(
                    "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"{} stroke-width=\"{:.2}\"/>\n",
                    width * x1,
                    y,
                    width * x2,
                    y,
                    stroke(*color),
                    width_pt * px_per_pt
                ));
            }
        }
    }

    out.push_str("</svg>\n");
    Ok(out)
}

fn fill(color: Color) -> String {
    if color.is_opaque() {
        format!(" fill=\"{}\"", color.to_hex())
    } else {
        format!(
            " fill=\"{}\" fill-opacity=\"{}\"",
            color.to_hex(),
            color.opacity()
        )
    }
}

fn stroke(color: Color) -> String {
    if color.is_opaque() {
        format!(" stroke=\"{}\"", color.to_hex())
    } else {
        format!(
            " stroke=\"{}\" stroke-opacity=\"{}\"",
            color.to_hex(),
            color.opacity()
        )
    }
}

fn polyline_path(pl: &PolyLine, viewport: &Viewport) -> String {
    let mut d = String::new();
    for (idx, pt) in pl.points().iter().enumerate() {
        let (x, y) = viewport.to_canvas(*pt);
        let cmd = if idx == 0 { "M" } else { " L" };
        d.push_str(&format!("{}{:.2} {:.2}", cmd, round(x), round(y)));
    }
    d
}

fn polygon_path(polygon: &Polygon, viewport: &Viewport) -> String {
    let mut parts = Vec::new();
    for ring in polygon.rings() {
        // Rings are closed; Z takes care of the last point
        let pts = ring.points();
        let mut d = String::new();
        for (idx, pt) in pts[..pts.len() - 1].iter().enumerate() {
            let (x, y) = viewport.to_canvas(*pt);
            let cmd = if idx == 0 { "M" } else { " L" };
            d.push_str(&format!("{}{:.2} {:.2}", cmd, round(x), round(y)));
        }
        d.push_str(" Z");
        parts.push(d);
    }
    parts.join(" ")
}

/// Avoids printing -0.00
fn round(x: f64) -> f64 {
    (x * 100.0).round() / 100.0 + 0.0
}

fn text_element(text: &TextOverlay, width: f64, height: f64, px_per_pt: f64) -> String {
    let opacity = if text.color.is_opaque() {
        String::new()
    } else {
        format!(" fill-opacity=\"{}\"", text.color.opacity())
    };
    format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{:.2}\" font-weight=\"{}\" fill=\"{}\"{} text-anchor=\"middle\">{}</text>\n",
        width * text.x,
        height * (1.0 - text.y),
        escape(&css_font_family(&text.font_family)),
        text.size_pt * px_per_pt,
        text.weight.as_svg(),
        text.color.to_hex(),
        opacity,
        escape(&text.text)
    )
}

/// A comma-separated family list, without stray whitespace or a trailing `;`. Commas inside
/// quoted names stay.
fn css_font_family(raw: &str) -> String {
    let list = raw.trim().trim_end_matches(';').trim();
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in list.chars() {
        match (c, quote) {
            ('\'' | '"', None) => {
                quote = Some(c);
                current.push(c);
            }
            (_, Some(q)) if c == q => {
                quote = None;
                current.push(c);
            }
            (',', None) => {
                if !current.trim().is_empty() {
                    parts.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts.join(",")
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use geom::{LonLat, Pt2D};
    use road_network::{Category, ClassifiedSegment};

    use super::*;
    use crate::render::tests::{region, segments, theme};
    use crate::PosterText;

    #[test]
    fn layers_in_order() {
        let theme = theme();
        let segments = segments();
        let poster = Poster::from_theme(&theme, &segments, &[], region());
        let svg = to_svg(&poster, &CanvasSpec::from_inches(2.0, 3.0, 50.0)).unwrap();

        assert!(svg.contains("width=\"2in\" height=\"3in\" viewBox=\"0 0 100 150\""));
        let residential = svg.find("id=\"layer_residential\"").unwrap();
        let motorway = svg.find("id=\"layer_motorway\"").unwrap();
        assert!(residential < motorway);
        assert!(svg.contains("stroke-linecap=\"round\""));
        // The fades come after every road
        assert!(svg.find("url(#fade_top)").unwrap() > motorway);
    }

    #[test]
    fn north_is_up() {
        let theme = theme();
        let segments = vec![ClassifiedSegment {
            geometry: PolyLine::must_new(vec![Pt2D::new(0.0, -60.0), Pt2D::new(0.0, 60.0)]),
            category: Category::Primary,
        }];
        let poster = Poster::from_theme(&theme, &segments, &[], region());
        // Square canvas, 100px across the 120m window
        let svg = to_svg(&poster, &CanvasSpec::from_inches(1.0, 1.0, 100.0)).unwrap();
        assert!(svg.contains("<path d=\"M50.00 100.00 L50.00 0.00\"/>"));
    }

    #[test]
    fn short_polyline() {
        let theme = theme();
        let segments = vec![ClassifiedSegment {
            geometry: PolyLine::unchecked_new(vec![Pt2D::new(1.0, 1.0)]),
            category: Category::Service,
        }];
        let poster = Poster::from_theme(&theme, &segments, &[], region());
        assert_eq!(
            to_svg(&poster, &CanvasSpec::from_inches(1.0, 1.0, 100.0)),
            Err(RenderError::InvalidGeometry {
                category: "service".to_string(),
                num_pts: 1,
            })
        );
    }

    #[test]
    fn text_is_escaped_and_last() {
        let theme = theme();
        let canvas = CanvasSpec::from_inches(4.0, 6.0, 30.0);
        let text = PosterText::new("東京 & <co>", "Japan", LonLat::new(139.69, 35.69));
        let poster =
            Poster::from_theme(&theme, &[], &[], region()).with_text(&text, &theme, &canvas);
        let svg = to_svg(&poster, &canvas).unwrap();
        assert!(svg.contains("東京 &amp; &lt;co&gt;"));
        assert!(svg.contains("JAPAN"));
        assert!(svg.find("<text").unwrap() > svg.find("fade_bottom").unwrap());
        assert!(svg.contains("<line "));
    }

    #[test]
    fn font_family_lists() {
        assert_eq!(css_font_family(" Roboto , sans-serif ;"), "Roboto,sans-serif");
        assert_eq!(
            css_font_family("'Noto Sans, JP',serif"),
            "'Noto Sans, JP',serif"
        );
        assert_eq!(css_font_family(" ; "), "");

        let theme = theme();
        let canvas = CanvasSpec::from_inches(4.0, 6.0, 30.0);
        let mut text = PosterText::new("Tokyo", "Japan", LonLat::new(139.69, 35.69));
        text.font_family = Some("\"Noto Sans JP\", sans-serif".to_string());
        let poster =
            Poster::from_theme(&theme, &[], &[], region()).with_text(&text, &theme, &canvas);
        let svg = to_svg(&poster, &canvas).unwrap();
        assert!(svg.contains("font-family=\"&quot;Noto Sans JP&quot;,sans-serif\""));
    }
}
