//! SVG rendering of a [`View`].
//!
//! Stars are drawn as circles on a canvas centred on the view center. The
//! field edge (radius 1) maps to half the canvas diagonal, so the whole
//! canvas is covered by the view cone. The template is any SVG document with
//! `%W%`, `%H%` and `%STAR%` placeholders.

use super::query::View;

/// Black canvas template.
pub const DEFAULT_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="%W%" height="%H%" viewBox="0 0 %W% %H%">
	<rect width="100%" height="100%" fill="black"/>
	<g>
		%STAR%
	</g>
</svg>
"#;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgStyle {
    pub width: u32,
    pub height: u32,
    /// Radius of a zero-weight star.
    pub r_min: f64,
    /// Radius of a full-weight star.
    pub r_max: f64,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1080,
            r_min: 0.5,
            r_max: 4.0,
        }
    }
}

impl View {
    /// Canvas position and circle radius of every star, in view order.
    pub fn project(&self, style: &SvgStyle) -> Vec<(f64, f64, f64)> {
        let (w, h) = (style.width as f64, style.height as f64);
        let diagonal = libm::hypot(w, h);
        self.stars
            .iter()
            .map(|star| {
                let (sin_a, cos_a) = libm::sincos(star.azimuth);
                let x = 0.5 * (w + cos_a * star.radius * diagonal);
                let y = 0.5 * (h + sin_a * star.radius * diagonal);
                let r = style.r_min + (style.r_max - style.r_min) * star.weight;
                (x, y, r)
            })
            .collect()
    }

    /// Fills `template` with the canvas size and one `<circle>` per star.
    pub fn to_svg(&self, template: &str, style: &SvgStyle) -> String {
        let circles: Vec<String> = self
            .stars
            .iter()
            .zip(self.project(style))
            .map(|(star, (x, y, r))| {
                format!(
                    r#"<circle cx="{:.3}" cy="{:.3}" r="{:.3}" fill="rgb({}, {}, {})" fill-opacity="{:.4}"/>"#,
                    x, y, r, star.color.r, star.color.g, star.color.b, star.weight
                )
            })
            .collect();

        template
            .replace("%W%", &style.width.to_string())
            .replace("%H%", &style.height.to_string())
            .replace("%STAR%", &circles.join("\n\t\t"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewStar;
    use skyview_core::{Color, Vector3};

    fn view_with(stars: Vec<ViewStar>) -> View {
        View {
            location: Vector3::z_axis(),
            anchor: Vector3::new(1.0, 0.0, 0.0),
            frame_angle: 0.5,
            rotation: 0.0,
            stars,
        }
    }

    #[test]
    fn test_center_and_edge_positions() {
        let view = view_with(vec![
            ViewStar {
                azimuth: 0.0,
                radius: 0.0,
                weight: 1.0,
                color: Color::WHITE,
            },
            ViewStar {
                azimuth: 0.0,
                radius: 1.0,
                weight: 0.0,
                color: Color::WHITE,
            },
        ]);
        let style = SvgStyle {
            width: 300,
            height: 400,
            r_min: 1.0,
            r_max: 5.0,
        };
        let points = view.project(&style);
        assert_eq!(points[0], (150.0, 200.0, 5.0));
        // Edge of the field sits half a diagonal (250) from the center.
        assert!((points[1].0 - 400.0).abs() < 1e-9);
        assert!((points[1].1 - 200.0).abs() < 1e-9);
        assert_eq!(points[1].2, 1.0);
    }

    #[test]
    fn test_template_placeholders() {
        let view = view_with(vec![ViewStar {
            azimuth: 1.0,
            radius: 0.5,
            weight: 0.5,
            color: Color::new(255, 204, 46),
        }]);
        let svg = view.to_svg(DEFAULT_TEMPLATE, &SvgStyle::default());
        assert!(svg.contains(r#"width="1080" height="1080""#));
        assert!(svg.contains(r#"fill="rgb(255, 204, 46)" fill-opacity="0.5000""#));
        assert!(!svg.contains("%STAR%") && !svg.contains("%W%"));
        assert_eq!(svg.matches("<circle").count(), 1);
    }
}
