//! Minimal SVG scatter plots for score curves.
//!
//! Output is a standalone SVG document: title, labelled axes with a light
//! grid, one dot per point and an optional highlighted point.

/// Canvas edge in pixels (7 in at 72 dpi).
const SIZE: f64 = 504.0;
const MARGIN: f64 = 56.0;
const TICKS: usize = 5;

/// A scatter plot under construction.
#[derive(Debug, Clone, Default)]
pub struct ScatterPlot {
    title: String,
    x_label: String,
    y_label: String,
    points: Vec<(f64, f64)>,
    highlight: Option<(f64, f64)>,
    x_max: Option<f64>,
}

impl ScatterPlot {
    /// An empty plot.
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            ..Self::default()
        }
    }

    /// Points to draw. Non-finite coordinates are skipped at render time.
    #[must_use]
    pub fn points(mut self, points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        self.points = points.into_iter().collect();
        self
    }

    /// A point drawn larger in a second colour.
    #[must_use]
    pub fn highlight(mut self, point: Option<(f64, f64)>) -> Self {
        self.highlight = point;
        self
    }

    /// Fix the x axis upper bound (otherwise the largest x, at least 1).
    #[must_use]
    pub fn x_max(mut self, x_max: f64) -> Self {
        self.x_max = Some(x_max);
        self
    }

    /// Render to an SVG document.
    #[must_use]
    pub fn render(&self) -> String {
        let finite = |&(x, y): &(f64, f64)| x.is_finite() && y.is_finite();
        let x_max = self.x_max.unwrap_or_else(|| {
            self.points
                .iter()
                .filter(|p| finite(*p))
                .map(|p| p.0)
                .fold(1.0, f64::max)
        });
        let y_max = self
            .points
            .iter()
            .filter(|p| finite(*p))
            .map(|p| p.1)
            .fold(1.0, f64::max);
        let plot = SIZE - 2.0 * MARGIN;
        let sx = |x: f64| MARGIN + x / x_max * plot;
        let sy = |y: f64| SIZE - MARGIN - y / y_max * plot;

        let mut svg = String::new();
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{s}" height="{s}" viewBox="0 0 {s} {s}" font-family="sans-serif" font-size="11">"#,
            s = SIZE
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"<rect width="{s}" height="{s}" fill="white"/>"#,
            s = SIZE
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="14">{}</text>"#,
            SIZE / 2.0,
            MARGIN / 2.0,
            xml_escape(&self.title)
        ));
        svg.push('\n');

        // Grid and tick labels
        for i in 0..=TICKS {
            let f = i as f64 / TICKS as f64;
            let (gx, gy) = (sx(f * x_max), sy(f * y_max));
            svg.push_str(&format!(
                r##"<line x1="{gx:.1}" y1="{:.1}" x2="{gx:.1}" y2="{:.1}" stroke="#ddd"/>"##,
                MARGIN,
                SIZE - MARGIN
            ));
            svg.push_str(&format!(
                r##"<line x1="{:.1}" y1="{gy:.1}" x2="{:.1}" y2="{gy:.1}" stroke="#ddd"/>"##,
                MARGIN,
                SIZE - MARGIN
            ));
            svg.push_str(&format!(
                r#"<text x="{gx:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
                SIZE - MARGIN + 16.0,
                tick_label(f * x_max)
            ));
            svg.push_str(&format!(
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
                MARGIN - 6.0,
                gy + 4.0,
                tick_label(f * y_max)
            ));
            svg.push('\n');
        }
        svg.push_str(&format!(
            r##"<rect x="{m}" y="{m}" width="{p}" height="{p}" fill="none" stroke="#333"/>"##,
            m = MARGIN,
            p = plot
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="middle">{}</text>"#,
            SIZE / 2.0,
            SIZE - 12.0,
            xml_escape(&self.x_label)
        ));
        svg.push_str(&format!(
            r#"<text x="14" y="{y}" text-anchor="middle" transform="rotate(-90 14 {y})">{}</text>"#,
            xml_escape(&self.y_label),
            y = SIZE / 2.0
        ));
        svg.push('\n');

        for &(x, y) in self.points.iter().filter(|p| finite(*p)) {
            svg.push_str(&format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="2" fill="red"/>"#,
                sx(x),
                sy(y)
            ));
            svg.push('\n');
        }
        if let Some((x, y)) = self.highlight.filter(|p| finite(p)) {
            svg.push_str(&format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="5" fill="none" stroke="blue" stroke-width="2"/>"#,
                sx(x),
                sy(y)
            ));
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }
}

fn tick_label(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}

/// Escape text for use inside an SVG element.
#[must_use]
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
