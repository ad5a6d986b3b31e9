//! Minimal PDF 1.4 writer
//!
//! Serializes a [`ReportLayout`] with uncompressed content streams and the
//! base-14 Helvetica faces, so no font embedding is needed.

use crate::layout::{Color, Element, Page, ReportLayout};
use crate::metrics::{encode, Font, MM_PER_PT};
use std::fmt::Write as _;

/// Bezier control-point factor for quarter circles
const KAPPA: f32 = 0.552_284_8;

/// Writes layouts as PDF documents
#[derive(Debug, Clone)]
pub struct PdfWriter {
    title: Option<String>,
    producer: String,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self {
            title: None,
            producer: format!("lpa-report {}", crate::VERSION),
        }
    }
}

impl PdfWriter {
    /// Create writer with no title
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Serialize a layout
    #[must_use]
    pub fn write(&self, layout: &ReportLayout) -> Vec<u8> {
        let mut doc = Document::default();
        doc.raw(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");

        let page_count = layout.pages.len();
        // 1 catalog, 2 pages, 3..=5 fonts, then page and content pairs, then info
        let first_page = 3 + Font::ALL.len();
        let info = first_page + 2 * page_count;

        doc.object(1, b"<< /Type /Catalog /Pages 2 0 R >>");
        let kids: Vec<String> = (0..page_count)
            .map(|i| format!("{} 0 R", first_page + 2 * i))
            .collect();
        doc.object(
            2,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {page_count} >>",
                kids.join(" ")
            )
            .as_bytes(),
        );
        for (i, font) in Font::ALL.iter().enumerate() {
            doc.object(
                3 + i,
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.base_font()
                )
                .as_bytes(),
            );
        }

        let fonts: String = Font::ALL
            .iter()
            .enumerate()
            .map(|(i, f)| format!("/{} {} 0 R", f.resource(), 3 + i))
            .collect::<Vec<_>>()
            .join(" ");
        let media = format!("[0 0 {} {}]", num(layout.width / MM_PER_PT), num(layout.height / MM_PER_PT));

        for (i, page) in layout.pages.iter().enumerate() {
            let page_id = first_page + 2 * i;
            let content_id = page_id + 1;
            doc.object(
                page_id,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox {media} \
                     /Resources << /Font << {fonts} >> >> /Contents {content_id} 0 R >>"
                )
                .as_bytes(),
            );
            let stream = content_stream(page, layout.height);
            let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
            body.extend_from_slice(&stream);
            body.extend_from_slice(b"\nendstream");
            doc.object(content_id, &body);
        }

        let mut info_dict = format!("<< /Producer {}", literal(&self.producer));
        if let Some(title) = &self.title {
            info_dict.push_str(" /Title ");
            info_dict.push_str(&literal(title));
        }
        info_dict.push_str(" >>");
        doc.object(info, info_dict.as_bytes());

        let bytes = doc.finish(info);
        tracing::debug!(pages = page_count, bytes = bytes.len(), "wrote pdf");
        bytes
    }
}

#[derive(Default)]
struct Document {
    bytes: Vec<u8>,
    offsets: Vec<(usize, usize)>,
}

impl Document {
    fn raw(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    fn object(&mut self, id: usize, body: &[u8]) {
        self.offsets.push((id, self.bytes.len()));
        self.raw(format!("{id} 0 obj\n").as_bytes());
        self.raw(body);
        self.raw(b"\nendobj\n");
    }

    fn finish(mut self, info: usize) -> Vec<u8> {
        self.offsets.sort_unstable();
        let size = self.offsets.len() + 1;
        let xref = self.bytes.len();
        let mut table = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for (_, offset) in &self.offsets {
            let _ = write!(table, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            table,
            "trailer\n<< /Size {size} /Root 1 0 R /Info {info} 0 R >>\nstartxref\n{xref}\n%%EOF\n"
        );
        self.raw(table.as_bytes());
        self.bytes
    }
}

fn num(value: f32) -> String {
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn rgb(color: Color) -> String {
    let c = |v: u8| num(f32::from(v) / 255.0);
    format!("{} {} {}", c(color.0), c(color.1), c(color.2))
}

/// PDF literal string from WinAnsi bytes
fn literal(text: &str) -> String {
    let mut out = String::from("(");
    for byte in encode(text) {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(char::from(byte));
            }
            0x20..=0x7e => out.push(char::from(byte)),
            other => {
                let _ = write!(out, "\\{other:03o}");
            }
        }
    }
    out.push(')');
    out
}

fn content_stream(page: &Page, page_height: f32) -> Vec<u8> {
    let pt = |mm: f32| mm / MM_PER_PT;
    // flip to PDF's bottom-left origin
    let py = |mm: f32| (page_height - mm) / MM_PER_PT;

    let mut out = String::new();
    for element in &page.elements {
        match element {
            Element::Text {
                x,
                y,
                size,
                font,
                color,
                text,
            } => {
                let _ = writeln!(
                    out,
                    "BT /{} {} Tf {} rg {} {} Td {} Tj ET",
                    font.resource(),
                    num(*size),
                    rgb(*color),
                    num(pt(*x)),
                    num(py(*y)),
                    literal(text)
                );
            }
            Element::Rect {
                x,
                y,
                width,
                height,
                radius,
                fill,
                stroke,
            } => {
                if fill.is_none() && stroke.is_none() {
                    continue;
                }
                if let Some(color) = fill {
                    let _ = writeln!(out, "{} rg", rgb(*color));
                }
                if let Some(s) = stroke {
                    let _ = writeln!(out, "{} RG {} w", rgb(s.color), num(pt(s.width)));
                }
                let (left, bottom, w, h) = (pt(*x), py(y + height), pt(*width), pt(*height));
                let r = pt(*radius).min(w / 2.0).min(h / 2.0);
                if r > 0.0 {
                    rounded_rect(&mut out, left, bottom, w, h, r);
                } else {
                    let _ = writeln!(out, "{} {} {} {} re", num(left), num(bottom), num(w), num(h));
                }
                let op = match (fill.is_some(), stroke.is_some()) {
                    (true, true) => "B",
                    (true, false) => "f",
                    _ => "S",
                };
                out.push_str(op);
                out.push('\n');
            }
            Element::Circle { x, y, radius, fill } => {
                let _ = writeln!(out, "{} rg", rgb(*fill));
                circle(&mut out, pt(*x), py(*y), pt(*radius));
                out.push_str("f\n");
            }
        }
    }
    out.into_bytes()
}

fn rounded_rect(out: &mut String, x: f32, y: f32, w: f32, h: f32, r: f32) {
    let k = r * KAPPA;
    let (right, top) = (x + w, y + h);
    let _ = writeln!(out, "{} {} m", num(x + r), num(y));
    let _ = writeln!(out, "{} {} l", num(right - r), num(y));
    let _ = writeln!(
        out,
        "{} {} {} {} {} {} c",
        num(right - r + k),
        num(y),
        num(right),
        num(y + r - k),
        num(right),
        num(y + r)
    );
    let _ = writeln!(out, "{} {} l", num(right), num(top - r));
    let _ = writeln!(
        out,
        "{} {} {} {} {} {} c",
        num(right),
        num(top - r + k),
        num(right - r + k),
        num(top),
        num(right - r),
        num(top)
    );
    let _ = writeln!(out, "{} {} l", num(x + r), num(top));
    let _ = writeln!(
        out,
        "{} {} {} {} {} {} c",
        num(x + r - k),
        num(top),
        num(x),
        num(top - r + k),
        num(x),
        num(top - r)
    );
    let _ = writeln!(out, "{} {} l", num(x), num(y + r));
    let _ = writeln!(
        out,
        "{} {} {} {} {} {} c",
        num(x),
        num(y + r - k),
        num(x + r - k),
        num(y),
        num(x + r),
        num(y)
    );
    out.push_str("h\n");
}

fn circle(out: &mut String, cx: f32, cy: f32, r: f32) {
    let k = r * KAPPA;
    let _ = writeln!(out, "{} {} m", num(cx + r), num(cy));
    let quarters = [
        (cx + r, cy + k, cx + k, cy + r, cx, cy + r),
        (cx - k, cy + r, cx - r, cy + k, cx - r, cy),
        (cx - r, cy - k, cx - k, cy - r, cx, cy - r),
        (cx + k, cy - r, cx + r, cy - k, cx + r, cy),
    ];
    for (x1, y1, x2, y2, x3, y3) in quarters {
        let _ = writeln!(
            out,
            "{} {} {} {} {} {} c",
            num(x1),
            num(y1),
            num(x2),
            num(y2),
            num(x3),
            num(y3)
        );
    }
    out.push_str("h\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentLibrary;
    use crate::layout::ReportInput;
    use chrono::NaiveDate;

    fn layout() -> ReportLayout {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        ReportLayout::build(
            &ReportInput::new("Théo (Jr)", "auditory", date),
            &ContentLibrary::builtin().unwrap(),
        )
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(12.0), "12");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(1.234_56), "1.23");
        assert_eq!(num(-0.001), "0");
    }

    #[test]
    fn literals_escape_delimiters() {
        assert_eq!(literal("a(b)\\"), "(a\\(b\\)\\\\)");
        assert_eq!(literal("é"), "(\\351)");
    }

    #[test]
    fn document_is_well_formed() {
        let layout = layout();
        let bytes = PdfWriter::new().with_title("Report").write(&layout);
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));

        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("/Type /Page ").count(), layout.pages.len());
        assert!(text.contains(&format!("/Count {}", layout.pages.len())));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("Th\\351o \\(Jr\\)"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let bytes = PdfWriter::new().write(&layout());
        let marker = bytes.windows(9).rposition(|w| w == b"startxref").unwrap();
        let tail = std::str::from_utf8(&bytes[marker..]).unwrap();
        let start: usize = tail.lines().nth(1).unwrap().parse().unwrap();

        let xref = std::str::from_utf8(&bytes[start..]).unwrap();
        assert!(xref.starts_with("xref\n"));
        let entries: Vec<&str> = xref.lines().skip(3).take_while(|l| l.ends_with(" n ")).collect();
        assert!(!entries.is_empty());
        for (i, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            assert!(bytes[offset..].starts_with(format!("{} 0 obj", i + 1).as_bytes()));
        }
    }
}
