//! Print document backend.
//!
//! Produces a self-contained, A4-paged HTML document with all CSS, fonts, and
//! images inlined, ready to print or to save as PDF from a browser.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use qbank_core::config::{Assets, Labels};
use qbank_core::model::QuestionType;

use crate::format::{option_letter, AnswerKey, AnswerSpace, ExamDocument, FormattedQuestion};
use crate::math::convert_math;
use crate::renderer::Renderer;
use crate::text::{bold_to_html, code_spans_to_html, html_escape, transliterate};

/// A file inlined as a `data:` URI.
#[derive(Debug, Clone)]
struct Embedded {
    mime: &'static str,
    data: String,
}

impl Embedded {
    fn load(path: &Path, mime: &'static str) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self {
            mime,
            data: STANDARD.encode(bytes),
        })
    }

    fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.data)
    }
}

/// Logo and font resources for the print document.
///
/// Missing or unreadable assets are logged and skipped; the document then
/// falls back to a plainer layout.
#[derive(Debug, Clone, Default)]
pub struct PrintAssets {
    logo: Option<Embedded>,
    font: Option<(Embedded, &'static str)>,
}

impl PrintAssets {
    pub fn load(assets: &Assets) -> Self {
        let logo = assets.logo.as_deref().and_then(|path| {
            let Some(mime) = image_mime(path) else {
                tracing::warn!("unsupported logo format: {}", path.display());
                return None;
            };
            match Embedded::load(path, mime) {
                Ok(logo) => Some(logo),
                Err(e) => {
                    tracing::warn!("could not read logo {}: {e}", path.display());
                    None
                }
            }
        });

        let font = assets.fonts.iter().find_map(|path| {
            let (mime, format) = font_format(path)?;
            match Embedded::load(path, mime) {
                Ok(font) => {
                    tracing::debug!("embedding font {}", path.display());
                    Some((font, format))
                }
                Err(_) => None,
            }
        });
        if font.is_none() {
            tracing::warn!("no Unicode font found, transliterating diacritics");
        }

        Self { logo, font }
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    pub fn has_unicode_font(&self) -> bool {
        self.font.is_some()
    }
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

fn font_format(path: &Path) -> Option<(&'static str, &'static str)> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "ttf" => Some(("font/ttf", "truetype")),
        "otf" => Some(("font/otf", "opentype")),
        "woff" => Some(("font/woff", "woff")),
        "woff2" => Some(("font/woff2", "woff2")),
        _ => None,
    }
}

/// Renders exams as print-ready HTML.
#[derive(Debug, Clone, Default)]
pub struct PrintRenderer {
    assets: PrintAssets,
}

impl PrintRenderer {
    pub fn new(assets: PrintAssets) -> Self {
        Self { assets }
    }

    /// Prepare user text: fall back to ASCII without a Unicode font, then
    /// escape.
    fn plain(&self, s: &str) -> String {
        if self.assets.has_unicode_font() {
            html_escape(s)
        } else {
            html_escape(&transliterate(s))
        }
    }

    /// Like [`PrintRenderer::plain`], with math and inline code converted.
    fn rich(&self, s: &str) -> String {
        let s = if self.assets.has_unicode_font() {
            s.to_string()
        } else {
            transliterate(s)
        };
        code_spans_to_html(&html_escape(&convert_math(&s)))
    }

    fn open_document(&self, html: &mut String, title: &str) {
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", self.plain(title)));
        html.push_str("<style>\n");
        if let Some((font, format)) = &self.assets.font {
            html.push_str(&format!(
                "@font-face {{ font-family: 'ExamUnicode'; src: url({}) format('{format}'); }}\n",
                font.data_uri()
            ));
            html.push_str("body { font-family: 'ExamUnicode', 'Times New Roman', Times, serif; }\n");
        }
        html.push_str(CSS);
        html.push_str("</style>\n");
        html.push_str("</head>\n<body>\n");
    }

    fn student_info(&self, html: &mut String, labels: &Labels) {
        html.push_str("<table class=\"page-header\"><tr>\n");
        if let Some(logo) = &self.assets.logo {
            html.push_str(&format!(
                "<td class=\"logo\"><img src=\"{}\" alt=\"logo\"></td>\n",
                logo.data_uri()
            ));
        }
        html.push_str("<td class=\"student-info\">\n");
        html.push_str(&format!(
            "<p><b>{}</b> {}</p>\n",
            self.plain(&labels.student_name),
            "_".repeat(40)
        ));
        html.push_str(&format!(
            "<p><b>{}</b> {}  <b>{}</b> {}</p>\n",
            self.plain(&labels.student_group),
            "_".repeat(15),
            self.plain(&labels.student_date),
            "_".repeat(15)
        ));
        html.push_str("</td>\n</tr></table>\n<hr>\n");
    }

    fn text_block(&self, html: &mut String, class: &str, content: &str) {
        html.push_str(&format!("<div class=\"{class}\">\n"));
        for line in content.lines() {
            let line = line.replace("---", "");
            let line = line.trim();
            if !line.is_empty() {
                html.push_str(&format!("<p>{}</p>\n", bold_to_html(&self.plain(line))));
            }
        }
        html.push_str("</div>\n");
    }

    fn question(&self, html: &mut String, q: &FormattedQuestion, labels: &Labels) {
        html.push_str("<div class=\"question\">\n");

        let label_text: String = q
            .labels
            .iter()
            .map(|l| format!(" [{}]", self.plain(l)))
            .collect();
        html.push_str(&format!(
            "<p><span class=\"question-number\">{}</span> {}{} <span class=\"points\">({} {})</span></p>\n",
            html_escape(&q.number),
            self.rich(&q.text),
            label_text,
            q.points,
            self.plain(&labels.points),
        ));

        if let Some(options) = &q.options {
            html.push_str("<div class=\"options\">\n");
            for (i, option) in options.iter().enumerate() {
                html.push_str(&format!(
                    "<div class=\"option\">{}) {}</div>\n",
                    option_letter(i),
                    self.rich(option)
                ));
            }
            html.push_str("</div>\n");
        } else if let Some((width, height)) = q.answer_space.dimensions_cm() {
            let hint = match (&q.kind, q.answer_space) {
                (QuestionType::Code, _) => Some(&labels.code_hint),
                (_, AnswerSpace::Large) => Some(&labels.free_text_hint),
                _ => None,
            };
            html.push_str(&format!("<p class=\"answer-prompt\"><b>{}:</b>", self.plain(&labels.answer)));
            if let Some(hint) = hint.filter(|h| !h.is_empty()) {
                html.push_str(&format!(" <i>{}</i>", self.plain(hint)));
            }
            html.push_str("</p>\n");
            html.push_str(&format!(
                "<div class=\"answer-box\" style=\"width: {width}cm; height: {height}cm;\"></div>\n"
            ));
        }

        html.push_str("</div>\n");
    }
}

impl Renderer for PrintRenderer {
    fn name(&self) -> &'static str {
        "print"
    }

    fn extension(&self) -> &'static str {
        "html"
    }

    fn render_exam(&self, doc: &ExamDocument) -> String {
        let labels = &doc.labels;
        let mut html = String::new();
        self.open_document(&mut html, &doc.title);

        self.student_info(&mut html, labels);

        if let Some(header) = &doc.header {
            self.text_block(&mut html, "exam-header", header);
        }

        html.push_str(&format!("<h1>{}</h1>\n", self.plain(&doc.title)));
        if let Some(subtitle) = &doc.subtitle {
            html.push_str(&format!("<h2>{}</h2>\n", self.plain(subtitle)));
        }
        html.push_str(&format!(
            "<div class=\"header-info\"><p><b>{}:</b> {} {}</p><p><b>{}:</b> {}</p></div>\n<hr>\n",
            self.plain(&labels.time_limit),
            doc.time_limit_minutes,
            self.plain(&labels.minutes),
            self.plain(&labels.total_points),
            doc.total_points
        ));

        for q in &doc.questions {
            self.question(&mut html, q, labels);
        }

        if let Some(footer) = &doc.footer {
            html.push_str("<hr>\n");
            self.text_block(&mut html, "footer", footer);
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    fn render_answer_key(&self, key: &AnswerKey) -> String {
        let mut html = String::new();
        self.open_document(&mut html, &key.title);
        html.push_str(&format!("<h1>{}</h1>\n", self.plain(&key.title)));
        html.push_str("<div class=\"answer-key\">\n");
        for entry in &key.entries {
            html.push_str(&format!(
                "<p><span class=\"question-number\">{}.</span> {} <span class=\"points\">({} {})</span></p>\n",
                entry.number,
                self.rich(&entry.answer),
                entry.points,
                self.plain(&key.points_label)
            ));
        }
        html.push_str("</div>\n</body>\n</html>\n");
        html
    }
}

const CSS: &str = r#"
@page { size: A4; margin: 2cm; }
body { font-family: 'Times New Roman', Times, serif; font-size: 12pt; line-height: 1.4; color: #000; }
h1 { font-size: 18pt; text-align: center; margin-bottom: 10pt; border-bottom: 2px solid #000; padding-bottom: 5pt; }
h2 { font-size: 14pt; text-align: center; margin-bottom: 8pt; }
hr { border: none; border-top: 1px solid #000; margin: 8pt 0; }
.page-header { width: 100%; border-collapse: collapse; margin-bottom: 12pt; }
.page-header td { vertical-align: top; padding: 0; }
.logo { width: 6cm; }
.logo img { width: 5cm; height: 2.5cm; object-fit: contain; }
.student-info p { margin: 0 0 8pt 0; text-align: center; }
.exam-header p, .footer p { text-align: center; margin: 0 0 6pt 0; }
.header-info { text-align: center; margin-bottom: 12pt; }
.header-info p { margin: 0; }
.question { margin-bottom: 15pt; page-break-inside: avoid; }
.question-number, .points { font-weight: bold; }
.options { margin-left: 20pt; margin-top: 5pt; }
.option { margin-bottom: 3pt; }
.answer-prompt { margin: 4pt 0 3pt 0; }
.answer-box { border: 1px solid #000; box-sizing: border-box; }
code { font-family: 'Courier New', Courier, monospace; background-color: #f5f5f5; padding: 2pt; border-radius: 3pt; }
.footer { margin-top: 30pt; }
"#;
