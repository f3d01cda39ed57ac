//! Markdown backend.

use crate::format::{option_letter, AnswerKey, ExamDocument, FormattedQuestion};
use crate::renderer::Renderer;

/// Renders exams as plain Markdown.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    fn question(&self, q: &FormattedQuestion, points_label: &str) -> String {
        let mut line = format!("{} {}", q.number, q.text);
        if !q.labels.is_empty() {
            let labels: Vec<String> = q.labels.iter().map(|l| format!("[{l}]")).collect();
            line.push(' ');
            line.push_str(&labels.join(" "));
        }
        line.push_str(&format!(" **({} {points_label})**", q.points));

        if let Some(options) = &q.options {
            line.push_str("\n\n");
            for (i, option) in options.iter().enumerate() {
                line.push_str(&format!("   {}) {option}\n", option_letter(i)));
            }
        }
        line
    }
}

impl Renderer for MarkdownRenderer {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn extension(&self) -> &'static str {
        "md"
    }

    fn render_exam(&self, doc: &ExamDocument) -> String {
        let labels = &doc.labels;
        let mut lines: Vec<String> = Vec::new();

        if let Some(header) = &doc.header {
            lines.push(header.clone());
            lines.push(String::new());
        }

        lines.push(format!("# {}", doc.title));
        if let Some(subtitle) = &doc.subtitle {
            lines.push(format!("## {subtitle}"));
        }
        lines.push(format!(
            "**{}:** {} {}     **{}:** {}",
            labels.time_limit, doc.time_limit_minutes, labels.minutes, labels.total_points, doc.total_points
        ));
        lines.push(String::new());
        lines.push("---".into());
        lines.push(String::new());

        for q in &doc.questions {
            lines.push(self.question(q, &labels.points));
            lines.push(String::new());
        }

        if let Some(footer) = &doc.footer {
            lines.push(footer.clone());
        }

        lines.join("\n")
    }

    fn render_answer_key(&self, key: &AnswerKey) -> String {
        let mut lines = vec![format!("# {}", key.title), String::new()];
        for entry in &key.entries {
            lines.push(format!(
                "{}. {} ({} {})",
                entry.number, entry.answer, entry.points, key.points_label
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{AnswerKeyEntry, AnswerSpace};
    use qbank_core::config::Labels;
    use qbank_core::model::QuestionType;

    fn question(number: &str, kind: QuestionType, options: Option<Vec<&str>>) -> FormattedQuestion {
        FormattedQuestion {
            number: number.into(),
            hash: "h".into(),
            text: "What is `x`?".into(),
            labels: Vec::new(),
            points: 5,
            answer_space: AnswerSpace::for_type(&kind),
            kind,
            options: options.map(|o| o.into_iter().map(str::to_string).collect()),
            correct_answer: None,
        }
    }

    fn document(questions: Vec<FormattedQuestion>) -> ExamDocument {
        ExamDocument {
            title: "Quiz".into(),
            subtitle: Some("Week 3".into()),
            time_limit_minutes: 45,
            total_points: questions.iter().map(|q| q.points).sum(),
            header: None,
            footer: None,
            questions,
            labels: Labels::default(),
        }
    }

    #[test]
    fn renders_exam_layout() {
        let mut labeled = question("2.", QuestionType::ShortAnswer, None);
        labeled.labels = vec!["Easy".into(), "Basics".into()];
        let doc = document(vec![
            question("1.", QuestionType::MultipleChoice, Some(vec!["2", "3"])),
            labeled,
        ]);

        let md = MarkdownRenderer.render_exam(&doc);
        let expected = concat!(
            "# Quiz\n",
            "## Week 3\n",
            "**Timp de lucru:** 45 minute     **Total puncte:** 10\n",
            "\n",
            "---\n",
            "\n",
            "1. What is `x`? **(5 puncte)**\n",
            "\n",
            "   a) 2\n",
            "   b) 3\n",
            "\n",
            "\n",
            "2. What is `x`? [Easy] [Basics] **(5 puncte)**\n",
        );
        assert_eq!(md, expected);
    }

    #[test]
    fn header_and_footer_wrap_the_exam() {
        let mut doc = document(Vec::new());
        doc.header = Some("**Nume:** ____".into());
        doc.footer = Some("Succes!".into());
        let md = MarkdownRenderer.render_exam(&doc);
        assert!(md.starts_with("**Nume:** ____\n\n# Quiz\n"));
        assert!(md.ends_with("---\n\nSucces!"));
    }

    #[test]
    fn renders_answer_key() {
        let key = AnswerKey {
            title: "Answer Key".into(),
            points_label: "puncte".into(),
            entries: vec![
                AnswerKeyEntry { number: 1, answer: "b) 3".into(), points: 5 },
                AnswerKeyEntry { number: 2, answer: "Open answer".into(), points: 10 },
            ],
        };
        assert_eq!(
            MarkdownRenderer.render_answer_key(&key),
            "# Answer Key\n\n1. b) 3 (5 puncte)\n2. Open answer (10 puncte)"
        );
    }
}
