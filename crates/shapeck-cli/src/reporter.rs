use colored::Colorize;
use serde_json::{Value, json};
use shapeck_solver::ShapeError;

use crate::driver::{Answer, Outcome, RunReport};

pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    /// Text rendering: rejected declarations, then one line per query, then
    /// a summary line.
    pub fn render(&self, report: &RunReport) -> String {
        let mut lines = Vec::new();
        for outcome in &report.declarations {
            if let Err(err) = &outcome.result {
                lines.push(format!(
                    "{} {}",
                    self.paint_subject(&format!("declare {}", outcome.subject)),
                    self.format_error(err)
                ));
            }
        }
        for outcome in &report.queries {
            let rendered = match &outcome.result {
                Ok(answer) => self.format_answer(answer),
                Err(err) => self.format_error(err),
            };
            lines.push(format!("{} {}", self.paint_subject(&outcome.subject), rendered));
        }
        lines.push(self.format_summary(report));
        lines.join("\n")
    }

    pub fn render_json(&self, report: &RunReport) -> Value {
        json!({
            "declarations": report.declarations.iter().map(outcome_json).collect::<Vec<_>>(),
            "queries": report.queries.iter().map(outcome_json).collect::<Vec<_>>(),
            "errors": report.error_count(),
        })
    }

    fn format_answer(&self, answer: &Answer) -> String {
        let text = match answer {
            Answer::Declared => "ok".to_string(),
            Answer::Keys(keys) => format!("[{}]", keys.join(", ")),
            Answer::FieldType(ty) => ty.clone(),
            Answer::Value(value) => value.to_string(),
            Answer::Matches(matches) | Answer::Subtype(matches) => matches.to_string(),
        };
        if self.color {
            text.green().to_string()
        } else {
            text
        }
    }

    fn format_error(&self, err: &ShapeError) -> String {
        let code = format!("error[{}]:", err.code());
        if self.color {
            format!("{} {}", code.red().bold(), err)
        } else {
            format!("{code} {err}")
        }
    }

    fn paint_subject(&self, subject: &str) -> String {
        let subject = format!("{subject}:");
        if self.color {
            subject.cyan().to_string()
        } else {
            subject
        }
    }

    fn format_summary(&self, report: &RunReport) -> String {
        let errors = report.error_count();
        let summary = format!(
            "{} declaration(s), {} query(ies), {} error(s)",
            report.declarations.len(),
            report.queries.len(),
            errors
        );
        match (self.color, errors) {
            (false, _) => summary,
            (true, 0) => summary.green().to_string(),
            (true, _) => summary.red().to_string(),
        }
    }
}

fn outcome_json(outcome: &Outcome) -> Value {
    match &outcome.result {
        Ok(answer) => json!({
            "subject": outcome.subject,
            "ok": answer_json(answer),
        }),
        Err(err) => json!({
            "subject": outcome.subject,
            "error": { "code": err.code(), "message": err.to_string() },
        }),
    }
}

fn answer_json(answer: &Answer) -> Value {
    match answer {
        Answer::Declared => Value::Bool(true),
        Answer::Keys(keys) => json!(keys),
        Answer::FieldType(ty) => json!({ "type": ty }),
        Answer::Value(value) => value.clone(),
        Answer::Matches(b) | Answer::Subtype(b) => Value::Bool(*b),
    }
}
