//! Reply text formatting.

use crate::db::Task;
use crate::history::HistoryEntry;
use crate::localization::{t_args_lang, t_lang};
use crate::weather::WeatherReport;

/// Numbered list of open tasks; the numbers are the indices /done accepts.
pub fn format_task_list(tasks: &[Task], language_code: Option<&str>) -> String {
    let mut text = t_lang("task-list-header", language_code);
    for (i, task) in tasks.iter().enumerate() {
        text.push_str(&format!("\n{}. ☐ {}", i + 1, task.task));
    }
    text
}

/// Recent question/answer pairs, oldest first.
pub fn format_history(entries: &[HistoryEntry], language_code: Option<&str>) -> String {
    let mut text = t_lang("history-header", language_code);
    for (i, entry) in entries.iter().enumerate() {
        let answer_preview = first_line(&entry.response);
        text.push_str(&format!("\n{}. {}\n   ↳ {}", i + 1, entry.question, answer_preview));
    }
    text
}

/// Localized weather report.
pub fn format_weather(report: &WeatherReport, language_code: Option<&str>) -> String {
    t_args_lang(
        "weather-report",
        &[
            ("city", &report.city),
            ("description", &report.description),
            ("temp", &format!("{:.1}", report.temp_c)),
            ("feels", &format!("{:.1}", report.feels_like_c)),
            ("humidity", &report.humidity.to_string()),
            ("wind", &format!("{:.1}", report.wind_speed_ms)),
        ],
        language_code,
    )
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}
