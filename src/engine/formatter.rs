//! Result Formatter：把执行结果渲染成给 LLM 的摘要
//!
//! 纯函数、无时钟无随机：同一结果序列永远产出同一摘要。
//! 每步一个块：用途做标题，按结果种类给出细节行；正文截断以控制 LLM 输入体积。

use crate::tools::{ExecutionResult, StepOutcome};

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        s.chars().take(max_chars).collect()
    } else {
        s.to_string()
    }
}

/// 渲染全部步骤结果为单个摘要字符串
pub fn format_results(results: &[ExecutionResult], body_preview_chars: usize) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (i, result) in results.iter().enumerate() {
        let purpose = if result.purpose.is_empty() {
            "Action"
        } else {
            result.purpose.as_str()
        };
        lines.push(format!("Step {}: {}", i + 1, purpose));

        match &result.outcome {
            StepOutcome::Emails(emails) => {
                if emails.is_empty() {
                    lines.push("  No emails found".to_string());
                }
                for email in emails {
                    let subject = if email.subject.is_empty() {
                        "No subject"
                    } else {
                        email.subject.as_str()
                    };
                    lines.push(format!("  Email: {}", subject));
                    lines.push(format!("    From: {}", email.from));
                    lines.push(format!("    Date: {}", email.date));
                    lines.push(format!(
                        "    Body: {}",
                        truncate_chars(&email.body, body_preview_chars)
                    ));
                }
            }

            StepOutcome::Events(events) => {
                if events.is_empty() {
                    lines.push("  No events found".to_string());
                }
                for event in events {
                    lines.push(format!("  Event: {}", event.title));
                    lines.push(format!("    Start: {}", event.start));
                    let location = if event.location.is_empty() {
                        "Not specified"
                    } else {
                        event.location.as_str()
                    };
                    lines.push(format!("    Location: {}", location));
                }
            }

            StepOutcome::EventCreated {
                title,
                date,
                start_time,
                ..
            } => {
                lines.push(format!("  Created: {} on {} at {}", title, date, start_time));
            }

            StepOutcome::EmailSent { to } => {
                lines.push(format!("  Email sent to {}", to));
            }

            StepOutcome::Failed { error, .. } => {
                lines.push(format!("  Error: {}", error));
            }
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::{CalendarEvent, EmailMessage};
    use crate::tools::ExecutionResult;

    fn email(subject: &str, from: &str, body: &str) -> EmailMessage {
        EmailMessage {
            id: "m".to_string(),
            subject: subject.to_string(),
            from: from.to_string(),
            date: "Mon, 3 Aug 2026".to_string(),
            snippet: String::new(),
            body: body.to_string(),
        }
    }

    fn event(title: &str, start: &str, location: &str) -> CalendarEvent {
        CalendarEvent {
            id: "e".to_string(),
            title: title.to_string(),
            start: start.to_string(),
            end: String::new(),
            location: location.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn digest_is_deterministic() {
        let results = vec![
            ExecutionResult::success(
                "Find dentist email",
                StepOutcome::Emails(vec![email("Reminder", "clinic@dental.com", "See you soon")]),
            ),
            ExecutionResult::success(
                "Check calendar",
                StepOutcome::Events(vec![event("Dentist", "2026-08-08T15:00:00", "12 Main St")]),
            ),
        ];
        assert_eq!(format_results(&results, 500), format_results(&results, 500));
    }

    #[test]
    fn full_digest_shape() {
        let results = vec![
            ExecutionResult::success(
                "Create the event",
                StepOutcome::EventCreated {
                    title: "Dentist".to_string(),
                    date: "2026-08-08".to_string(),
                    start_time: "15:00".to_string(),
                    id: "ev1".to_string(),
                },
            ),
            ExecutionResult::success(
                "Tell Sarah",
                StepOutcome::EmailSent {
                    to: "sarah@example.com".to_string(),
                },
            ),
        ];
        let digest = format_results(&results, 500);
        assert_eq!(
            digest,
            "Step 1: Create the event\n\
             \x20 Created: Dentist on 2026-08-08 at 15:00\n\
             Step 2: Tell Sarah\n\
             \x20 Email sent to sarah@example.com"
        );
    }

    #[test]
    fn empty_results_render_placeholders() {
        let results = vec![
            ExecutionResult::success("Search mail", StepOutcome::Emails(vec![])),
            ExecutionResult::success("", StepOutcome::Events(vec![])),
        ];
        let digest = format_results(&results, 500);
        assert!(digest.contains("Step 1: Search mail\n  No emails found"));
        assert!(digest.contains("Step 2: Action\n  No events found"));
    }

    #[test]
    fn body_is_truncated_to_preview_length() {
        let long_body = "x".repeat(2000);
        let results = vec![ExecutionResult::success(
            "Search",
            StepOutcome::Emails(vec![email("S", "a@b.com", &long_body)]),
        )];
        let digest = format_results(&results, 100);
        assert!(digest.contains(&"x".repeat(100)));
        assert!(!digest.contains(&"x".repeat(101)));
    }

    #[test]
    fn failure_renders_error_line() {
        let results = vec![ExecutionResult::failure("Send it", "HTTP 500")];
        assert_eq!(
            format_results(&results, 500),
            "Step 1: Send it\n  Error: HTTP 500"
        );
    }

    #[test]
    fn missing_subject_and_location_get_placeholders() {
        let results = vec![
            ExecutionResult::success(
                "Mail",
                StepOutcome::Emails(vec![email("", "a@b.com", "hi")]),
            ),
            ExecutionResult::success(
                "Cal",
                StepOutcome::Events(vec![event("Standup", "2026-08-07T09:00:00", "")]),
            ),
        ];
        let digest = format_results(&results, 500);
        assert!(digest.contains("Email: No subject"));
        assert!(digest.contains("Location: Not specified"));
    }
}
