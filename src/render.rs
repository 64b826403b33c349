//! Markdown export and terminal display of a brief.

use crate::brief::{Brief, BriefSections, SectionKey, SectionValue};
use crate::prompt::BriefRequest;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// File name offered for the markdown download
pub const EXPORT_FILE_NAME: &str = "connection_prep_brief.md";

const TITLE: &str = "Connection Prep Brief";

/// Render a brief as a markdown document.
///
/// Every requested section gets a heading even when empty; sections that were
/// switched off never appear, whatever the generator returned.
pub fn to_markdown(brief: &Brief, goal: &str, request: &BriefRequest) -> String {
    let mut out = format!("# {TITLE}\n\n");
    if !goal.trim().is_empty() {
        out.push_str(&format!("**Meeting goal:** {}\n\n", goal.trim()));
    }

    match brief {
        Brief::Raw(text) => {
            out.push_str(text);
            if !text.ends_with('\n') {
                out.push('\n');
            }
        }
        Brief::Sections(sections) => {
            for key in request.requested_sections() {
                out.push_str(&format!("## {}\n\n", key.heading()));
                push_section_body(&mut out, sections, key);
            }
        }
    }
    out
}

fn push_section_body(out: &mut String, sections: &BriefSections, key: SectionKey) {
    match sections.get(key) {
        Some(SectionValue::Bullets(items)) => {
            for item in items {
                out.push_str(&format!("- {item}\n"));
            }
            out.push('\n');
        }
        Some(SectionValue::Text(text)) => {
            out.push_str(text);
            out.push_str("\n\n");
        }
        None => {}
    }
}

/// Where the export goes: the given path, or the default name inside a directory
pub fn export_path(output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(EXPORT_FILE_NAME),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(EXPORT_FILE_NAME),
    }
}

/// Write the markdown document
pub fn write_markdown(path: &Path, markdown: &str) -> std::io::Result<()> {
    std::fs::write(path, markdown)
}

/// Print a brief to the terminal
pub fn print_brief(brief: &Brief, goal: &str, request: &BriefRequest) {
    println!("\n📄 {}\n", TITLE.bold());
    if !goal.trim().is_empty() {
        println!("🎯 {} {}\n", "Meeting goal:".bold(), goal.trim());
    }

    match brief {
        Brief::Raw(text) => {
            println!(
                "{}",
                "(the model did not return structured sections; showing its output as-is)".dimmed()
            );
            println!("\n{}", text);
        }
        Brief::Sections(sections) => {
            for key in request.requested_sections() {
                println!("{} {}", icon(key), key.heading().cyan().bold());
                match sections.get(key) {
                    Some(SectionValue::Bullets(items)) => {
                        for item in items {
                            println!("  • {}", item);
                        }
                    }
                    Some(SectionValue::Text(text)) => {
                        for line in text.lines() {
                            println!("  {}", line);
                        }
                    }
                    None => println!("  {}", "-".dimmed()),
                }
                println!();
            }
        }
    }
}

fn icon(key: SectionKey) -> &'static str {
    match key {
        SectionKey::ProfileSnapshot => "👤",
        SectionKey::TopSkills => "🛠️ ",
        SectionKey::DomainKnowledge => "📚",
        SectionKey::MutualInterests => "🤝",
        SectionKey::TalkingPoints => "💬",
        SectionKey::Icebreakers => "🧊",
        SectionKey::OpeningQuestion => "❓",
        SectionKey::SampleOutreachMessage => "✉️ ",
        SectionKey::EmailSubject => "📨",
        SectionKey::MeetingAgenda => "🗓️ ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(include_agenda: bool, include_outreach: bool) -> BriefRequest {
        BriefRequest {
            max_bullets: 5,
            include_agenda,
            include_outreach,
        }
    }

    fn sample_sections() -> BriefSections {
        let mut sections = BriefSections::new();
        sections.insert(
            SectionKey::ProfileSnapshot,
            SectionValue::Text("Senior PM, fintech".into()),
        );
        sections.insert(
            SectionKey::TopSkills,
            SectionValue::Bullets(vec!["SQL".into(), "Roadmapping".into()]),
        );
        sections.insert(
            SectionKey::MeetingAgenda,
            SectionValue::Bullets(vec!["Intros".into()]),
        );
        sections
    }

    #[test]
    fn markdown_has_fixed_headings() {
        let md = to_markdown(
            &Brief::Sections(sample_sections()),
            "Partnership intro",
            &request(true, false),
        );
        let expected = "\
# Connection Prep Brief

**Meeting goal:** Partnership intro

## Snapshot

Senior PM, fintech

## Top Skills

- SQL
- Roadmapping

## Domain Knowledge

## Mutual Interests

## Talking Points

## Icebreakers

## Opening Question

## Suggested Agenda

- Intros

";
        assert_eq!(md, expected);
    }

    #[test]
    fn agenda_never_rendered_when_disabled() {
        let md = to_markdown(&Brief::Sections(sample_sections()), "", &request(false, true));
        assert!(!md.contains("Agenda"));
        assert!(!md.contains("Intros"));
        assert!(md.contains("## Sample Outreach Message"));
        assert!(md.contains("## Email Subject"));
    }

    #[test]
    fn raw_brief_is_kept_verbatim() {
        let raw = "Alex runs growth.\n\n* ask about {pricing}";
        let md = to_markdown(&Brief::Raw(raw.into()), "", &request(true, true));
        assert_eq!(md, format!("# Connection Prep Brief\n\n{raw}\n"));
    }

    #[test]
    fn export_path_defaults_to_brief_name() {
        assert_eq!(export_path(None), PathBuf::from(EXPORT_FILE_NAME));
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(export_path(Some(dir.path())), dir.path().join(EXPORT_FILE_NAME));
        let file = dir.path().join("alex.md");
        assert_eq!(export_path(Some(&file)), file);
    }

    #[test]
    fn markdown_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_path(Some(dir.path()));
        write_markdown(&path, "# hi\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# hi\n");
    }
}
