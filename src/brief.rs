//! Brief types - the structured (or raw) output of synthesis.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// The fixed set of sections a brief can hold, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKey {
    ProfileSnapshot,
    TopSkills,
    DomainKnowledge,
    MutualInterests,
    TalkingPoints,
    Icebreakers,
    OpeningQuestion,
    SampleOutreachMessage,
    EmailSubject,
    MeetingAgenda,
}

impl SectionKey {
    pub const ALL: [SectionKey; 10] = [
        SectionKey::ProfileSnapshot,
        SectionKey::TopSkills,
        SectionKey::DomainKnowledge,
        SectionKey::MutualInterests,
        SectionKey::TalkingPoints,
        SectionKey::Icebreakers,
        SectionKey::OpeningQuestion,
        SectionKey::SampleOutreachMessage,
        SectionKey::EmailSubject,
        SectionKey::MeetingAgenda,
    ];

    /// JSON key the generator is asked to use
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKey::ProfileSnapshot => "profile_snapshot",
            SectionKey::TopSkills => "top_skills",
            SectionKey::DomainKnowledge => "domain_knowledge",
            SectionKey::MutualInterests => "mutual_interests",
            SectionKey::TalkingPoints => "talking_points",
            SectionKey::Icebreakers => "icebreakers",
            SectionKey::OpeningQuestion => "opening_question",
            SectionKey::SampleOutreachMessage => "sample_outreach_message",
            SectionKey::EmailSubject => "email_subject",
            SectionKey::MeetingAgenda => "meeting_agenda",
        }
    }

    /// Markdown heading
    pub fn heading(self) -> &'static str {
        match self {
            SectionKey::ProfileSnapshot => "Snapshot",
            SectionKey::TopSkills => "Top Skills",
            SectionKey::DomainKnowledge => "Domain Knowledge",
            SectionKey::MutualInterests => "Mutual Interests",
            SectionKey::TalkingPoints => "Talking Points",
            SectionKey::Icebreakers => "Icebreakers",
            SectionKey::OpeningQuestion => "Opening Question",
            SectionKey::SampleOutreachMessage => "Sample Outreach Message",
            SectionKey::EmailSubject => "Email Subject",
            SectionKey::MeetingAgenda => "Suggested Agenda",
        }
    }

    /// Whether the section is a bullet list rather than a single string
    pub fn is_list(self) -> bool {
        matches!(
            self,
            SectionKey::TopSkills
                | SectionKey::DomainKnowledge
                | SectionKey::MutualInterests
                | SectionKey::TalkingPoints
                | SectionKey::Icebreakers
                | SectionKey::MeetingAgenda
        )
    }

    /// Sections that only appear when outreach output was requested
    pub fn is_outreach(self) -> bool {
        matches!(
            self,
            SectionKey::SampleOutreachMessage | SectionKey::EmailSubject
        )
    }

    /// Map a key as a model might spell it onto a section.
    ///
    /// Case, spaces and hyphens are ignored, and the names older prompts used
    /// (`sample_dm`, `agenda`, ...) are accepted.
    pub fn parse(raw: &str) -> Option<SectionKey> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        let key = match normalized.as_str() {
            "profile_snapshot" | "snapshot" | "profile" => SectionKey::ProfileSnapshot,
            "top_skills" | "skills" => SectionKey::TopSkills,
            "domain_knowledge" | "domain" => SectionKey::DomainKnowledge,
            "mutual_interests" | "shared_interests" => SectionKey::MutualInterests,
            "talking_points" => SectionKey::TalkingPoints,
            "icebreakers" | "ice_breakers" => SectionKey::Icebreakers,
            "opening_question" => SectionKey::OpeningQuestion,
            "sample_outreach_message" | "outreach_message" | "sample_dm" | "sample_message" => {
                SectionKey::SampleOutreachMessage
            }
            "email_subject" | "subject" => SectionKey::EmailSubject,
            "meeting_agenda" | "agenda" | "suggested_agenda" => SectionKey::MeetingAgenda,
            _ => return None,
        };
        Some(key)
    }
}

impl Serialize for SectionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A section's content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SectionValue {
    Text(String),
    Bullets(Vec<String>),
}

impl SectionValue {
    pub fn is_empty(&self) -> bool {
        match self {
            SectionValue::Text(text) => text.is_empty(),
            SectionValue::Bullets(items) => items.is_empty(),
        }
    }
}

/// Parsed brief sections. Sections the model did not return are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BriefSections {
    sections: BTreeMap<SectionKey, SectionValue>,
}

impl BriefSections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: SectionKey, value: SectionValue) {
        self.sections.insert(key, value);
    }

    pub fn get(&self, key: SectionKey) -> Option<&SectionValue> {
        self.sections.get(&key)
    }

    /// Text of a single-string section, empty when absent
    pub fn text(&self, key: SectionKey) -> &str {
        match self.sections.get(&key) {
            Some(SectionValue::Text(text)) => text,
            _ => "",
        }
    }

    /// Items of a list section, empty when absent
    pub fn bullets(&self, key: SectionKey) -> &[String] {
        match self.sections.get(&key) {
            Some(SectionValue::Bullets(items)) => items,
            _ => &[],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionKey, &SectionValue)> {
        self.sections.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// The result of synthesis: structured sections, or the generator's text
/// verbatim when it could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum Brief {
    Sections(BriefSections),
    Raw(String),
}

impl Brief {
    pub fn sections(&self) -> Option<&BriefSections> {
        match self {
            Brief::Sections(sections) => Some(sections),
            Brief::Raw(_) => None,
        }
    }
}
