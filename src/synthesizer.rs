//! Brief synthesis: prompt, one generation call, structured extraction.

use crate::brief::{Brief, BriefSections, SectionKey, SectionValue};
use crate::capability::{CapabilityError, Generate};
use crate::extract::{self, strip_list_marker, JsonObject};
use crate::prompt::{self, BriefRequest};
use serde_json::Value;
use tracing::{debug, warn};

/// Turns summaries and a meeting goal into a [`Brief`]
pub struct BriefSynthesizer<'a> {
    capability: &'a dyn Generate,
    max_output_length: u32,
}

impl<'a> BriefSynthesizer<'a> {
    pub fn new(capability: &'a dyn Generate, max_output_length: u32) -> Self {
        Self {
            capability,
            max_output_length,
        }
    }

    /// Generate a brief.
    ///
    /// Only a failed generation call is an error; output that cannot be parsed
    /// comes back as [`Brief::Raw`].
    pub async fn synthesize(
        &self,
        profile_summary: &str,
        posts_summary: &str,
        goal: &str,
        request: &BriefRequest,
    ) -> Result<Brief, CapabilityError> {
        let prompt = prompt::build_prompt(profile_summary, posts_summary, goal, request);
        debug!(prompt_chars = prompt.len(), "requesting brief");

        let raw = self
            .capability
            .generate(&prompt, self.max_output_length, true)
            .await?;

        Ok(parse_brief(&raw, request))
    }
}

/// Parse generator output into sections, or keep it verbatim
pub fn parse_brief(raw: &str, request: &BriefRequest) -> Brief {
    match extract::extract_object(raw) {
        Some((object, strategy)) => {
            debug!(strategy, keys = object.len(), "parsed structured brief");
            Brief::Sections(sections_from_object(&object, request))
        }
        None => {
            warn!(chars = raw.len(), "generator output is not structured, keeping raw text");
            Brief::Raw(raw.to_string())
        }
    }
}

/// Coerce a parsed object into sections.
///
/// Unknown keys and sections that were not requested are dropped, list
/// sections are capped at `max_bullets` and empty values are treated as absent.
pub fn sections_from_object(object: &JsonObject, request: &BriefRequest) -> BriefSections {
    let mut sections = BriefSections::new();
    for (raw_key, value) in object {
        let Some(key) = SectionKey::parse(raw_key) else {
            debug!(key = %raw_key, "ignoring unknown section");
            continue;
        };
        if !request.wants(key) {
            continue;
        }
        // first spelling wins when a model repeats a section under an alias
        if sections.get(key).is_some() {
            continue;
        }
        if let Some(value) = coerce(key, value, request.max_bullets) {
            sections.insert(key, value);
        }
    }
    sections
}

fn coerce(key: SectionKey, value: &Value, max_bullets: usize) -> Option<SectionValue> {
    let coerced = if key.is_list() {
        let mut items = to_items(value);
        items.truncate(max_bullets);
        SectionValue::Bullets(items)
    } else {
        SectionValue::Text(to_text(value))
    };
    (!coerced.is_empty()).then_some(coerced)
}

/// Flatten a value into trimmed, non-empty list items
fn to_items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(values) => values
            .iter()
            .map(to_text)
            .filter(|item| !item.is_empty())
            .collect(),
        Value::String(text) => text
            .lines()
            .map(|line| strip_list_marker(line.trim()).trim().to_string())
            .filter(|line| !line.is_empty())
            .collect(),
        Value::Null => Vec::new(),
        other => vec![to_text(other)].into_iter().filter(|s| !s.is_empty()).collect(),
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Null => String::new(),
        Value::Array(values) => values
            .iter()
            .map(to_text)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {}", to_text(v)))
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Canned {
        reply: Result<String, ()>,
        prompts: Mutex<Vec<(String, u32, bool)>>,
    }

    impl Canned {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Generate for Canned {
        async fn generate(
            &self,
            prompt: &str,
            max_output_length: u32,
            deterministic: bool,
        ) -> Result<String, CapabilityError> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), max_output_length, deterministic));
            self.reply
                .clone()
                .map_err(|_| CapabilityError::Status { status: 503, body: "loading".into() })
        }
    }

    fn request(max_bullets: usize) -> BriefRequest {
        BriefRequest {
            max_bullets,
            include_agenda: true,
            include_outreach: true,
        }
    }

    #[tokio::test]
    async fn prose_wrapped_json_becomes_sections() {
        let gen = Canned::replying(
            r#"Here is the brief: {"profile_snapshot": "Senior PM, fintech", "top_skills": ["SQL","Roadmapping"]} Hope this helps!"#,
        );
        let brief = BriefSynthesizer::new(&gen, 400)
            .synthesize("p", "q", "g", &request(5))
            .await
            .unwrap();

        let sections = brief.sections().unwrap();
        assert_eq!(sections.text(SectionKey::ProfileSnapshot), "Senior PM, fintech");
        assert_eq!(sections.bullets(SectionKey::TopSkills), ["SQL", "Roadmapping"]);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections.text(SectionKey::OpeningQuestion), "");

        let prompts = gen.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].1, 400);
        assert!(prompts[0].2);
    }

    #[tokio::test]
    async fn prose_without_braces_is_raw() {
        let reply = "Alex is a product leader. Ask about their payments work.";
        let gen = Canned::replying(reply);
        let brief = BriefSynthesizer::new(&gen, 400)
            .synthesize("p", "q", "g", &request(5))
            .await
            .unwrap();
        assert_eq!(brief, Brief::Raw(reply.to_string()));
    }

    #[tokio::test]
    async fn broken_json_is_raw_and_verbatim() {
        let reply = "  {\"profile_snapshot\": \"unterminated }  ";
        let gen = Canned::replying(reply);
        let brief = BriefSynthesizer::new(&gen, 400)
            .synthesize("p", "q", "g", &request(5))
            .await
            .unwrap();
        assert_eq!(brief, Brief::Raw(reply.to_string()));
    }

    #[tokio::test]
    async fn generation_failure_is_an_error() {
        let gen = Canned::failing();
        let result = BriefSynthesizer::new(&gen, 400)
            .synthesize("p", "q", "g", &request(5))
            .await;
        assert!(matches!(result, Err(CapabilityError::Status { status: 503, .. })));
    }

    #[test]
    fn lists_are_capped_and_trimmed() {
        let raw = r#"{"talking_points": [" a ", "", "b", "c", "d", "e"], "icebreakers": "- one\n- two\n\n* three"}"#;
        let brief = parse_brief(raw, &request(3));
        let sections = brief.sections().unwrap();
        assert_eq!(sections.bullets(SectionKey::TalkingPoints), ["a", "b", "c"]);
        assert_eq!(sections.bullets(SectionKey::Icebreakers), ["one", "two", "three"]);
        for (_, value) in sections.iter() {
            if let SectionValue::Bullets(items) = value {
                assert!(items.len() <= 3);
            }
        }
    }

    #[test]
    fn string_lists_keep_leading_dashes_in_content() {
        let raw = r#"{"talking_points": "1. SQL\n-5% churn last quarter\n• Hiring"}"#;
        let brief = parse_brief(raw, &request(5));
        let sections = brief.sections().unwrap();
        assert_eq!(
            sections.bullets(SectionKey::TalkingPoints),
            ["SQL", "-5% churn last quarter", "Hiring"]
        );
    }

    #[test]
    fn disabled_sections_are_dropped() {
        let raw = r#"{"meeting_agenda": ["intro"], "sample_dm": "hi", "email_subject": "chat?", "opening_question": "why?"}"#;
        let request = BriefRequest {
            max_bullets: 5,
            include_agenda: false,
            include_outreach: false,
        };
        let brief = parse_brief(raw, &request);
        let sections = brief.sections().unwrap();
        assert!(sections.get(SectionKey::MeetingAgenda).is_none());
        assert!(sections.get(SectionKey::SampleOutreachMessage).is_none());
        assert!(sections.get(SectionKey::EmailSubject).is_none());
        assert_eq!(sections.text(SectionKey::OpeningQuestion), "why?");
    }

    #[test]
    fn scalar_values_are_coerced() {
        let raw = r#"{"profile_snapshot": ["Staff engineer", "Rust"], "top_skills": "Rust", "opening_question": 42, "domain_knowledge": null}"#;
        let brief = parse_brief(raw, &request(5));
        let sections = brief.sections().unwrap();
        assert_eq!(sections.text(SectionKey::ProfileSnapshot), "Staff engineer\nRust");
        assert_eq!(sections.bullets(SectionKey::TopSkills), ["Rust"]);
        assert_eq!(sections.text(SectionKey::OpeningQuestion), "42");
        assert!(sections.get(SectionKey::DomainKnowledge).is_none());
    }
}
