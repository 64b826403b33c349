//! Instruction prompt for the brief generator.

use crate::brief::SectionKey;

/// What the prompt should ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BriefRequest {
    pub max_bullets: usize,
    pub include_agenda: bool,
    pub include_outreach: bool,
}

impl BriefRequest {
    /// Sections the generator will be asked to produce
    pub fn requested_sections(&self) -> impl Iterator<Item = SectionKey> + '_ {
        SectionKey::ALL.into_iter().filter(|key| self.wants(*key))
    }

    pub fn wants(&self, key: SectionKey) -> bool {
        if key == SectionKey::MeetingAgenda {
            return self.include_agenda;
        }
        if key.is_outreach() {
            return self.include_outreach;
        }
        true
    }
}

fn section_instruction(key: SectionKey, bullets: usize) -> String {
    match key {
        SectionKey::ProfileSnapshot => {
            "a string of 2-3 short lines on seniority, domain and value focus".to_string()
        }
        SectionKey::TopSkills => format!("up to {bullets} short skill or tool names"),
        SectionKey::DomainKnowledge => format!("up to {bullets} industries or problem areas they know well"),
        SectionKey::MutualInterests => format!("up to {bullets} topics likely to interest both sides given the meeting goal"),
        SectionKey::TalkingPoints => format!("up to {bullets} actionable topics based on the posts and profile"),
        SectionKey::Icebreakers => format!("up to {bullets} friendly openers tailored to the person"),
        SectionKey::OpeningQuestion => "a string with one smart open-ended question".to_string(),
        SectionKey::SampleOutreachMessage => {
            "a string with a 2-3 sentence message requesting a short chat".to_string()
        }
        SectionKey::EmailSubject => "a string with a short email subject line for that message".to_string(),
        SectionKey::MeetingAgenda => format!("up to {bullets} agenda items for a 15-30 minute call"),
    }
}

/// Build the single instruction block sent to the generator.
///
/// Sections that were switched off are left out of the instructions entirely.
pub fn build_prompt(
    profile_summary: &str,
    posts_summary: &str,
    goal: &str,
    request: &BriefRequest,
) -> String {
    let bullets = request.max_bullets;
    let schema: Vec<String> = request
        .requested_sections()
        .map(|key| {
            let shape = if key.is_list() { "array of strings" } else { "string" };
            format!(
                "  \"{}\": {} - {}",
                key.as_str(),
                shape,
                section_instruction(key, bullets)
            )
        })
        .collect();

    format!(
        r#"You are a concise assistant creating a one-page connection/meeting brief for a professional networking call.
Use the inputs below. Keep language neutral, factual, and useful.

PROFILE_SUMMARY:
{profile}

POSTS_SUMMARY:
{posts}

MEETING_GOAL:
{goal}

You MUST respond with a single JSON object with exactly these keys:
{{
{schema}
}}

Lists must contain at most {bullets} items each.
If information is missing, be conservative and generic. Do not invent companies or facts.
Only output the raw JSON object, with no markdown formatting or explanations."#,
        profile = or_none(profile_summary),
        posts = or_none(posts_summary),
        goal = or_none(goal),
        schema = schema.join(",\n"),
    )
}

fn or_none(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        "(none provided)"
    } else {
        trimmed
    }
}
