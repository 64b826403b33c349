//! In-process extractive summarizer.
//!
//! Scores sentences by the frequency of their content words and keeps the best
//! ones, in their original order, until the word budget is spent. No network,
//! no model weights, same output for the same input.

use crate::capability::{CapabilityError, Summarize};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

lazy_static! {
    static ref SENTENCE_END: Regex = Regex::new(r"[.!?]+[\s]+|\n{2,}|\n[-*•]\s*").unwrap();
    static ref WORD: Regex = Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'+#.-]*").unwrap();
    static ref STOP_WORDS: HashSet<&'static str> = [
        "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "has",
        "have", "he", "her", "his", "i", "in", "is", "it", "its", "me", "my", "of", "on", "or",
        "our", "she", "so", "that", "the", "their", "them", "they", "this", "to", "was", "we",
        "were", "will", "with", "you", "your",
    ]
    .into_iter()
    .collect();
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self
    }

    /// Pick sentences until roughly `max_words` words are kept; always keeps at
    /// least `min_words` if the text has that many
    pub fn extract(&self, text: &str, max_words: usize, min_words: usize) -> String {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return String::new();
        }

        let frequencies = word_frequencies(&sentences);
        let top = frequencies.values().copied().max().unwrap_or(1) as f64;

        let mut ranked: Vec<(usize, f64)> = sentences
            .iter()
            .enumerate()
            .map(|(index, sentence)| {
                let words = content_words(sentence);
                let score = if words.is_empty() {
                    0.0
                } else {
                    words
                        .iter()
                        .map(|w| frequencies.get(w).copied().unwrap_or(0) as f64 / top)
                        .sum::<f64>()
                        / words.len() as f64
                };
                (index, score)
            })
            .collect();
        // highest score first, earlier sentence wins ties
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut chosen = Vec::new();
        let mut used = 0usize;
        for (index, _) in ranked {
            let words = word_count(sentences[index]);
            if used >= min_words && used + words > max_words {
                continue;
            }
            chosen.push(index);
            used += words;
            if used >= max_words {
                break;
            }
        }
        chosen.sort_unstable();

        chosen
            .into_iter()
            .map(|index| sentences[index])
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl Summarize for ExtractiveSummarizer {
    async fn summarize(
        &self,
        text: &str,
        max_length: u32,
        min_length: u32,
    ) -> Result<String, CapabilityError> {
        Ok(self.extract(text, max_length as usize, min_length as usize))
    }
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut last = 0;
    for m in SENTENCE_END.find_iter(text) {
        // keep the terminal punctuation, drop the whitespace and bullet markers
        let kept = m
            .as_str()
            .trim_end_matches(|c: char| c.is_whitespace() || "-*•".contains(c));
        let end = m.start() + kept.len();
        push_sentence(&mut sentences, &text[last..end]);
        last = m.end();
    }
    push_sentence(&mut sentences, &text[last..]);
    sentences
}

fn push_sentence<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
    let trimmed = candidate
        .trim()
        .trim_start_matches(['-', '*', '•'])
        .trim_start();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

fn content_words(sentence: &str) -> Vec<String> {
    WORD.find_iter(sentence)
        .map(|m| m.as_str().trim_end_matches('.').to_lowercase())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w.as_str()))
        .collect()
}

fn word_frequencies(sentences: &[&str]) -> HashMap<String, usize> {
    let mut frequencies = HashMap::new();
    for sentence in sentences {
        for word in content_words(sentence) {
            *frequencies.entry(word).or_insert(0) += 1;
        }
    }
    frequencies
}

fn word_count(sentence: &str) -> usize {
    sentence.split_whitespace().count()
}
