//! Collecting the user's inputs: pasted profile text, recent posts and a meeting goal.

use dialoguer::Input;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to extract text from PDF {path}: {message}")]
    Pdf { path: String, message: String },
    #[error("failed to read from stdin: {0}")]
    Stdin(std::io::Error),
    #[error("editor failed: {0}")]
    Editor(std::io::Error),
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// One submission. Nothing in it is stored anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBundle {
    pub profile_text: String,
    pub posts_text: String,
    pub meeting_goal: String,
}

impl InputBundle {
    pub fn new(
        profile_text: impl Into<String>,
        posts_text: impl Into<String>,
        meeting_goal: impl Into<String>,
    ) -> Self {
        Self {
            profile_text: profile_text.into(),
            posts_text: posts_text.into(),
            meeting_goal: meeting_goal.into(),
        }
    }

    /// True when neither profile nor posts carry any text
    pub fn is_empty(&self) -> bool {
        self.profile_text.trim().is_empty() && self.posts_text.trim().is_empty()
    }
}

const EDITOR_TEMPLATE: &str = "\
# Paste the person's About / Headline / Experience text below.
# Lines starting with '#' are ignored.
";

/// Read text from a file; PDFs (e.g. a saved profile) go through text extraction
pub fn read_text_file(path: &Path) -> Result<String, InputError> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        return pdf_extract::extract_text(path).map_err(|e| InputError::Pdf {
            path: path.display().to_string(),
            message: e.to_string(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Read everything piped to stdin
pub fn read_stdin() -> Result<String, InputError> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(InputError::Stdin)?;
    Ok(buffer)
}

/// Whether stdin is an interactive terminal
pub fn stdin_is_terminal() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Open `$EDITOR` so the user can paste profile text
pub fn profile_from_editor() -> Result<String, InputError> {
    let edited = edit::edit(EDITOR_TEMPLATE).map_err(InputError::Editor)?;
    Ok(strip_comment_lines(&edited))
}

/// Ask for the meeting goal on the terminal; empty is allowed
pub fn prompt_goal() -> Result<String, InputError> {
    let goal: String = Input::new()
        .with_prompt("Meeting goal (optional)")
        .allow_empty(true)
        .interact_text()?;
    Ok(goal.trim().to_string())
}

fn strip_comment_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bundle_emptiness_ignores_goal() {
        assert!(InputBundle::new(" ", "\n", "Intro call").is_empty());
        assert!(!InputBundle::new("PM", "", "").is_empty());
        assert!(!InputBundle::new("", "a post", "").is_empty());
    }

    #[test]
    fn reads_plain_text_files() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "Head of Data at Acme").unwrap();
        assert_eq!(read_text_file(file.path()).unwrap(), "Head of Data at Acme");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_text_file(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }

    #[test]
    fn broken_pdf_is_reported() {
        let mut file = tempfile::Builder::new().suffix(".PDF").tempfile().unwrap();
        write!(file, "not really a pdf").unwrap();
        assert!(matches!(read_text_file(file.path()), Err(InputError::Pdf { .. })));
    }

    #[test]
    fn editor_comments_are_dropped() {
        let text = format!("{EDITOR_TEMPLATE}Staff engineer.\n  # note\nLoves Rust.\n");
        assert_eq!(strip_comment_lines(&text), "Staff engineer.\nLoves Rust.");
    }
}
