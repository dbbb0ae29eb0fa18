use std::{ops::Range, path::PathBuf};

use async_trait::async_trait;

use animetrace_core::{
    Component, IncomingMessage, RecognitionModel,
    command::GROUP,
    prompter::{PromptError, Prompter},
};
use nu_ansi_term::{Color, Style};
use reedline::{default_emacs_keybindings, ColumnarMenu, Completer, DefaultPrompt, DefaultPromptSegment, Emacs, Highlighter, KeyCode, KeyModifiers, MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu, Signal, Span, StyledText, Suggestion};

const SUBCOMMANDS: [(&str, &str); 5] = [
    ("recognize", "recognize characters in an image"),
    ("model", "set the default model"),
    ("ai", "1: AI detection on, 2: off"),
    ("num", "number of matches to show (1-10)"),
    ("help", "show usage"),
];

/// Reads chat messages from the terminal.
///
/// Images are attached with `@path` or `@"path with spaces"`; an `@https://...` token
/// attaches a remote image instead. Attachment tokens are removed from the message text.
#[derive(Debug, Clone, Default)]
pub struct ConsolePrompter {
    base_dir: Option<PathBuf>,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative attachment paths are resolved against `dir`.
    pub fn with_base_dir(self, dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    /// Finds attachment tokens. Each entry holds the ranges of the opening marker
    /// (`@` or `@"`), the target, and the closing marker (empty or `"`).
    pub fn isolate_attachments(input: &str) -> Vec<(Range<usize>, Range<usize>, Range<usize>)> {
        let mut result = vec![];

        let mut search_from = 0;
        while let Some(start) = input[search_from..].find('@').map(|i| i + search_from) {
            // Only a word may start with '@', so addresses like user@host stay text
            if start > 0 && !input[..start].ends_with(char::is_whitespace) {
                search_from = start + 1;
                continue;
            }

            if input[start + 1..].starts_with('"') {
                // Quoted target, look for the closing quotation mark
                match input[start + 2..].find('"').map(|i| i + start + 2) {
                    Some(end) => {
                        if end > start + 2 {
                            result.push((start..start + 2, start + 2..end, end..end + 1));
                        }
                        search_from = end + 1;
                    }
                    None => return result,
                }
            } else {
                let end = input[start..]
                    .find(char::is_whitespace)
                    .map(|i| i + start)
                    .unwrap_or(input.len());
                if end > start + 1 {
                    result.push((start..start + 1, start + 1..end, end..end));
                }
                search_from = end;
            }
        }
        result
    }

    /// Turns a raw input line into a chat message.
    pub fn parse_input(&self, line: &str) -> IncomingMessage {
        let mut components = vec![];
        let mut text = String::new();
        let mut last_end = 0;

        for (prefix, target, suffix) in Self::isolate_attachments(line) {
            text.push_str(&line[last_end..prefix.start]);
            let target = &line[target];
            if target.starts_with("http://") || target.starts_with("https://") {
                components.push(Component::image_url(target));
            } else {
                components.push(Component::image_file(self.resolve(target)));
            }
            last_end = suffix.end;
        }
        text.push_str(&line[last_end..]);

        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            components.insert(0, Component::plain(text.clone()));
        }
        IncomingMessage::new(components, text)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.join(path),
            None => PathBuf::from(path),
        }
    }
}

#[async_trait]
impl Prompter for ConsolePrompter {
    async fn prompt(&self, message: &str) -> Result<IncomingMessage, PromptError> {
        // Use the interactive menu to select options from the completer
        let completion_menu = Box::new(ColumnarMenu::default().with_name("completion_menu"));

        // Set up keybindings
        // TAB to select completion
        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu("completion_menu".to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );
        // ESC to cancel
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Esc,
            ReedlineEvent::CtrlC,
        );

        let edit_mode = Box::new(Emacs::new(keybindings));

        let mut line_editor = Reedline::create()
            .with_completer(Box::new(CommandCompleter))
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_edit_mode(edit_mode)
            .with_highlighter(Box::new(InputHighlighter));

        let prompt = DefaultPrompt {
            left_prompt: DefaultPromptSegment::Basic(message.to_string()),
            right_prompt: DefaultPromptSegment::Empty,
        };

        let line = tokio::task::spawn_blocking(move || {
            match line_editor.read_line(&prompt) {
                Ok(Signal::Success(line)) => Ok(line),
                Ok(Signal::CtrlD) => Err(PromptError::Canceled),
                Ok(Signal::CtrlC) => Err(PromptError::Canceled),
                Err(err) => Err(PromptError::Io(err)),
            }
        }).await??;

        let incoming = self.parse_input(&line);
        for (url, file) in incoming.images() {
            tracing::debug!(?url, ?file, "Attached image");
        }
        Ok(incoming)
    }
}

/// Completes `/anime` subcommands and model names.
struct CommandCompleter;

impl CommandCompleter {
    fn suggestion(value: &str, description: &str, pos: usize, partial: &str) -> Suggestion {
        Suggestion {
            value: value.to_string(),
            description: Some(description.to_string()),
            style: None,
            extra: None,
            span: Span {
                start: pos - partial.len(),
                end: pos,
            },
            append_whitespace: true,
            ..Default::default()
        }
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let before = line[..pos].trim_start();
        let Some(rest) = before
            .strip_prefix('/')
            .unwrap_or(before)
            .strip_prefix(GROUP)
            .and_then(|rest| rest.strip_prefix(' '))
        else {
            return vec![];
        };

        let words: Vec<&str> = rest.split(' ').collect();
        match words.as_slice() {
            [partial] => SUBCOMMANDS
                .iter()
                .filter(|(name, _)| name.starts_with(partial))
                .map(|(name, description)| Self::suggestion(name, description, pos, partial))
                .collect(),
            ["model" | "模型", partial] => RecognitionModel::ALL
                .iter()
                .filter(|model| model.as_str().starts_with(partial))
                .map(|model| Self::suggestion(model.as_str(), model.description(), pos, partial))
                .collect(),
            _ => vec![],
        }
    }
}

/// Colors the `/anime` prefix and attachment tokens.
struct InputHighlighter;

impl InputHighlighter {
    fn command_prefix(line: &str) -> Option<Range<usize>> {
        let start = line.len() - line.trim_start().len();
        let body = &line[start..];
        let slash = usize::from(body.starts_with('/'));
        let after = body[slash..].strip_prefix(GROUP)?;
        if after.is_empty() || after.starts_with(char::is_whitespace) {
            Some(start..start + slash + GROUP.len())
        } else {
            None
        }
    }
}

impl Highlighter for InputHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let command = Style {
            foreground: Some(Color::Green),
            is_bold: true,
            ..Default::default()
        };
        let attachment = Style {
            foreground: Some(Color::Cyan),
            ..Default::default()
        };

        let mut ranges = vec![];
        if let Some(prefix) = Self::command_prefix(line) {
            ranges.push((command, prefix));
        }
        for (open, _, close) in ConsolePrompter::isolate_attachments(line) {
            ranges.push((attachment, open.start..close.end));
        }

        let mut buffer = vec![];
        let mut last_end = 0;
        for (style, range) in ranges {
            if range.start < last_end {
                continue;
            }
            buffer.push((Style::default(), line[last_end..range.start].to_string()));
            buffer.push((style, line[range.clone()].to_string()));
            last_end = range.end;
        }
        buffer.push((Style::default(), line[last_end..].to_string()));
        StyledText { buffer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(input: &str) -> Vec<&str> {
        ConsolePrompter::isolate_attachments(input)
            .into_iter()
            .map(|(_, target, _)| &input[target])
            .collect()
    }

    #[test]
    fn isolates_plain_and_quoted_attachments() {
        assert_eq!(targets("/anime recognize @cat.png"), vec!["cat.png"]);
        assert_eq!(targets("@a.png and @\"my pics/b c.jpg\" @d.gif"), vec!["a.png", "my pics/b c.jpg", "d.gif"]);
        assert!(targets("mail me at me@example.com").is_empty());
        assert!(targets("lonely @ sign").is_empty());
        assert!(targets("@\"unterminated").is_empty());
        assert!(targets("empty @\"\" quotes").is_empty());
    }

    #[test]
    fn ranges_cover_markers() {
        let input = "x @\"a b\" y";
        let found = ConsolePrompter::isolate_attachments(input);
        assert_eq!(found, vec![(2..4, 4..7, 7..8)]);
    }

    #[test]
    fn parse_input_builds_message() {
        let prompter = ConsolePrompter::new().with_base_dir("/pics");
        let message = prompter.parse_input("/anime   recognize @cat.png @https://x/y.png");

        assert_eq!(message.text, "/anime recognize");
        assert_eq!(
            message.components,
            vec![
                Component::plain("/anime recognize"),
                Component::image_file("/pics/cat.png"),
                Component::image_url("https://x/y.png"),
            ]
        );
    }

    #[test]
    fn parse_input_without_attachments() {
        let message = ConsolePrompter::new().parse_input("  /anime num 5 ");
        assert_eq!(message.text, "/anime num 5");
        assert_eq!(message.images().count(), 0);
    }

    #[test]
    fn completes_subcommands_and_models() {
        let mut completer = CommandCompleter;
        let values = |s: Vec<Suggestion>| s.into_iter().map(|s| s.value).collect::<Vec<_>>();

        assert_eq!(values(completer.complete("/anime m", 8)), vec!["model"]);
        assert_eq!(values(completer.complete("/anime ", 7)).len(), 5);
        assert_eq!(
            values(completer.complete("/anime model an", 15)),
            vec!["anime_model_lovelive", "anime"]
        );
        assert!(completer.complete("hello", 5).is_empty());

        let suggestion = &completer.complete("/anime re", 9)[0];
        assert_eq!(suggestion.span, Span { start: 7, end: 9 });
    }

    #[test]
    fn highlights_prefix_and_attachments() {
        let line = "/anime recognize @a.png";
        let styled = InputHighlighter.highlight(line, 0);
        let pieces: Vec<&str> = styled.buffer.iter().map(|(_, text)| text.as_str()).collect();
        assert_eq!(pieces, vec!["", "/anime", " recognize ", "@a.png", ""]);
        assert_eq!(styled.buffer.iter().map(|(_, t)| t.as_str()).collect::<String>(), line);
    }
}
