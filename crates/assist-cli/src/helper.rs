use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

/// Slash commands understood by the chat REPL.
pub const COMMANDS: [&str; 5] = ["/new", "/history", "/sources", "/help", "/quit"];

/// rustyline helper: slash-command completion, highlighting and hints.
#[derive(Clone, Default)]
pub struct ChatHelper;

impl ChatHelper {
    fn matching(&self, prefix: &str) -> Vec<&'static str> {
        if !prefix.starts_with('/') || prefix.contains(' ') {
            return Vec::new();
        }
        COMMANDS
            .iter()
            .copied()
            .filter(|cmd| cmd.starts_with(prefix))
            .collect()
    }

    fn hint_for(&self, prefix: &str) -> Option<String> {
        self.matching(prefix)
            .into_iter()
            .find(|cmd| cmd.len() > prefix.len())
            .map(|cmd| cmd[prefix.len()..].to_string())
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = self
            .matching(&line[..pos])
            .into_iter()
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        self.hint_for(&line[..pos])
    }
}

impl Validator for ChatHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_commands() {
        let helper = ChatHelper;
        assert_eq!(helper.matching("/h"), vec!["/history", "/help"]);
        assert_eq!(helper.matching("/"), COMMANDS.to_vec());
        assert!(helper.matching("最近").is_empty());
        assert!(helper.matching("/new x").is_empty());
    }

    #[test]
    fn test_hint() {
        let helper = ChatHelper;
        assert_eq!(helper.hint_for("/so").as_deref(), Some("urces"));
        assert_eq!(helper.hint_for("/quit"), None);
        assert_eq!(helper.hint_for("hello"), None);
    }
}
