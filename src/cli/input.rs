//! Interactive command parsing

use crate::application::SessionCommand;
use crate::domain::error::InvalidTemplateError;
use crate::domain::template::TemplateCatalog;

/// What a line typed in interactive mode asks for
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    Session(SessionCommand),
    Status,
    Help,
    InvalidTemplate(String),
    Unknown(String),
}

/// Parse one line of interactive input.
///
/// An empty line toggles recording; `t <id>` selects a template from the
/// catalog; `s` prints status; `h` or `?` prints help; `q` quits.
pub fn parse_line(line: &str, catalog: &TemplateCatalog) -> InputAction {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "" => InputAction::Session(SessionCommand::Toggle),
        "q" | "quit" | "exit" => InputAction::Session(SessionCommand::Quit),
        "s" | "status" => InputAction::Status,
        "h" | "help" | "?" => InputAction::Help,
        "t" | "template" => match catalog.resolve(rest) {
            Ok(id) => InputAction::Session(SessionCommand::SelectTemplate(id)),
            Err(InvalidTemplateError { .. }) if rest.is_empty() => {
                InputAction::InvalidTemplate(format!(
                    "Missing template id. Available templates: {}",
                    catalog.ids().join(", ")
                ))
            }
            Err(e) => InputAction::InvalidTemplate(e.to_string()),
        },
        _ => InputAction::Unknown(line.to_string()),
    }
}
