//! Shell commands
//!
//! One command per input line. Cards are addressed by their 1-based position
//! in the list as last printed.

use std::fmt;

use gallery_core::{Layer, UiEvent};

/// A parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Forward an event that needs no lookup
    Event(UiEvent),
    /// Open the preview of the n-th card
    View(usize),
    /// Toggle the like of the n-th card
    Like(usize),
    /// Ask to remove the n-th card
    Remove(usize),
    /// Print the card list
    List,
    /// Print the command summary
    Help,
    /// Leave the shell
    Quit,
}

/// Why a line could not be parsed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseError {}

/// Summary printed by `help`
pub const HELP: &str = "\
commands:
  add | edit | avatar        open a form
  set <field> <value>        type into the open form
  submit                     submit the open form
  view|like|remove <n>       act on the n-th card
  confirm                    confirm a removal
  esc | backdrop | close     dismiss (close toast closes the error)
  list | help | quit";

impl Command {
    /// Parse one line; `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        let command = match word {
            "add" => Self::Event(UiEvent::AddCardClicked),
            "edit" => Self::Event(UiEvent::EditProfileClicked),
            "avatar" => Self::Event(UiEvent::ChangeAvatarClicked),
            "submit" => Self::Event(UiEvent::SubmitClicked),
            "confirm" => Self::Event(UiEvent::ConfirmClicked),
            "esc" => Self::Event(UiEvent::escape()),
            "backdrop" => Self::Event(UiEvent::BackdropClicked {
                layer: layer(rest)?,
            }),
            "close" => Self::Event(UiEvent::CloseClicked {
                layer: layer(rest)?,
            }),
            "set" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .map_or((rest, ""), |(f, v)| (f, v.trim()));
                if field.is_empty() {
                    return Err(ParseError("usage: set <field> <value>".to_string()));
                }
                Self::Event(UiEvent::field(field, value))
            }
            "view" => Self::View(position(word, rest)?),
            "like" => Self::Like(position(word, rest)?),
            "remove" => Self::Remove(position(word, rest)?),
            "list" | "ls" => Self::List,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(ParseError(format!("unknown command '{other}' (try help)"))),
        };
        Ok(Some(command))
    }
}

fn layer(arg: &str) -> Result<Layer, ParseError> {
    match arg {
        "" | "modal" => Ok(Layer::Modal),
        "toast" | "error" => Ok(Layer::Toast),
        other => Err(ParseError(format!("unknown layer '{other}'"))),
    }
}

fn position(word: &str, arg: &str) -> Result<usize, ParseError> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ParseError(format!("usage: {word} <n>, n counted from 1"))),
    }
}
