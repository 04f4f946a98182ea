//! Line command grammar.

use std::str::FromStr;

use so_core::form::{FieldName, FormError};
use so_core::ids::{CelebrityId, RequestId};
use so_core::marketplace::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    View,
    Set { field: FieldName, value: String },
    Signup,
    Login,
    Submit,
    EditProfile,
    Cancel,
    Logout,
    /// Switch to the marketplace flow.
    Market,
    /// Switch to the auth/profile flow.
    Auth,
    Role(Role),
    Browse,
    Pick(CelebrityId),
    Request,
    Requests,
    Accept(RequestId),
    Reject { id: RequestId, reason: String },
    Record(RequestId),
    Send,
    Family,
    Share,
    Back,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("unknown role: {0} (expected fan or celebrity)")]
    UnknownRole(String),
    #[error(transparent)]
    Field(#[from] FormError),
}

pub const HELP: &str = "\
view                      print the active flow's snapshot
auth | market             switch between the auth/profile flow and the marketplace
set <field> <value>       edit a form field (is_celebrity takes true/false)
signup | login            toggle between the registration and sign-in screens
submit                    submit the active form
edit-profile | cancel     open or leave the profile editor
role fan|celebrity        pick a marketplace role on the home screen
browse | pick <id>        list celebrities, open the request form for one
request                   send the request form
requests                  reload placed or received requests
accept <id>               accept a pending request
reject <id> [reason]      reject a pending request
record <id> | send        record and send the video for an accepted request
family | share            record a family video and get its share link
back                      go back one screen
logout | quit             sign out, leave the shell";

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::View => "view",
            Command::Set { .. } => "set",
            Command::Signup => "signup",
            Command::Login => "login",
            Command::Submit => "submit",
            Command::EditProfile => "edit-profile",
            Command::Cancel => "cancel",
            Command::Logout => "logout",
            Command::Market => "market",
            Command::Auth => "auth",
            Command::Role(_) => "role",
            Command::Browse => "browse",
            Command::Pick(_) => "pick",
            Command::Request => "request",
            Command::Requests => "requests",
            Command::Accept(_) => "accept",
            Command::Reject { .. } => "reject",
            Command::Record(_) => "record",
            Command::Send => "send",
            Command::Family => "family",
            Command::Share => "share",
            Command::Back => "back",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }
}

/// Splits off the first whitespace-delimited word.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(at) => (&input[..at], input[at..].trim_start()),
        None => (input, ""),
    }
}

/// Everything after the field name and one separator, untouched.
fn field_value(rest: &str) -> &str {
    let (field, _) = split_word(rest);
    let after = rest.trim_start()[field.len()..].chars();
    let mut value = after.clone();
    match value.next() {
        Some(c) if c.is_whitespace() => value.as_str(),
        _ => after.as_str(),
    }
}

fn required<'a>(
    rest: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    let (word, _) = split_word(rest);
    if word.is_empty() {
        Err(CommandError::MissingArgument { command, argument })
    } else {
        Ok(word)
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (word, rest) = split_word(line);
        let command = match word.to_ascii_lowercase().as_str() {
            "" => return Err(CommandError::Empty),
            "view" => Command::View,
            "set" => {
                let field = required(rest, "set", "a field name")?;
                Command::Set {
                    field: field.parse()?,
                    value: field_value(rest).to_string(),
                }
            }
            "signup" => Command::Signup,
            "login" => Command::Login,
            "submit" => Command::Submit,
            "edit-profile" => Command::EditProfile,
            "cancel" => Command::Cancel,
            "logout" => Command::Logout,
            "market" => Command::Market,
            "auth" => Command::Auth,
            "role" => match required(rest, "role", "fan or celebrity")? {
                "fan" => Command::Role(Role::Fan),
                "celebrity" => Command::Role(Role::Celebrity),
                other => return Err(CommandError::UnknownRole(other.to_string())),
            },
            "browse" => Command::Browse,
            "pick" => Command::Pick(CelebrityId::from(required(rest, "pick", "a celebrity id")?)),
            "request" => Command::Request,
            "requests" => Command::Requests,
            "accept" => Command::Accept(RequestId::from(required(rest, "accept", "a request id")?)),
            "reject" => {
                let id = required(rest, "reject", "a request id")?;
                let (_, reason) = split_word(rest);
                Command::Reject {
                    id: RequestId::from(id),
                    reason: reason.trim_end().to_string(),
                }
            }
            "record" => Command::Record(RequestId::from(required(rest, "record", "a request id")?)),
            "send" => Command::Send,
            "family" => Command::Family,
            "share" => Command::Share,
            "back" => Command::Back,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}
