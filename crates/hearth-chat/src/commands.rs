//! Interactive input parsing

use hearth_client::CredentialForm;

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(CredentialForm),
    Signup(CredentialForm),
    Submit(CredentialForm),
    Logout,
    ToggleMode,
    Help,
    Quit,
    /// Anything that is not a command is sent as a message
    Message(String),
    /// A slash command that could not be understood
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(rest) = line.trim_start().strip_prefix('/') else {
            return Self::Message(line.to_string());
        };

        let (name, args) = rest.split_once(' ').unwrap_or((rest, ""));
        match name.to_lowercase().as_str() {
            "login" => Self::Login(form(args)),
            "signup" => Self::Signup(form(args)),
            "submit" => Self::Submit(form(args)),
            "logout" => Self::Logout,
            "mode" => Self::ToggleMode,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => Self::Invalid(format!("Unknown command: /{other}")),
        }
    }
}

/// `<email> <password> [display name...]`; missing parts stay empty so the
/// client's own validation reports them
fn form(args: &str) -> CredentialForm {
    let (email, rest) = next_word(args);
    let (password, rest) = next_word(rest);
    CredentialForm::new(email, password).with_display_name(rest.trim())
}

/// First whitespace-separated word and whatever follows it
fn next_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    input.split_once(char::is_whitespace).unwrap_or((input, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(Command::parse("hello there\n"), Command::Message("hello there".into()));
        assert_eq!(Command::parse("   "), Command::Message("   ".into()));
    }

    #[test]
    fn test_credentials() {
        assert_eq!(
            Command::parse("/login a@x.com pw1"),
            Command::Login(CredentialForm::new("a@x.com", "pw1"))
        );
        assert_eq!(
            Command::parse("/signup a@x.com pw1 Ann Lee"),
            Command::Signup(CredentialForm::new("a@x.com", "pw1").with_display_name("Ann Lee"))
        );
        assert_eq!(
            Command::parse("/login a@x.com"),
            Command::Login(CredentialForm::new("a@x.com", ""))
        );
    }

    #[test]
    fn test_repeated_spaces_between_fields() {
        assert_eq!(
            Command::parse("/login a@x.com  pw1"),
            Command::Login(CredentialForm::new("a@x.com", "pw1"))
        );
        assert_eq!(
            Command::parse("/signup   a@x.com \t pw1   Ann  Lee "),
            Command::Signup(CredentialForm::new("a@x.com", "pw1").with_display_name("Ann  Lee"))
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(Command::parse("/logout"), Command::Logout);
        assert_eq!(Command::parse("/MODE"), Command::ToggleMode);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert!(matches!(Command::parse("/nope"), Command::Invalid(_)));
    }
}
