use thiserror::Error;

/// Name of the command group all subcommands live under.
pub const GROUP: &str = "anime";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    /// Set how many matches are shown.
    Num(i64),
    /// Toggle AI detection: 1 on, 2 off.
    Ai(i64),
    Model(String),
    /// Run recognition; carries whatever text followed the subcommand.
    Recognize(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("Not an /anime command")]
    NotACommand,

    #[error("No subcommand given")]
    MissingSubcommand,

    #[error("Unknown subcommand '{0}'")]
    UnknownSubcommand(String),

    #[error("Subcommand '{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("Invalid number '{value}' for '{subcommand}'")]
    InvalidNumber { subcommand: &'static str, value: String },
}

impl Command {
    /// Parses a chat line such as `/anime num 5` or `anime 识图 https://...`.
    pub fn parse(input: &str) -> Result<Command, CommandParseError> {
        let input = input.trim();
        let rest = input.strip_prefix('/').unwrap_or(input);
        let rest = match rest.strip_prefix(GROUP) {
            Some(after) if after.is_empty() || after.starts_with(char::is_whitespace) => after.trim_start(),
            _ => return Err(CommandParseError::NotACommand),
        };

        let (subcommand, args) = split_word(rest);
        match subcommand {
            "" => Err(CommandParseError::MissingSubcommand),
            "help" | "帮助" => Ok(Command::Help),
            "num" => Ok(Command::Num(parse_number("num", args)?)),
            "ai" => Ok(Command::Ai(parse_number("ai", args)?)),
            "model" | "模型" => {
                let (name, _) = split_word(args);
                if name.is_empty() {
                    return Err(CommandParseError::MissingArgument("model"));
                }
                Ok(Command::Model(name.to_string()))
            }
            "recognize" | "识图" => Ok(Command::Recognize(args.to_string())),
            other => Err(CommandParseError::UnknownSubcommand(other.to_string())),
        }
    }
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn parse_number(subcommand: &'static str, args: &str) -> Result<i64, CommandParseError> {
    let (value, _) = split_word(args);
    if value.is_empty() {
        return Err(CommandParseError::MissingArgument(subcommand));
    }
    value.parse().map_err(|_| CommandParseError::InvalidNumber {
        subcommand,
        value: value.to_string(),
    })
}
