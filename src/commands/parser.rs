use crate::constants::COMMAND_PREFIX;

/// A recognized `snoopy` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    SetChannel,
    WatchList,
    /// Raw channel argument, possibly empty
    WatchChannel(&'a str),
    UnwatchChannel(&'a str),
}

/// Match a message against the command set
///
/// Matching is literal and case-sensitive. Channel arguments are the rest
/// of the line, spaces included.
pub fn parse_command(content: &str) -> Option<Command<'_>> {
    let rest = content.strip_prefix(COMMAND_PREFIX)?;

    match rest {
        "help" => Some(Command::Help),
        "setchannel" => Some(Command::SetChannel),
        "watchlist" => Some(Command::WatchList),
        _ => {
            if let Some(argument) = argument_of(rest, "watchchannel") {
                Some(Command::WatchChannel(argument))
            } else {
                argument_of(rest, "unwatchchannel").map(Command::UnwatchChannel)
            }
        }
    }
}

/// Argument following `word`, empty when the word stands alone
fn argument_of<'a>(rest: &'a str, word: &str) -> Option<&'a str> {
    if rest == word {
        return Some("");
    }
    rest.strip_prefix(word)?.strip_prefix(' ')
}
