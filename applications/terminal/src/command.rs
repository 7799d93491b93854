//! Line command parsing
//!
//! Indices typed by the user are 1-based; parsed commands carry 0-based indices.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add(Vec<PathBuf>),
    Folder(PathBuf),
    Remove(usize),
    Up(usize),
    Down(usize),
    Move { from: usize, to: usize },
    Shuffle,
    Play(Option<usize>),
    Stop,
    Repeat,
    /// Volume percentage (0-100)
    Volume(u8),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("")]
    Empty,

    #[error("Unknown command: {0} (type 'help' for a list)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

impl Command {
    /// Parse one input line
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let trimmed = line.trim();
        let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (trimmed, ""),
        };

        if verb.is_empty() {
            return Err(CommandError::Empty);
        }

        let args = split_args(rest);
        match verb.to_ascii_lowercase().as_str() {
            "list" | "ls" => no_args(&args, "list").map(|()| Command::List),
            "add" => {
                if args.is_empty() {
                    return Err(CommandError::Usage("add <path>..."));
                }
                Ok(Command::Add(args.into_iter().map(PathBuf::from).collect()))
            }
            "folder" => {
                let path = strip_quotes(rest);
                if path.is_empty() {
                    return Err(CommandError::Usage("folder <dir>"));
                }
                Ok(Command::Folder(PathBuf::from(path)))
            }
            "remove" | "rm" => one_index(&args, "remove <n>").map(Command::Remove),
            "up" => one_index(&args, "up <n>").map(Command::Up),
            "down" => one_index(&args, "down <n>").map(Command::Down),
            "move" | "mv" => match args.as_slice() {
                [from, to] => {
                    const USAGE: &str = "move <from> <to>";
                    Ok(Command::Move {
                        from: parse_index(from, USAGE)?,
                        to: parse_index(to, USAGE)?,
                    })
                }
                _ => Err(CommandError::Usage("move <from> <to>")),
            },
            "shuffle" => no_args(&args, "shuffle").map(|()| Command::Shuffle),
            "play" | "p" => match args.as_slice() {
                [] => Ok(Command::Play(None)),
                [index] => parse_index(index, "play [n]").map(|i| Command::Play(Some(i))),
                _ => Err(CommandError::Usage("play [n]")),
            },
            "stop" => no_args(&args, "stop").map(|()| Command::Stop),
            "repeat" => no_args(&args, "repeat").map(|()| Command::Repeat),
            "volume" | "vol" => match args.as_slice() {
                [level] => level
                    .parse::<u8>()
                    .ok()
                    .filter(|level| *level <= 100)
                    .map(Command::Volume)
                    .ok_or(CommandError::Usage("volume <0-100>")),
                _ => Err(CommandError::Usage("volume <0-100>")),
            },
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn no_args(args: &[String], usage: &'static str) -> Result<(), CommandError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandError::Usage(usage))
    }
}

fn one_index(args: &[String], usage: &'static str) -> Result<usize, CommandError> {
    match args {
        [index] => parse_index(index, usage),
        _ => Err(CommandError::Usage(usage)),
    }
}

/// Parse a 1-based index into a 0-based one
fn parse_index(arg: &str, usage: &'static str) -> Result<usize, CommandError> {
    arg.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or(CommandError::Usage(usage))
}

/// Split on whitespace, keeping double-quoted runs together
fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut started = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                started = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if started {
                    args.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }

    if started {
        args.push(current);
    }
    args
}

fn strip_quotes(input: &str) -> &str {
    input
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(input)
}
