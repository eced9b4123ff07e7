use std::collections::BTreeMap;
use std::fmt;

use hurdle_core::model::{Answer, BossTask, ChoiceTask, MatchingTask, Task};

/// What the reader asked for on one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Answer(Answer),
    Skip,
    Ask(String),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    Empty,
    NotANumber(String),
    OutOfRange { choice: usize, options: usize },
    WrongCount { expected: usize, got: usize },
    BadPair(String),
    UnknownTerm(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Empty => write!(f, "nothing entered"),
            InputError::NotANumber(raw) => write!(f, "expected an option number, got {raw:?}"),
            InputError::OutOfRange { choice, options } => {
                write!(f, "option {choice} is not between 1 and {options}")
            }
            InputError::WrongCount { expected, got } => {
                write!(f, "expected {expected} answers, got {got}")
            }
            InputError::BadPair(raw) => write!(f, "expected term=definition, got {raw:?}"),
            InputError::UnknownTerm(term) => write!(f, "no term named {term:?}"),
        }
    }
}

impl std::error::Error for InputError {}

/// Interpret one line typed while `task` is on screen.
pub fn parse(line: &str, task: &Task) -> Result<Command, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(InputError::Empty);
    }
    if let Some(query) = line.strip_prefix('?') {
        let query = query.trim();
        if query.is_empty() {
            return Err(InputError::Empty);
        }
        return Ok(Command::Ask(query.to_owned()));
    }
    match line {
        ":skip" | "skip" => return Ok(Command::Skip),
        ":help" | "help" => return Ok(Command::Help),
        ":quit" | "quit" => return Ok(Command::Quit),
        _ => {}
    }

    let answer = match task {
        Task::Choice(choice) => choice_answer(line, choice)?,
        Task::Cloze(_) => Answer::Text(line.to_owned()),
        Task::Typing(_) => Answer::Typing {
            text: line.to_owned(),
        },
        Task::Highlight(_) => Answer::Highlight {
            phrases: split_list(line, ';'),
        },
        Task::Matching(matching) => matching_answer(line, matching)?,
        Task::Boss(boss) => boss_answer(line, boss)?,
    };
    Ok(Command::Answer(answer))
}

fn option_number(raw: &str, options: usize) -> Result<usize, InputError> {
    let choice: usize = raw
        .trim()
        .parse()
        .map_err(|_| InputError::NotANumber(raw.trim().to_owned()))?;
    if choice == 0 || choice > options {
        return Err(InputError::OutOfRange { choice, options });
    }
    Ok(choice - 1)
}

fn choice_answer(line: &str, choice: &ChoiceTask) -> Result<Answer, InputError> {
    option_number(line, choice.options.len()).map(Answer::Choice)
}

fn split_list(line: &str, separator: char) -> Vec<String> {
    line.split(separator)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}

// `term=definition` pairs; a definition may also be given by its number.
fn matching_answer(line: &str, matching: &MatchingTask) -> Result<Answer, InputError> {
    let mut pairs = BTreeMap::new();
    for pair in split_list(line, ';') {
        let (term, definition) = pair
            .split_once('=')
            .ok_or_else(|| InputError::BadPair(pair.clone()))?;
        let term = term.trim();
        let canonical = matching
            .concepts
            .iter()
            .find(|concept| concept.term.eq_ignore_ascii_case(term))
            .ok_or_else(|| InputError::UnknownTerm(term.to_owned()))?;

        let definition = definition.trim();
        let definition = match definition.parse::<usize>() {
            Ok(_) => {
                let index = option_number(definition, matching.definitions.len())?;
                matching.definitions[index].clone()
            }
            Err(_) => definition.to_owned(),
        };
        pairs.insert(canonical.term.clone(), definition);
    }
    Ok(Answer::Matching(pairs))
}

fn boss_answer(line: &str, boss: &BossTask) -> Result<Answer, InputError> {
    let picks: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    if picks.len() != boss.questions.len() {
        return Err(InputError::WrongCount {
            expected: boss.questions.len(),
            got: picks.len(),
        });
    }
    picks
        .iter()
        .zip(&boss.questions)
        .map(|(pick, question)| option_number(pick, question.options.len()))
        .collect::<Result<Vec<_>, _>>()
        .map(Answer::Boss)
}
