//! Parser for the `::`-separated dataset files.
//!
//! - `users.dat`: `user_id::username::languages::skills::preference_tags`
//! - `repos.dat`: `repo_id::name::description::language::tags`
//! - `interactions.dat`: `user_id::repo_id::signal[::feedback reason]`
//!
//! List fields are `|`-separated and may be empty. Blank lines are skipped.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs;
use std::path::Path;

const USERS_FILE: &str = "users.dat";
const REPOS_FILE: &str = "repos.dat";
const INTERACTIONS_FILE: &str = "interactions.dat";

fn read_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Split a line into exactly `expected` fields
fn split_fields<'a>(line: &'a str, expected: usize, file: &str, line_no: usize) -> Result<Vec<&'a str>> {
    let fields: Vec<&str> = line.split("::").collect();
    if fields.len() != expected {
        return Err(DataLoadError::FieldCountMismatch {
            file: file.to_string(),
            expected,
            found: fields.len(),
            line: line_no,
        });
    }
    Ok(fields)
}

fn parse_id(raw: &str, what: &str, file: &str, line_no: usize) -> Result<String> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: format!("Missing {}", what),
        });
    }
    Ok(id.to_string())
}

/// "rust|go||python " -> ["rust", "go", "python"]
fn parse_list(s: &str) -> Vec<String> {
    s.split('|')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Map the spellings used by the swipe UI and the export scripts to a signal
pub fn parse_signal(s: &str) -> Result<Signal> {
    match s.trim().to_ascii_lowercase().as_str() {
        "positive" | "saved" | "save" | "like" | "right" | "1" => Ok(Signal::Positive),
        "negative" | "rejected" | "reject" | "dislike" | "left" | "-1" | "0" => Ok(Signal::Negative),
        _ => Err(DataLoadError::InvalidValue {
            field: "signal".to_string(),
            value: s.to_string(),
        }),
    }
}

pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    let lines = read_lines(path)?;
    let mut users = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let fields = split_fields(line_trimmed, 5, USERS_FILE, line_no)?;
        users.push(User {
            id: parse_id(fields[0], "user_id", USERS_FILE, line_no)?,
            username: fields[1].trim().to_string(),
            languages: parse_list(fields[2]),
            skills: parse_list(fields[3]),
            preference_tags: parse_list(fields[4]),
        });
    }

    Ok(users)
}

pub fn parse_repos(path: &Path) -> Result<Vec<Repository>> {
    let lines = read_lines(path)?;
    let mut repos = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let fields = split_fields(line_trimmed, 5, REPOS_FILE, line_no)?;
        let language = fields[3].trim();
        repos.push(Repository {
            id: parse_id(fields[0], "repo_id", REPOS_FILE, line_no)?,
            name: fields[1].trim().to_string(),
            description: fields[2].trim().to_string(),
            language: (!language.is_empty()).then(|| language.to_string()),
            tags: parse_list(fields[4]),
        });
    }

    Ok(repos)
}

pub fn parse_interactions(path: &Path) -> Result<Vec<Interaction>> {
    let lines = read_lines(path)?;
    let mut interactions = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        // The reason is free text and goes last, so it may itself contain "::"
        let fields: Vec<&str> = line_trimmed.splitn(4, "::").collect();
        if fields.len() < 3 {
            return Err(DataLoadError::FieldCountMismatch {
                file: INTERACTIONS_FILE.to_string(),
                expected: 3,
                found: fields.len(),
                line: line_no,
            });
        }

        let signal = parse_signal(fields[2]).map_err(|e| DataLoadError::ParseError {
            file: INTERACTIONS_FILE.to_string(),
            line: line_no,
            reason: e.to_string(),
        })?;
        let mut interaction = Interaction::new(
            parse_id(fields[0], "user_id", INTERACTIONS_FILE, line_no)?,
            parse_id(fields[1], "repo_id", INTERACTIONS_FILE, line_no)?,
            signal,
        );
        if let Some(reason) = fields.get(3).map(|r| r.trim()).filter(|r| !r.is_empty()) {
            interaction = interaction.with_reason(reason);
        }
        interactions.push(interaction);
    }

    Ok(interactions)
}
