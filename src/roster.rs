use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("member name must not be blank")]
    BlankName,
    #[error("member '{0}' is already on the roster")]
    Duplicate(String),
    #[error("member '{0}' is not on the roster")]
    Unknown(String),
}

/// Ordered, de-duplicated list of people eligible for chores.
///
/// Names are trimmed; blank names and repeats are dropped on construction,
/// keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Roster {
    members: Vec<String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|member| member == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|member| member == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.members.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.members
    }

    pub fn add(&mut self, name: &str) -> Result<&str, RosterError> {
        let name = normalize(name)?;
        if self.contains(&name) {
            return Err(RosterError::Duplicate(name));
        }
        self.members.push(name);
        Ok(self.members.last().map(String::as_str).unwrap_or_default())
    }

    /// Append `Person N` where N starts at `len + 1` and skips taken names.
    pub fn add_next_default(&mut self) -> &str {
        let mut n = self.members.len() + 1;
        let name = loop {
            let candidate = format!("Person {n}");
            if !self.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        self.members.push(name);
        self.members.last().map(String::as_str).unwrap_or_default()
    }

    pub fn remove(&mut self, name: &str) -> Result<(), RosterError> {
        let idx = self
            .position(name)
            .ok_or_else(|| RosterError::Unknown(name.to_string()))?;
        self.members.remove(idx);
        Ok(())
    }

    /// Rename in place, keeping the member's position.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<String, RosterError> {
        let idx = self
            .position(old)
            .ok_or_else(|| RosterError::Unknown(old.to_string()))?;
        let new = normalize(new)?;
        if new != old && self.contains(&new) {
            return Err(RosterError::Duplicate(new));
        }
        self.members[idx] = new.clone();
        Ok(new)
    }
}

fn normalize(name: &str) -> Result<String, RosterError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RosterError::BlankName);
    }
    Ok(trimmed.to_string())
}

impl From<Vec<String>> for Roster {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<Roster> for Vec<String> {
    fn from(roster: Roster) -> Self {
        roster.members
    }
}

impl<S: AsRef<str>> FromIterator<S> for Roster {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut roster = Roster::new();
        for name in iter {
            // blanks and repeats are skipped
            roster.add(name.as_ref()).ok();
        }
        roster
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
