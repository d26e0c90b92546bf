use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// A recurring chore definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chore {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Symbolic icon key resolved by whatever renders the board.
    #[serde(default)]
    pub icon_name: String,
    /// Desired occurrences per week (or per month, see `FrequencyMode`).
    /// Always at least 1.
    #[serde(
        default = "default_frequency",
        deserialize_with = "deserialize_frequency"
    )]
    frequency: u32,
}

fn default_frequency() -> u32 {
    1
}

fn deserialize_frequency<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(clamp_frequency(raw))
}

/// Clamp any integer into the valid frequency range `1..=u32::MAX`.
pub fn clamp_frequency(raw: i64) -> u32 {
    raw.clamp(1, i64::from(u32::MAX)) as u32
}

impl Chore {
    pub fn new(id: impl Into<String>, title: impl Into<String>, frequency: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            icon_name: String::new(),
            frequency: clamp_frequency(frequency),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon_name: impl Into<String>) -> Self {
        self.icon_name = icon_name.into();
        self
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: i64) {
        self.frequency = clamp_frequency(frequency);
    }
}

/// Partial edit of a chore. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoreUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<i64>,
}

impl ChoreUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.icon_name.is_none()
            && self.frequency.is_none()
    }

    pub fn apply_to(self, chore: &mut Chore) {
        if let Some(title) = self.title {
            chore.title = title;
        }
        if let Some(description) = self.description {
            chore.description = description;
        }
        if let Some(icon_name) = self.icon_name {
            chore.icon_name = icon_name;
        }
        if let Some(frequency) = self.frequency {
            chore.set_frequency(frequency);
        }
    }
}

/// Chores keyed by id, iterated in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoreCatalog {
    chores: BTreeMap<String, Chore>,
}

impl ChoreCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a chore, returning the one it replaced.
    pub fn insert(&mut self, chore: Chore) -> Option<Chore> {
        self.chores.insert(chore.id.clone(), chore)
    }

    pub fn remove(&mut self, id: &str) -> Option<Chore> {
        self.chores.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Chore> {
        self.chores.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.chores.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.chores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chores.is_empty()
    }

    pub fn entries(&self) -> btree_map::Iter<'_, String, Chore> {
        self.chores.iter()
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, Chore> {
        self.chores.values()
    }

    /// Title for a chore id, falling back to the id itself.
    pub fn title_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.chores
            .get(id)
            .map(|chore| chore.title.as_str())
            .unwrap_or(id)
    }

    /// First free id of the form `new-chore-N`.
    pub fn next_new_id(&self) -> String {
        let mut n = self.chores.len() + 1;
        loop {
            let candidate = format!("new-chore-{n}");
            if !self.chores.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl FromIterator<Chore> for ChoreCatalog {
    fn from_iter<I: IntoIterator<Item = Chore>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for chore in iter {
            catalog.insert(chore);
        }
        catalog
    }
}

impl<'a> IntoIterator for &'a ChoreCatalog {
    type Item = &'a Chore;
    type IntoIter = btree_map::Values<'a, String, Chore>;

    fn into_iter(self) -> Self::IntoIter {
        self.chores.values()
    }
}
