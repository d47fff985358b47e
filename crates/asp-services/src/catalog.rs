//! Animal/sound catalog.
//!
//! Loaded once at startup from a two-column CSV (animal,sound) and never
//! mutated afterwards, so a single `Arc<Catalog>` is shared by every
//! connection without locking.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Ordered animal and sound lists plus a direct animal → sound lookup.
///
/// `animals[i]` and `sounds[i]` come from the same record. Both lists keep
/// file order, duplicates included; the lookup keeps the last sound seen
/// for a repeated animal.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    animals: Vec<String>,
    sounds: Vec<String>,
    sound_by_animal: HashMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("catalog line {line}: expected 2 fields, found {found}")]
    Malformed { line: usize, found: usize },
}

impl Catalog {
    /// Build from (animal, sound) records, in order.
    pub fn from_records<I, A, S>(records: I) -> Self
    where
        I: IntoIterator<Item = (A, S)>,
        A: Into<String>,
        S: Into<String>,
    {
        let mut catalog = Catalog::default();
        for (animal, sound) in records {
            let (animal, sound) = (animal.into(), sound.into());
            catalog.sound_by_animal.insert(animal.clone(), sound.clone());
            catalog.animals.push(animal);
            catalog.sounds.push(sound);
        }
        catalog
    }

    /// Read and parse a CSV file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::ReadFailed(path.to_path_buf(), e))?;
        Self::parse(&text)
    }

    /// Parse CSV text. Blank lines are skipped; every other line must hold
    /// exactly two fields.
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let mut records = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = split_record(line);
            if fields.len() != 2 {
                return Err(CatalogError::Malformed {
                    line: index + 1,
                    found: fields.len(),
                });
            }
            let sound = fields.pop().unwrap_or_default();
            let animal = fields.pop().unwrap_or_default();
            records.push((animal, sound));
        }
        Ok(Self::from_records(records))
    }

    pub fn animals(&self) -> &[String] {
        &self.animals
    }

    pub fn sounds(&self) -> &[String] {
        &self.sounds
    }

    pub fn sound_of(&self, animal: &str) -> Option<&str> {
        self.sound_by_animal.get(animal).map(String::as_str)
    }

    /// Animals whose name starts with `prefix`, case-sensitive, in catalog order.
    pub fn animals_with_prefix(&self, prefix: &str) -> Vec<&str> {
        with_prefix(&self.animals, prefix)
    }

    /// Sounds starting with `prefix`, matched independently of the animals.
    pub fn sounds_with_prefix(&self, prefix: &str) -> Vec<&str> {
        with_prefix(&self.sounds, prefix)
    }

    pub fn len(&self) -> usize {
        self.animals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }
}

fn with_prefix<'a>(names: &'a [String], prefix: &str) -> Vec<&'a str> {
    names
        .iter()
        .filter(|n| n.starts_with(prefix))
        .map(String::as_str)
        .collect()
}

/// Split one CSV line. A field opening with `"` runs to the closing quote,
/// and `""` inside it stands for a literal quote.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' if quoted => quoted = false,
            '"' if field.is_empty() => quoted = true,
            ',' if !quoted => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}
