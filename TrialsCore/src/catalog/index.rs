//! Basename to ID lookup tables built from the catalog

use std::collections::HashMap;

use super::AssetCatalogEntry;

/// Name prefix of dialogue assets
pub const DEFAULT_DIALOGUE_PREFIX: &str = "VO_";

/// Dialogue and effects lookup tables
///
/// * `dialogue`: entries named with the dialogue prefix whose language is in
///   the filter (an absent language counts as `SFX`)
/// * `effects`: every non-localized entry; names ending in a numeric
///   `_NN` segment are also reachable without it when that alias is free
///
/// The first entry registered for a name wins.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    pub dialogue: HashMap<String, String>,
    pub effects: HashMap<String, String>,
    dialogue_prefix: String,
}

impl CatalogIndex {
    /// Build both tables
    ///
    /// An empty `languages` filter accepts every language.
    pub fn build<S: AsRef<str>>(
        entries: &[AssetCatalogEntry],
        languages: &[S],
        dialogue_prefix: &str,
    ) -> Self {
        let mut index = Self {
            dialogue: HashMap::new(),
            effects: HashMap::new(),
            dialogue_prefix: dialogue_prefix.to_string(),
        };
        let accepts = |language: &str| {
            languages.is_empty()
                || languages
                    .iter()
                    .any(|l| l.as_ref().eq_ignore_ascii_case(language))
        };

        let mut skipped = 0usize;
        for entry in entries {
            let basename = entry.basename();
            let mut placed = false;

            if index.is_dialogue(basename) && accepts(entry.language_key()) {
                register(&mut index.dialogue, basename, &entry.id);
                placed = true;
            }
            if !entry.is_localized() {
                register(&mut index.effects, basename, &entry.id);
                placed = true;
            }
            if !placed {
                skipped += 1;
            }
        }

        // Aliases go in last so they never shadow a real name
        let mut aliases: Vec<(String, String)> = index
            .effects
            .iter()
            .filter_map(|(name, id)| strip_numeric_suffix(name).map(|alias| (alias.to_string(), id.clone())))
            .collect();
        aliases.sort();
        for (alias, id) in aliases {
            index.effects.entry(alias).or_insert(id);
        }

        tracing::info!(
            dialogue = index.dialogue.len(),
            effects = index.effects.len(),
            skipped,
            "Built asset catalog index"
        );
        index
    }

    #[must_use]
    pub fn dialogue_prefix(&self) -> &str {
        &self.dialogue_prefix
    }

    /// Whether `basename` follows the dialogue naming convention
    #[must_use]
    pub fn is_dialogue(&self, basename: &str) -> bool {
        !self.dialogue_prefix.is_empty() && basename.starts_with(self.dialogue_prefix.as_str())
    }

    /// Tables to search for `basename`, most specific first
    #[must_use]
    pub fn tables_for(&self, basename: &str) -> Vec<&HashMap<String, String>> {
        if self.is_dialogue(basename) {
            vec![&self.dialogue, &self.effects]
        } else {
            vec![&self.effects]
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dialogue.len() + self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dialogue.is_empty() && self.effects.is_empty()
    }
}

fn register(table: &mut HashMap<String, String>, basename: &str, id: &str) {
    match table.get(basename) {
        Some(existing) if existing != id => {
            tracing::debug!(basename, kept = %existing, ignored = id, "Duplicate catalog name");
        }
        Some(_) => {}
        None => {
            table.insert(basename.to_string(), id.to_string());
        }
    }
}

fn strip_numeric_suffix(name: &str) -> Option<&str> {
    let (head, tail) = name.rsplit_once('_')?;
    (!head.is_empty() && !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit())).then_some(head)
}
