//! Category id resolution and reconciliation.
//!
//! Labels that read as integers are used as category ids directly. Any other
//! label is a class name; it gets a synthetic id drawn at random from
//! [`SYNTHETIC_ID_RANGE`], which then sticks for the rest of the run.
//!
//! Synthetic ids are only checked against other synthetic ids. An integer
//! label that happens to equal a synthetic id is not detected here; the
//! reconciliation step reports it as a collision instead.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use log::warn;
use rand::prelude::*;

use crate::error::LabelcocoError;
use crate::ir::{Category, CategoryId, RawLabel};

/// Range synthetic category ids are drawn from.
pub const SYNTHETIC_ID_RANGE: RangeInclusive<i64> = 90_000..=99_999;

/// How a label was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Integer label, used as its own id.
    Numeric(CategoryId),
    /// Text label seen earlier in the run.
    Existing(CategoryId),
    /// Text label seen for the first time; a new synthetic id was drawn.
    Allocated(CategoryId),
}

impl Resolution {
    /// The resolved category id.
    pub fn id(&self) -> CategoryId {
        match *self {
            Resolution::Numeric(id) | Resolution::Existing(id) | Resolution::Allocated(id) => id,
        }
    }
}

/// Run-scoped mapping from text labels to synthetic category ids.
///
/// Grows monotonically; entries are kept in first-seen order.
#[derive(Debug)]
pub struct CategoryTable {
    entries: Vec<(String, CategoryId)>,
    by_label: HashMap<String, CategoryId>,
    allocated: HashSet<CategoryId>,
    rng: StdRng,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryTable {
    /// Creates an empty table seeded from the thread-local generator.
    pub fn new() -> Self {
        let seed = rand::rng().random::<u64>();
        Self::with_seed(seed)
    }

    /// Creates an empty table whose synthetic ids are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            entries: Vec::new(),
            by_label: HashMap::new(),
            allocated: HashSet::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Resolves a raw label to a category id, allocating if needed.
    ///
    /// # Errors
    /// Returns [`LabelcocoError::SyntheticIdsExhausted`] when a new text label
    /// arrives after every id in [`SYNTHETIC_ID_RANGE`] has been handed out.
    pub fn resolve(&mut self, label: &RawLabel) -> Result<Resolution, LabelcocoError> {
        let text = match label {
            RawLabel::Integer(id) => return Ok(Resolution::Numeric(CategoryId::new(*id))),
            RawLabel::Text(text) => text,
        };

        if let Some(&id) = self.by_label.get(text) {
            return Ok(Resolution::Existing(id));
        }

        let capacity = synthetic_capacity();
        if self.allocated.len() >= capacity {
            return Err(LabelcocoError::SyntheticIdsExhausted {
                label: text.clone(),
                capacity,
            });
        }

        let id = loop {
            let candidate = CategoryId::new(self.rng.random_range(SYNTHETIC_ID_RANGE));
            if !self.allocated.contains(&candidate) {
                break candidate;
            }
        };

        warn!("label '{text}' is not an integer category id; assigned synthetic category id {id}");

        self.allocated.insert(id);
        self.by_label.insert(text.clone(), id);
        self.entries.push((text.clone(), id));
        Ok(Resolution::Allocated(id))
    }

    /// Looks up the synthetic id of a text label, if one was allocated.
    pub fn get(&self, label: &str) -> Option<CategoryId> {
        self.by_label.get(label).copied()
    }

    /// Synthetic entries in first-seen order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, CategoryId)> {
        self.entries.iter().map(|(label, id)| (label.as_str(), *id))
    }

    /// Number of synthetic ids allocated so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no synthetic id has been allocated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn synthetic_capacity() -> usize {
    (SYNTHETIC_ID_RANGE.end() - SYNTHETIC_ID_RANGE.start() + 1) as usize
}

// ============================================================================
// Whitelist
// ============================================================================

/// Caller-supplied `{id: name}` mapping. Its entries are always emitted and
/// their names win over names derived from labels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryWhitelist(BTreeMap<CategoryId, String>);

impl CategoryWhitelist {
    /// Creates an empty whitelist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, id: impl Into<CategoryId>, name: impl Into<String>) {
        self.0.insert(id.into(), name.into());
    }

    /// Merges another whitelist into this one; later entries win.
    pub fn extend(&mut self, other: CategoryWhitelist) {
        self.0.extend(other.0);
    }

    pub fn get(&self, id: CategoryId) -> Option<&str> {
        self.0.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.0.contains_key(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &str)> {
        self.0.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

impl FromIterator<(CategoryId, String)> for CategoryWhitelist {
    fn from_iter<I: IntoIterator<Item = (CategoryId, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for CategoryWhitelist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .iter()
            .map(|(id, name)| format!("{id}={name}"))
            .collect();
        write!(f, "{}", entries.join(","))
    }
}

/// Parses `ID=NAME` (or `ID:NAME`) pairs separated by commas.
///
/// Surrounding braces and quotes are tolerated, so a dict literal such as
/// `{1111: "meter", 0: 'dog'}` parses too. Names cannot contain commas.
impl FromStr for CategoryWhitelist {
    type Err = LabelcocoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.trim();
        let body = body
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(body);

        let mut whitelist = CategoryWhitelist::new();
        for entry in body.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let Some((id, name)) = entry.split_once(['=', ':']) else {
                return Err(invalid(format!("entry '{entry}' is not of the form ID=NAME")));
            };

            let id_text = unquote(id.trim());
            let id = id_text
                .parse::<i64>()
                .map_err(|_| invalid(format!("category id '{id_text}' is not an integer")))?;

            let name = unquote(name.trim());
            if name.is_empty() {
                return Err(invalid(format!("category {id} has an empty name")));
            }
            whitelist.insert(id, name);
        }
        Ok(whitelist)
    }
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

fn invalid(message: String) -> LabelcocoError {
    LabelcocoError::InvalidCategories { message }
}

// ============================================================================
// Reconciliation
// ============================================================================

/// Outcome of merging observed categories with the whitelist.
#[derive(Clone, Debug, Default)]
pub struct Reconciliation {
    /// Final category list for the manifest.
    pub categories: Vec<Category>,
    /// Observed categories absent from a non-empty whitelist.
    pub not_whitelisted: Vec<CategoryId>,
    /// Text labels whose synthetic id equals an observed integer label.
    pub collisions: Vec<(String, CategoryId)>,
}

/// Builds the manifest category list.
///
/// Order: integer ids ascending, then synthetic entries in first-seen order,
/// then every whitelist entry ascending. Observed ids that are whitelisted
/// are represented by their whitelist entry only. A synthetic id equal to an
/// integer label yields two entries with the same id.
pub fn reconcile(
    numeric_ids: &BTreeSet<CategoryId>,
    table: &CategoryTable,
    whitelist: &CategoryWhitelist,
) -> Reconciliation {
    let mut out = Reconciliation::default();

    for &id in numeric_ids {
        if whitelist.contains(id) {
            continue;
        }
        out.categories.push(Category::new(id, id.to_string()));
        if !whitelist.is_empty() {
            out.not_whitelisted.push(id);
        }
    }

    for (label, id) in table.entries() {
        if numeric_ids.contains(&id) {
            out.collisions.push((label.to_string(), id));
        }
        if whitelist.contains(id) {
            continue;
        }
        out.categories.push(Category::new(id, label));
        if !whitelist.is_empty() {
            out.not_whitelisted.push(id);
        }
    }

    for (id, name) in whitelist.iter() {
        out.categories.push(Category::new(id, name));
    }

    out
}
