//! String table consumer interface.
//!
//! Chunk headers, name properties and enum members refer to text through
//! 16-bit indices into a per-resource string table. Parsing that table is
//! the job of the enclosing resource format; this crate only resolves
//! through the [`StringTable`] trait.

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;

use crate::{Error, Result};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Resolves string indices read from a resource stream.
pub trait StringTable {
    /// Resolve a string index to its text.
    ///
    /// Indices are signed on the wire but only non-negative values are
    /// meaningful; implementations must reject negative indices rather than
    /// reinterpret them.
    fn resolve_string(&self, index: i16) -> Result<&str>;

    /// Find the index of a string, for writing.
    ///
    /// Read-only tables may leave this unimplemented.
    fn find_string(&self, _text: &str) -> Option<i16> {
        None
    }
}

/// An in-memory name table with 1-based indices.
///
/// Index 0 is reserved: in a property stream it terminates the stream, so it
/// never names anything.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: Vec<String>,
    lookup: FxHashMap<String, i16>,
}

impl NameTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from names in index order.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for name in names {
            table.push(name)?;
        }
        Ok(table)
    }

    /// Add a name, returning its index. Adding a name twice returns the
    /// existing index.
    pub fn push(&mut self, name: impl Into<String>) -> Result<i16> {
        let name = name.into();
        if let Some(&index) = self.lookup.get(&name) {
            return Ok(index);
        }

        let index = i16::try_from(self.names.len() + 1).map_err(|_| Error::NameTableFull)?;
        self.lookup.insert(name.clone(), index);
        self.names.push(name);
        Ok(index)
    }

    /// Number of names in the table.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the table holds no names.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate names in index order.
    pub fn iter(&self) -> impl Iterator<Item = (i16, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| ((i + 1) as i16, name.as_str()))
    }
}

impl StringTable for NameTable {
    fn resolve_string(&self, index: i16) -> Result<&str> {
        let out_of_range = || Error::StringIndexOutOfRange {
            index,
            count: self.names.len(),
        };

        if index <= 0 {
            return Err(out_of_range());
        }

        self.names
            .get(index as usize - 1)
            .map(String::as_str)
            .ok_or_else(out_of_range)
    }

    fn find_string(&self, text: &str) -> Option<i16> {
        self.lookup.get(text).copied()
    }
}
