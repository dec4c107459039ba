//! Team name pool
//!
//! Every run owns its own pool. Names are drawn without replacement after a
//! shuffle; whatever is left over is dropped with the pool.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};

/// Names used when neither a file nor a configured list is given.
pub const DEFAULT_TEAM_NAMES: &[&str] = &[
    "Albatross", "Badger", "Basilisk", "Bison", "Chimera", "Cobra", "Condor", "Coyote",
    "Dragon", "Falcon", "Ferret", "Gargoyle", "Gryphon", "Harpy", "Hydra", "Ibex",
    "Jackal", "Kestrel", "Kraken", "Lynx", "Manticore", "Marten", "Mongoose", "Narwhal",
    "Ocelot", "Osprey", "Otter", "Panther", "Pegasus", "Phoenix", "Puma", "Raven",
    "Salamander", "Scorpion", "Sphinx", "Stag", "Starling", "Tarantula", "Thunderbird", "Tiger",
    "Unicorn", "Viper", "Vulture", "Walrus", "Wolverine", "Wyvern", "Yak", "Zebra",
];

/// Unique team names available to one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePool {
    names: Vec<String>,
}

impl NamePool {
    /// Pool of [`DEFAULT_TEAM_NAMES`].
    pub fn builtin() -> Self {
        Self {
            names: DEFAULT_TEAM_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// Build a pool from explicit names. Blank and duplicate names are rejected.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut pool = Vec::new();
        for name in names {
            let name = name.into().trim().to_string();
            if name.is_empty() {
                return Err(Error::config_field_invalid("names", "team names cannot be blank"));
            }
            if !seen.insert(name.clone()) {
                return Err(Error::config_field_invalid(
                    "names",
                    format!("duplicate team name '{}'", name),
                ));
            }
            pool.push(name);
        }
        Ok(Self { names: pool })
    }

    /// Read one name per line. Blank lines and `#` comments are skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let pool = Self::from_names(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        )?;
        debug!(path = %path.display(), names = pool.len(), "Team names loaded");
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Shuffle the pool and take `count` names, consuming it.
    pub fn draw<R: Rng + ?Sized>(mut self, count: usize, rng: &mut R) -> Result<Vec<String>> {
        if self.names.len() < count {
            return Err(Error::InsufficientTeamNames {
                required: count,
                available: self.names.len(),
            });
        }
        self.names.shuffle(rng);
        self.names.truncate(count);
        Ok(self.names)
    }
}

impl Default for NamePool {
    fn default() -> Self {
        Self::builtin()
    }
}
