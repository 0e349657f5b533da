// ABOUTME: Rebuild mode selection for a deployment run.
// ABOUTME: A closed enum replaces the mutually exclusive boolean switches.

use crate::error::{Error, Result};
use std::fmt;

/// How containers are (re)built during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RebuildMode {
    /// Pull, build with layer cache, bring up.
    #[default]
    Normal,
    /// Pull, prune dangling resources, build without cache, bring up.
    Rebuild,
    /// Bring existing images up again. No pull, no build.
    RestartOnly,
    /// Pull, prune all build cache and images, build without cache, bring up.
    ClearCache,
}

/// Which Docker resources the cache maintenance step removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneScope {
    /// Only dangling images and build cache.
    Dangling,
    /// All unused images and build cache.
    All,
}

/// What the execution step runs before `up`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStrategy {
    Cached,
    NoCache,
}

impl RebuildMode {
    /// Build the mode from the three CLI switches.
    ///
    /// `clear_cache` implies `rebuild`, so those two may be combined;
    /// `restart_only` excludes both.
    pub fn from_flags(rebuild: bool, restart_only: bool, clear_cache: bool) -> Result<Self> {
        match (rebuild, restart_only, clear_cache) {
            (_, true, true) => Err(Error::ConflictingModes(
                "--restart-only cannot be combined with --clear-cache".to_string(),
            )),
            (true, true, _) => Err(Error::ConflictingModes(
                "--restart-only cannot be combined with --rebuild".to_string(),
            )),
            (_, false, true) => Ok(RebuildMode::ClearCache),
            (true, false, false) => Ok(RebuildMode::Rebuild),
            (false, true, false) => Ok(RebuildMode::RestartOnly),
            (false, false, false) => Ok(RebuildMode::Normal),
        }
    }

    pub fn pulls_source(&self) -> bool {
        !matches!(self, RebuildMode::RestartOnly)
    }

    pub fn prune_scope(&self) -> Option<PruneScope> {
        match self {
            RebuildMode::ClearCache => Some(PruneScope::All),
            RebuildMode::Rebuild => Some(PruneScope::Dangling),
            RebuildMode::Normal | RebuildMode::RestartOnly => None,
        }
    }

    pub fn build_strategy(&self) -> Option<BuildStrategy> {
        match self {
            RebuildMode::Normal => Some(BuildStrategy::Cached),
            RebuildMode::Rebuild | RebuildMode::ClearCache => Some(BuildStrategy::NoCache),
            RebuildMode::RestartOnly => None,
        }
    }
}

impl fmt::Display for RebuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RebuildMode::Normal => "normal",
            RebuildMode::Rebuild => "rebuild",
            RebuildMode::RestartOnly => "restart-only",
            RebuildMode::ClearCache => "clear-cache",
        };
        f.write_str(name)
    }
}
