//! `partyforge version`: where the binary came from and which solver limits
//! it was built with. Provenance is embedded by `build.rs`.

use std::fmt;

use crate::solver::assign::UNIFORM_STATE_LIMIT;
use crate::solver::AssignmentPolicy;
use crate::teams::NamePool;

/// Source revision the binary was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revision {
    pub commit: &'static str,
    pub branch: &'static str,
    pub dirty: bool,
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.commit, self.branch)?;
        if self.dirty {
            write!(f, ", uncommitted changes")?;
        }
        Ok(())
    }
}

/// Everything `partyforge version` reports.
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub revision: Revision,
    pub built_at: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

impl BuildInfo {
    /// `0.1.0+abc1234`, with `.dirty` appended for uncommitted builds.
    pub fn full_version(&self) -> String {
        let dirty = if self.revision.dirty { ".dirty" } else { "" };
        format!("{}+{}{}", self.version, self.revision.commit, dirty)
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "partyforge {}", self.full_version())?;
        writeln!(f, "  source:  {}", self.revision)?;
        writeln!(f, "  build:   {} {} at {}", self.target, self.profile, self.built_at)?;
        writeln!(f, "  rustc:   {}", self.rustc)?;
        writeln!(
            f,
            "  solver:  {} by default, uniform tables up to {} entries",
            AssignmentPolicy::default(),
            UNIFORM_STATE_LIMIT
        )?;
        writeln!(f, "  names:   {} built in", NamePool::builtin().len())
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        revision: Revision {
            commit: env!("PARTYFORGE_GIT_HASH"),
            branch: env!("PARTYFORGE_GIT_BRANCH"),
            dirty: env!("PARTYFORGE_GIT_DIRTY") == "true",
        },
        built_at: env!("PARTYFORGE_BUILD_TIMESTAMP"),
        target: env!("PARTYFORGE_TARGET"),
        profile: env!("PARTYFORGE_PROFILE"),
        rustc: env!("PARTYFORGE_RUSTC_VERSION"),
    }
}

pub fn print_version() {
    print!("{}", build_info());
}
