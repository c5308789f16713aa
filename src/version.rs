//! Build metadata embedded by `build.rs`.

use std::fmt;

/// What the binary knows about its own build.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// Short git commit hash, or "unknown" outside a checkout.
    pub git_hash: &'static str,
    pub git_branch: &'static str,
    dirty: &'static str,
    pub built_at: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

/// The build this binary came from.
pub fn build_info() -> BuildInfo {
    BuildInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        git_hash: env!("CLAIMSIM_GIT_HASH"),
        git_branch: env!("CLAIMSIM_GIT_BRANCH"),
        dirty: env!("CLAIMSIM_GIT_DIRTY"),
        built_at: env!("CLAIMSIM_BUILD_TIMESTAMP"),
        target: env!("CLAIMSIM_TARGET"),
        profile: env!("CLAIMSIM_PROFILE"),
        rustc: env!("CLAIMSIM_RUSTC_VERSION"),
    }
}

impl BuildInfo {
    fn is_dirty(&self) -> bool {
        self.dirty == "true"
    }

    /// Version plus commit, e.g. "0.1.0-ab12cd34" ("-dirty" when the tree
    /// had local changes at build time).
    pub fn full_version(&self) -> String {
        let mut v = format!("{}-{}", self.version, self.git_hash);
        if self.is_dirty() {
            v.push_str("-dirty");
        }
        v
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.name, self.full_version())?;
        writeln!(f)?;
        writeln!(f, "Build Information:")?;
        writeln!(f, "  Version:    {}", self.version)?;
        let dirty_mark = if self.is_dirty() { " (dirty)" } else { "" };
        writeln!(f, "  Git Hash:   {}{}", self.git_hash, dirty_mark)?;
        writeln!(f, "  Git Branch: {}", self.git_branch)?;
        writeln!(f, "  Built:      {}", self.built_at)?;
        writeln!(f, "  Profile:    {}", self.profile)?;
        writeln!(f, "  Target:     {}", self.target)?;
        writeln!(f, "  Compiler:   {}", self.rustc)
    }
}

pub fn print_version() {
    print!("{}", build_info());
}
