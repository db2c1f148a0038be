//! Models ready-made patching profiles.

use std::num::NonZeroUsize;

use crate::{error::Result, patch::Patcher, rule::Rule};

/// How far past a marker occurrence the WSL detection probes may sit.
const WSL_WINDOW_SIZE: NonZeroUsize = NonZeroUsize::new(500).unwrap();

/// A named, ready-made parameter set for one concrete patching task.
///
/// Profiles keep task policy (which marker, which rules, how far to look)
/// out of the engine; the engine only ever sees the assembled parts.
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    /// The name the profile is known under.
    name: &'static str,
    /// The context marker delimiting where search windows begin.
    marker: &'static [u8],
    /// The window size in bytes.
    window_size: NonZeroUsize,
    /// The pattern/replacement pairs, in application order.
    rules: &'static [(&'static [u8], &'static [u8])],
}

impl Profile {
    /// The profile that blinds a bundled application's WSL detection.
    ///
    /// The detection reads `/proc/version` and checks the contents for
    /// "microsoft" or "wsl". Rewriting the two probe strings right after
    /// the read call (and nowhere else in the file) makes both checks miss
    /// while leaving every other byte alone.
    pub fn wsl_detection() -> Profile {
        Profile {
            name: "wsl-detection",
            marker: br#"readFileSync("/proc/version""#,
            window_size: WSL_WINDOW_SIZE,
            rules: &[
                (br#".includes("microsoft")"#, br#".includes("micr0s0ft")"#),
                (br#".includes("wsl")"#, br#".includes("ws1")"#),
            ],
        }
    }

    /// The name the profile is known under.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The context marker delimiting where search windows begin.
    pub fn marker(&self) -> &'static [u8] {
        self.marker
    }

    /// The window size in bytes.
    pub fn window_size(&self) -> NonZeroUsize {
        self.window_size
    }

    /// Builds the profile's rules, in application order.
    pub fn rules(&self) -> Result<Vec<Rule>> {
        self.rules
            .iter()
            .map(|&(pattern, replacement)| Rule::new(pattern, replacement))
            .collect()
    }

    /// Builds a patcher configured with the profile's parameters.
    pub fn to_patcher(&self) -> Result<Patcher> {
        Patcher::new(self.marker.to_vec(), self.window_size, self.rules()?)
    }
}
