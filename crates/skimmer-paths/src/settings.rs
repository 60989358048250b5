//! Planner tuning: typed settings with explicit defaults.

/// Grid levels the reachability engine may run at.
pub const ALLOWED_S2_LEVELS: [u8; 4] = [14, 15, 16, 17];

/// What the route should optimize for when a long hop costs a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PathMode {
    /// Fewest total hops, even if that spends more keys.
    MinHops,
    /// Mild long-hop penalty.
    #[default]
    Balanced,
    /// Heavily penalize long hops to conserve keys.
    MinLongHops,
}

impl PathMode {
    /// Stable string form used in persisted settings.
    pub fn as_str(self) -> &'static str {
        match self {
            PathMode::MinHops => "min-hops",
            PathMode::Balanced => "balanced",
            PathMode::MinLongHops => "min-long-hops",
        }
    }

    /// Parse the stable string form.
    pub fn parse(s: &str) -> Option<PathMode> {
        match s {
            "min-hops" => Some(PathMode::MinHops),
            "balanced" => Some(PathMode::Balanced),
            "min-long-hops" => Some(PathMode::MinLongHops),
            _ => None,
        }
    }
}

/// Search speed/quality trade for the A* heuristic.
///
/// Scales above 1 deliberately over-estimate to prune the search at the cost
/// of route quality; only `Perfect` keeps the heuristic unscaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum OptMode {
    None,
    Greedy,
    #[default]
    Balanced,
    Perfect,
}

impl OptMode {
    /// Stable string form used in persisted settings.
    pub fn as_str(self) -> &'static str {
        match self {
            OptMode::None => "none",
            OptMode::Greedy => "greedy",
            OptMode::Balanced => "balanced",
            OptMode::Perfect => "perfect",
        }
    }

    /// Parse the stable string form.
    pub fn parse(s: &str) -> Option<OptMode> {
        match s {
            "none" => Some(OptMode::None),
            "greedy" => Some(OptMode::Greedy),
            "balanced" => Some(OptMode::Balanced),
            "perfect" => Some(OptMode::Perfect),
            _ => None,
        }
    }

    /// Heuristic scale factor for this mode.
    #[inline]
    pub fn heuristic_scale(self) -> f64 {
        match self {
            OptMode::Greedy => 10.0,
            OptMode::Balanced => 3.0,
            OptMode::None | OptMode::Perfect => 1.0,
        }
    }
}

/// Planner tuning values.
///
/// Out-of-range values never propagate into the engine: [`Settings::sanitize`]
/// resets them to defaults at the load boundary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings {
    /// Grid subdivision level for reachability tests.
    pub s2_level: u8,
    /// Drone view radius in meters; the short-hop range.
    pub view_radius_m: f64,
    /// Cost model selection.
    pub path_mode: PathMode,
    /// Whether long (key-consuming) hops may be used at all.
    pub allow_long_hops: bool,
    /// A* speed/quality trade.
    pub optimization: OptMode,
    /// Grid-cell reachability test when true; plain distance when false.
    pub use_s2: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            s2_level: 16,
            view_radius_m: 550.0,
            path_mode: PathMode::default(),
            allow_long_hops: true,
            optimization: OptMode::default(),
            use_s2: true,
        }
    }
}

impl Settings {
    /// Reset out-of-range fields to their defaults.
    pub fn sanitize(&mut self) {
        let defaults = Settings::default();
        if !ALLOWED_S2_LEVELS.contains(&self.s2_level) {
            self.s2_level = defaults.s2_level;
        }
        if !self.view_radius_m.is_finite() || self.view_radius_m <= 0.0 {
            self.view_radius_m = defaults.view_radius_m;
        }
    }

    /// Whether switching from `self` to `other` invalidates cached
    /// reachability results.
    pub fn reachability_changed(&self, other: &Settings) -> bool {
        self.s2_level != other.s2_level
            || self.view_radius_m != other.view_radius_m
            || self.use_s2 != other.use_s2
    }
}
