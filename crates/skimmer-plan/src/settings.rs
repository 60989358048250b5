//! Settings persistence: tolerant JSON loading and saving.
//!
//! User-tunable values favor availability over strictness: a missing,
//! wrong-typed or out-of-range field silently keeps its default instead of
//! failing the whole load. Unknown keys are ignored.

use serde_json::{Value, json};

use skimmer_paths::{ALLOWED_S2_LEVELS, OptMode, PathMode, Settings};

/// Build [`Settings`] from a persisted key-value object.
///
/// Field names match the on-disk format: `s2Level`, `viewRadius`,
/// `pathType`, `allowLongHops`, `optimisationType`, `useS2`. The legacy key
/// `longHopLength` stands in for `viewRadius` when the latter is absent.
pub fn settings_from_json(value: &Value) -> Settings {
    let mut settings = Settings::default();

    if let Some(level) = value.get("s2Level").and_then(Value::as_u64) {
        if level <= u64::from(u8::MAX) && ALLOWED_S2_LEVELS.contains(&(level as u8)) {
            settings.s2_level = level as u8;
        }
    }

    let radius = value
        .get("viewRadius")
        .and_then(Value::as_f64)
        .or_else(|| value.get("longHopLength").and_then(Value::as_f64));
    if let Some(radius) = radius {
        settings.view_radius_m = radius;
    }

    if let Some(mode) = value
        .get("pathType")
        .and_then(Value::as_str)
        .and_then(PathMode::parse)
    {
        settings.path_mode = mode;
    }

    if let Some(allow) = value.get("allowLongHops").and_then(Value::as_bool) {
        settings.allow_long_hops = allow;
    }

    if let Some(mode) = value
        .get("optimisationType")
        .and_then(Value::as_str)
        .and_then(OptMode::parse)
    {
        settings.optimization = mode;
    }

    if let Some(use_s2) = value.get("useS2").and_then(Value::as_bool) {
        settings.use_s2 = use_s2;
    }

    settings.sanitize();
    settings
}

/// Serialize settings to the persisted key-value form.
pub fn settings_to_json(settings: &Settings) -> Value {
    json!({
        "s2Level": settings.s2_level,
        "viewRadius": settings.view_radius_m,
        "pathType": settings.path_mode.as_str(),
        "allowLongHops": settings.allow_long_hops,
        "optimisationType": settings.optimization.as_str(),
        "useS2": settings.use_s2,
    })
}
