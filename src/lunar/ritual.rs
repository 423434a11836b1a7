//! Ritual advisories keyed by lunar phase.

use super::phase::LunarPhase;

/// Returned for phase names that do not parse.
pub const FALLBACK_RITUAL: &str = "🌙 The moon is mysterious tonight. Listen inward.";

/// The fixed ritual advisory for `phase`.
pub fn ritual_for(phase: LunarPhase) -> &'static str {
    match phase {
        LunarPhase::NewMoon => "🌑 Set intentions and plant seeds of possibility.",
        LunarPhase::WaxingCrescent => "🌒 Focus on growth and momentum.",
        LunarPhase::FirstQuarter => "🌓 Take bold action and commit.",
        LunarPhase::WaxingGibbous => "🌔 Refine your vision and adjust your path.",
        LunarPhase::FullMoon => "🌕 Celebrate and release what no longer serves.",
        LunarPhase::WaningGibbous => "🌖 Reflect and share wisdom.",
        LunarPhase::LastQuarter => "🌗 Cleanse and simplify.",
        LunarPhase::WaningCrescent => "🌘 Rest and restore.",
    }
}

/// Look up an advisory by display name, e.g. `"Full Moon"`.
pub fn ritual_for_name(name: &str) -> &'static str {
    name.parse::<LunarPhase>()
        .map(ritual_for)
        .unwrap_or(FALLBACK_RITUAL)
}
