//! Regional risk profiles

use crate::classifier::RiskProfile;

/// Profile used for regions without a dedicated entry
pub const DEFAULT_PROFILE: RiskProfile = RiskProfile::new(50.0, 2.0, 40.0, 4.0);

/// Known regions, in the order predictions are reported
pub const STATE_PROFILES: [(&str, RiskProfile); 8] = [
    ("Tamil Nadu", RiskProfile::new(45.0, 1.2, 30.0, 4.0)),
    ("Assam", RiskProfile::new(160.0, 3.4, 85.0, 7.8)),
    ("Uttarakhand", RiskProfile::new(140.0, 4.1, 75.0, 5.0)),
    ("Gujarat", RiskProfile::new(10.0, 2.1, 20.0, 2.0)),
    ("Maharashtra", RiskProfile::new(80.0, 2.5, 40.0, 5.0)),
    ("Kerala", RiskProfile::new(120.0, 1.5, 65.0, 6.0)),
    ("Delhi", RiskProfile::new(25.0, 1.1, 10.0, 3.0)),
    ("Odisha", RiskProfile::new(90.0, 1.3, 50.0, 6.0)),
];

/// Region names in reporting order
pub fn reference_states() -> impl Iterator<Item = &'static str> {
    STATE_PROFILES.iter().map(|(name, _)| *name)
}

/// Case-insensitive lookup, falling back to [`DEFAULT_PROFILE`]
pub fn profile_for(state: &str) -> RiskProfile {
    let state = state.trim();
    STATE_PROFILES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(state))
        .map(|(_, profile)| *profile)
        .unwrap_or(DEFAULT_PROFILE)
}
