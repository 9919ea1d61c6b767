use prk_schemas::{FlagName, ProctoringFlags, ProctoringSettings, ProctoringTier};

/// Resolve a tier to its complete flag bundle.
///
/// Pure and idempotent: same tier, same bundle, always. Every field is
/// explicitly assigned on every call — a downgrade (`ai → basic`) zeroes
/// out every higher-tier flag, never retains one. Partial retention of
/// higher-tier flags is the bug class this function exists to prevent.
///
/// The resolver does not decide whether proctoring is on at all; when the
/// parent toggle goes off, callers use [`disable_proctoring`] which
/// resolves tier `none` and clears `proctoring_type`.
pub fn resolve(tier: ProctoringTier) -> ProctoringFlags {
    let mut flags = ProctoringFlags::all_false();
    for flag in FlagName::ALL {
        // owner_tier is never None, so the `none` tier enables nothing.
        flags.set(flag, flag.owner_tier() <= tier);
    }
    flags
}

/// Re-resolve stored settings for a new tier.
///
/// Replaces the tier and flag record wholesale and leaves
/// `max_tab_switches` untouched — it is an independent user-supplied
/// setting, only meaningful while `tabSwitchingDetection` is true.
pub fn apply_tier(settings: &mut ProctoringSettings, tier: ProctoringTier) {
    settings.apply_resolved(tier, resolve(tier));
}

/// Turn the parent proctoring toggle off: tier becomes `none` and every
/// flag goes false. `max_tab_switches` survives like any other tier change.
pub fn disable_proctoring(settings: &mut ProctoringSettings) {
    apply_tier(settings, ProctoringTier::None);
}

/// Whether the UI may let the operator toggle `flag` while `tier` is
/// selected.
///
/// A flag is editable exactly when its owner tier equals the current tier.
/// Below that the flag is locked true (resolved bundles already reflect
/// this, so the UI can simply disable inputs bound to true values); above
/// it the flag is locked false. Presentation state stays out of the data
/// model — this projection is the only place the lock rule lives.
pub fn is_field_editable(tier: ProctoringTier, flag: FlagName) -> bool {
    flag.owner_tier() == tier
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
