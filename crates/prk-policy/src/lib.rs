//! Proctoring Policy Resolver.
//!
//! Maps a [`ProctoringTier`] to its complete flag bundle and answers which
//! individual flags the UI may let an operator edit at a given tier.
//!
//! # Containment invariant
//!
//! For every tier `t`, `resolve(t)` sets exactly the flags owned by tiers
//! ≤ `t` to true and every other flag to false:
//!
//! ```text
//! none     → 0 flags
//! basic    → 6  (Basic)
//! advanced → 15 (Basic + Advanced)
//! ai       → 24 (Basic + Advanced + AI)
//! ```
//!
//! The invariant is structural, not maintained by hand: the resolver is a
//! membership test against [`FlagName::owner_tier`] over the tier total
//! order, so there is no per-tier literal bundle that could drift.

pub use prk_schemas::UnknownTier;

mod resolver;

pub use resolver::{apply_tier, disable_proctoring, is_field_editable, resolve};
