//! Flutter-facing bindings for the ProjTrack core.

pub mod api;
