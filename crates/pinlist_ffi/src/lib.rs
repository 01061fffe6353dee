//! Flutter-facing bindings for `pinlist_core`.

pub mod api;
