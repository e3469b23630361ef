//! Skin binding.
//!
//! Every bound vertex carries exactly two joint references and two weights
//! summing to 1. [`SkinBinder`] assigns them through a pluggable
//! [`InfluenceStrategy`]; [`set_influence`] edits one weight and keeps the
//! other complementary.
//!
//! Vertices hold joint handles only. If a joint is removed, bindings that
//! mention it become dangling and [`check_bindings`] reports them.

mod binder;
mod deform;
mod strategy;

pub use binder::{check_bindings, set_influence, unbind, unbind_all, SkinBinder};
pub use deform::{skinned_position, skinned_positions};
pub use strategy::{FixedInfluence, InfluenceStrategy, NearestJoints};
