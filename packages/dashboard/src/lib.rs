#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core of the road safety dashboard.
//!
//! [`pipeline`] derives the map geometry, stat counts and monthly
//! histogram from raw accident records. [`map`] holds the marker
//! encoding and hover lookup. [`state`] is the single owner of filter
//! state and raw records; it tags every fetch so late responses for a
//! superseded year are discarded. [`loader`] drives an
//! [`road_safety_source::AccidentSource`] on behalf of the state.

pub mod loader;
pub mod map;
pub mod pipeline;
pub mod state;
