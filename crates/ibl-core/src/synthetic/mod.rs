//! Deterministic synthetic data generation helpers.
//!
//! This module provides small building blocks for constructing synthetic
//! panorama calibration problems used in tests and examples:
//! - ground-plane rectangles in boundary order,
//! - a tilted panorama that turns ground points into UV markers,
//! - deterministic pseudo-random UV noise.
//!
//! The helpers are deterministic (explicit seeds; stable point ordering).
//!
//! # Example
//!
//! ```
//! use ibl_core::{synthetic::panorama::{ground_rectangle, SyntheticPanorama}, Pt2, Rot3};
//!
//! let pano = SyntheticPanorama::new(Rot3::from_euler_angles(0.2, 0.0, 0.0), 1.6);
//! let quad = ground_rectangle(Pt2::new(3.0, 0.5), 2.0, 1.0, 0.3);
//! let markers = pano.markers(&quad).unwrap();
//! assert_eq!(markers.len(), 4);
//! ```

pub mod noise;
pub mod panorama;

pub use noise::UniformUvNoise;
pub use panorama::{ground_rectangle, SyntheticPanorama};
