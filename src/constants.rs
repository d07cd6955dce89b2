//! # Constants and type definitions for thumbservice
//!
//! This module centralizes the **timeouts**, **default rendering parameters**, and **common type
//! definitions** used throughout the `thumbservice` crate.
//!
//! ## Overview
//!
//! - Per-call network timeouts (metadata, raw frame bytes, sibling listing)
//! - Default values applied to incoming thumbnail parameters
//! - Spectral band aliases used when composing color thumbnails
//! - Core type aliases for archive identifiers

use std::time::Duration;

// -------------------------------------------------------------------------------------------------
// Network timeouts
// -------------------------------------------------------------------------------------------------

/// Timeout for a single frame metadata lookup
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for downloading the raw bytes of one frame
pub const FRAME_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for listing the sibling frames of an observation request
pub const REQUEST_FRAMES_TIMEOUT: Duration = Duration::from_secs(30);

// -------------------------------------------------------------------------------------------------
// Pipeline constants
// -------------------------------------------------------------------------------------------------

/// Color thumbnails can only be generated from frames at this reduction level
pub const COLOR_REDUCTION_LEVEL: u32 = 91;

/// Lifetime of a presigned retrieval URL (8 hours)
pub const PRESIGNED_URL_TTL: Duration = Duration::from_secs(3600 * 8);

/// Content type of every uploaded thumbnail
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

// -------------------------------------------------------------------------------------------------
// Default thumbnail parameters
// -------------------------------------------------------------------------------------------------

pub const DEFAULT_WIDTH: u32 = 200;
pub const DEFAULT_HEIGHT: u32 = 200;
/// Largest accepted thumbnail width or height
pub const MAX_DIMENSION: u32 = 10_000;
pub const DEFAULT_PERCENTILE: f64 = 99.5;
pub const DEFAULT_QUALITY: u8 = 80;

// -------------------------------------------------------------------------------------------------
// Spectral bands
// -------------------------------------------------------------------------------------------------

/// Optical elements accepted for the red channel
pub const RED_FILTERS: &[&str] = &["R", "rp"];

/// Optical elements accepted for the visual (green) channel
pub const VISUAL_FILTERS: &[&str] = &["V"];

/// Optical elements accepted for the blue channel
pub const BLUE_FILTERS: &[&str] = &["B"];

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Archive identifier of a single frame
pub type FrameId = u64;

/// Archive identifier of the observation request a frame belongs to
pub type RequestId = u64;
