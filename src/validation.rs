//! Checks for every externally supplied parameter.
//!
//! All functions are pure: they run before any request reaches the collector
//! or the Spotify API.

use crate::{
    error::ValidationError,
    types::{ImageQuality, TimeRange},
};

pub const MAX_DIMENSION: u32 = 20;
pub const MAX_MURAL_CELLS: u32 = 200;
pub const MAX_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_OFFSET: i64 = 200;

/// Parses a single mural dimension from user input.
pub fn parse_dimension(value: &str) -> Result<u32, ValidationError> {
    let value: i64 = value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidDimensions("Dimensions must be whole numbers".into()))?;
    if value < 1 {
        return Err(ValidationError::InvalidDimensions(
            "Dimensions must be at least 1x1".into(),
        ));
    }
    u32::try_from(value)
        .map_err(|_| ValidationError::InvalidDimensions("Dimensions cannot exceed 20x20".into()))
}

pub fn validate_dimensions(width: u32, height: u32) -> Result<(), ValidationError> {
    if width < 1 || height < 1 {
        return Err(ValidationError::InvalidDimensions(
            "Dimensions must be at least 1x1".into(),
        ));
    }

    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ValidationError::InvalidDimensions(
            "Dimensions cannot exceed 20x20".into(),
        ));
    }

    if width * height > MAX_MURAL_CELLS {
        return Err(ValidationError::InvalidDimensions(
            "Total mural size cannot exceed 200 albums".into(),
        ));
    }

    Ok(())
}

pub fn parse_quality(value: &str) -> Result<ImageQuality, ValidationError> {
    value.parse()
}

pub fn parse_time_range(value: &str) -> Result<TimeRange, ValidationError> {
    value.parse()
}

/// Pagination bounds accepted by the top-tracks route.
pub fn validate_page_bounds(limit: i64, offset: i64) -> Result<(), ValidationError> {
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(ValidationError::InvalidLimit(
            "Limit must be between 1 and 50".into(),
        ));
    }

    if !(0..=MAX_PAGE_OFFSET).contains(&offset) {
        return Err(ValidationError::InvalidOffset(
            "Offset must be between 0 and 200".into(),
        ));
    }

    Ok(())
}

/// Parses a raw `limit` query value, clamped to at most 50.
pub fn parse_limit(value: &str) -> Result<i64, ValidationError> {
    value
        .trim()
        .parse::<i64>()
        .map(|limit| limit.min(MAX_PAGE_LIMIT))
        .map_err(|_| ValidationError::InvalidLimit("Limit must be between 1 and 50".into()))
}

/// Parses a raw `offset` query value, clamped to at least 0.
pub fn parse_offset(value: &str) -> Result<i64, ValidationError> {
    value
        .trim()
        .parse::<i64>()
        .map(|offset| offset.max(0))
        .map_err(|_| ValidationError::InvalidOffset("Offset must be between 0 and 200".into()))
}
