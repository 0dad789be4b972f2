//! Unit conversion utilities.
//!
//! Page and paragraph geometry is in twips (1/20 pt); DrawingML extents are
//! in EMUs.

pub const EMUS_PER_INCH: i64 = 914_400;
pub const TWIPS_PER_INCH: i64 = 1_440;

/// Default resolution assumed for images sized in pixels.
pub const DEFAULT_PPI: u32 = 72;

#[inline]
pub fn px_to_emu(px: u32, ppi: u32) -> i64 {
    if ppi == 0 {
        return 0;
    }
    ((px as f64) * EMUS_PER_INCH as f64 / ppi as f64) as i64
}

#[inline]
pub fn inch_to_twip(inches: f64) -> u32 {
    (inches * TWIPS_PER_INCH as f64) as u32
}
