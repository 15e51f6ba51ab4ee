//! Currency formatting utilities for DASH and duff values

use crate::types::DUFFS_PER_DASH;

/// Format a duff amount as dual DASH + duffs display
///
/// # Examples
/// ```
/// use darinals::utils::currency::format_duffs_as_dash;
///
/// assert_eq!(
///     format_duffs_as_dash(2812535185),
///     "28.12535185 DASH (2812535185 duffs)"
/// );
/// assert_eq!(
///     format_duffs_as_dash(15000),
///     "0.00015000 DASH (15000 duffs)"
/// );
/// ```
pub fn format_duffs_as_dash(duffs: u64) -> String {
    let dash = duffs as f64 / DUFFS_PER_DASH;
    format!("{:.8} DASH ({} duffs)", dash, duffs)
}
