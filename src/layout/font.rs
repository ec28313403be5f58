//! Font sizing for the printed matrix

/// Discrete table font sizes, from the widest tables down
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FontTier {
    Tiny,
    Small,
    Compact,
    Medium,
    Regular,
}

impl FontTier {
    /// Pick the tier for a table with `columns` data columns.
    /// More columns never yields a larger font.
    pub fn for_columns(columns: usize) -> Self {
        match columns {
            c if c > 30 => FontTier::Tiny,
            c if c > 20 => FontTier::Small,
            c if c > 14 => FontTier::Compact,
            c if c > 10 => FontTier::Medium,
            _ => FontTier::Regular,
        }
    }

    /// Font size in CSS pixels
    pub fn px(self) -> f32 {
        match self {
            FontTier::Tiny => 5.0,
            FontTier::Small => 6.0,
            FontTier::Compact => 7.0,
            FontTier::Medium => 8.0,
            FontTier::Regular => 9.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers() {
        assert_eq!(FontTier::for_columns(1).px(), 9.0);
        assert_eq!(FontTier::for_columns(10).px(), 9.0);
        assert_eq!(FontTier::for_columns(11).px(), 8.0);
        assert_eq!(FontTier::for_columns(15).px(), 7.0);
        assert_eq!(FontTier::for_columns(25).px(), 6.0);
        assert_eq!(FontTier::for_columns(31).px(), 5.0);
    }

    #[test]
    fn test_non_increasing() {
        let sizes: Vec<f32> = (0..64).map(|c| FontTier::for_columns(c).px()).collect();
        assert!(sizes.windows(2).all(|w| w[1] <= w[0]));
    }
}
