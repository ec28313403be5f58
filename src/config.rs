//! Invoice configuration

use crate::error::LensOrderError;
use crate::export::ExportSettings;
use crate::layout::LayoutConstraints;
use serde::{Deserialize, Serialize};

/// Tunable layout and export parameters.
///
/// Every field is optional in JSON; missing ones keep their defaults.
///
/// ```json
/// { "layout": { "breakMagnitude": 8.0 }, "export": { "settleMs": 300 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceConfig {
    pub layout: LayoutConstraints,
    pub export: ExportSettings,
}

impl InvoiceConfig {
    pub fn from_json(json: &str) -> Result<Self, LensOrderError> {
        serde_json::from_str(json).map_err(LensOrderError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json() {
        let config =
            InvoiceConfig::from_json(r#"{"layout":{"breakMagnitude":8.0},"export":{"settleMs":300}}"#)
                .unwrap();
        assert_eq!(config.layout.break_magnitude, 8.0);
        assert_eq!(config.layout.min_row_height_mm, 5.5);
        assert_eq!(config.export.settle_ms, 300);
        assert_eq!(config.export.page_width_px, 794);
    }

    #[test]
    fn test_empty_and_invalid() {
        assert_eq!(InvoiceConfig::from_json("{}").unwrap(), InvoiceConfig::default());
        assert!(matches!(
            InvoiceConfig::from_json("{oops"),
            Err(LensOrderError::Config(_))
        ));
    }
}
