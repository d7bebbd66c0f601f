use crate::composite::resolve::{AnchorIds, CornerSelection};
use crate::error::ConfigError;

/// Compositor settings for one overlay session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct CompositorConfig {
    /// Anchor marker ids in TL, TR, BR, BL order.
    pub anchors: AnchorIds,
    /// Fall back to the last good reference points when anchors are missing.
    pub use_cache: bool,
    pub corner_selection: CornerSelection,
    /// Side of the square erosion kernel. Must be odd.
    pub erode_kernel: u32,
    pub erode_iterations: u32,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            anchors: AnchorIds::default(),
            use_cache: true,
            corner_selection: CornerSelection::Diagonal,
            erode_kernel: 3,
            erode_iterations: 2,
        }
    }
}

impl CompositorConfig {
    pub fn with_anchors(anchors: AnchorIds) -> Self {
        Self {
            anchors,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.erode_kernel == 0 || self.erode_kernel % 2 == 0 {
            return Err(ConfigError::InvalidKernel(self.erode_kernel));
        }
        Ok(())
    }

    /// Parse and validate a TOML config.
    ///
    /// ```toml
    /// anchors = [923, 1001, 241, 1007]
    /// use_cache = true
    /// corner_selection = "diagonal"
    /// erode_kernel = 3
    /// erode_iterations = 2
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: CompositorConfig =
            toml::from_str(s).map_err(|e| ConfigError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_overlay() {
        let c = CompositorConfig::default();
        assert_eq!(c.anchors.ids(), [923, 1001, 241, 1007]);
        assert!(c.use_cache);
        assert_eq!(c.corner_selection, CornerSelection::Diagonal);
        assert_eq!((c.erode_kernel, c.erode_iterations), (3, 2));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn even_kernel_rejected() {
        let c = CompositorConfig {
            erode_kernel: 4,
            ..CompositorConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::InvalidKernel(4))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn parse_toml() {
        let c = CompositorConfig::from_toml_str(
            r#"
            anchors = [1, 2, 3, 4]
            use_cache = false
            corner_selection = "inner"
            "#,
        )
        .unwrap();
        assert_eq!(c.anchors.ids(), [1, 2, 3, 4]);
        assert!(!c.use_cache);
        assert_eq!(c.corner_selection, CornerSelection::Inner);
        assert_eq!(c.erode_kernel, 3);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn toml_with_three_anchors_is_rejected() {
        let err = CompositorConfig::from_toml_str("anchors = [1, 2, 3]").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
