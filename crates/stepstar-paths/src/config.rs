//! Grid construction parameters.

use crate::error::{Error, Result};

/// Initial dimensions and search settings of a [`Grid`](crate::Grid).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
    /// Allow 8-connected movement; otherwise 4-connected.
    pub can_walk_diagonal: bool,
    /// Cost of one straight step. Diagonal steps cost `√2` times this.
    pub stepping_cost: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            can_walk_diagonal: true,
            stepping_cost: 1.0,
        }
    }
}

impl GridConfig {
    /// Check every field with the same rules the grid setters apply.
    pub fn validate(&self) -> Result<()> {
        check_dimension("width", self.width)?;
        check_dimension("height", self.height)?;
        check_stepping_cost(self.stepping_cost)?;
        Ok(())
    }
}

pub(crate) fn check_dimension(name: &str, value: i32) -> Result<i32> {
    if value < 0 {
        return Err(Error::invalid(format!(
            "{name} must be a non-negative integer, got {value}"
        )));
    }
    Ok(value)
}

pub(crate) fn check_stepping_cost(value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::invalid(format!(
            "stepping cost must be a finite number greater than zero, got {value}"
        )));
    }
    Ok(value)
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let cfg: GridConfig = serde_json::from_str(r#"{"width": 4, "height": 3}"#).unwrap();
        assert_eq!(cfg.width, 4);
        assert_eq!(cfg.height, 3);
        assert!(cfg.can_walk_diagonal);
    }

    #[test]
    fn fractional_dimension_is_rejected() {
        let res: std::result::Result<GridConfig, _> = serde_json::from_str(r#"{"width": 2.5}"#);
        assert!(res.is_err());
    }
}
