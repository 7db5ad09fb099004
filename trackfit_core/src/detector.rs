// trackfit_core/src/detector.rs

use crate::error::ConfigError;
use crate::types::TRACK_ORIGIN_X;

/// The ordered longitudinal positions of the flat detector layers.
///
/// Construction validates the geometry once; afterwards it is read-only and
/// can be shared by the simulator and any number of filters.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorGeometry {
    layers: Vec<f64>,
}

impl DetectorGeometry {
    /// Builds a geometry from explicit layer positions.
    ///
    /// Positions must be finite, positive (ahead of the track origin) and
    /// strictly increasing.
    pub fn new(layers: Vec<f64>) -> Result<Self, ConfigError> {
        if layers.is_empty() {
            return Err(ConfigError::EmptyGeometry);
        }

        let mut previous = TRACK_ORIGIN_X;
        for (index, &x) in layers.iter().enumerate() {
            if !x.is_finite() || x <= TRACK_ORIGIN_X {
                return Err(ConfigError::NonPositiveLayer { index, x });
            }
            if index > 0 && x <= previous {
                return Err(ConfigError::NonIncreasingLayers { index, previous, x });
            }
            previous = x;
        }

        Ok(Self { layers })
    }

    /// Builds `count` equally spaced layers, the first one a single spacing
    /// away from the origin.
    pub fn uniform(count: usize, spacing: f64) -> Result<Self, ConfigError> {
        crate::error::ensure_positive("layer_spacing", spacing)?;
        Self::new((1..=count).map(|i| i as f64 * spacing).collect())
    }

    pub fn layers(&self) -> &[f64] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always `false` for a validated geometry.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Longitudinal position of the initial track state.
    pub fn origin(&self) -> f64 {
        TRACK_ORIGIN_X
    }

    pub fn last_layer(&self) -> f64 {
        // Non-empty by construction.
        self.layers[self.layers.len() - 1]
    }
}
