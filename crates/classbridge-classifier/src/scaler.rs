//! Scaling-profile loading and feature standardization
//!
//! The profile artifact is semi-structured text holding two bracketed numeric
//! arrays under the quoted keys `"mean"` and `"scale"`. Extraction is
//! deliberately narrow: find the quoted key, take the first `[`...`]` after
//! it, split on commas. A missing key or bracket yields an empty array (which
//! then fails length validation), while a token that is not a number fails
//! the whole load.

use crate::config::ScalerPolicy;
use crate::numeric::parse_f64_prefix;
use classbridge_core::{Artifact, Error, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Per-feature affine normalization parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingProfile {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl ScalingProfile {
    /// Build a profile from explicit arrays of equal length
    pub fn from_parts(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        if mean.len() != scale.len() {
            return Err(Error::invalid_scaler(format!(
                "mean has {} entries but scale has {}",
                mean.len(),
                scale.len()
            )));
        }
        Ok(Self { mean, scale })
    }

    /// Profile that leaves features unchanged (mean 0, scale 1)
    pub fn identity(feature_count: usize) -> Self {
        Self {
            mean: vec![0.0; feature_count],
            scale: vec![1.0; feature_count],
        }
    }

    /// Extract and validate a profile from artifact text
    pub fn parse(content: &str, feature_count: usize, policy: &ScalerPolicy) -> Result<Self> {
        let mean = extract_array(content, "mean")?;
        let scale = extract_array(content, "scale")?;

        let profile = Self { mean, scale };
        profile.validate(feature_count, policy)?;
        Ok(profile)
    }

    /// Read, extract and validate a profile from a file
    pub fn load(
        path: impl AsRef<Path>,
        feature_count: usize,
        policy: &ScalerPolicy,
    ) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::open(Artifact::Scaler, path, e))?;
        let content = String::from_utf8_lossy(&bytes);

        let profile = Self::parse(&content, feature_count, policy).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Rejected scaling profile");
            e
        })?;

        debug!(path = %path.display(), features = feature_count, "Loaded scaling profile");
        Ok(profile)
    }

    /// Check both arrays have exactly `feature_count` entries
    pub fn validate(&self, feature_count: usize, policy: &ScalerPolicy) -> Result<()> {
        if self.mean.len() != feature_count || self.scale.len() != feature_count {
            return Err(Error::invalid_scaler(format!(
                "expected {} mean and scale values, found {} and {}",
                feature_count,
                self.mean.len(),
                self.scale.len()
            )));
        }

        if policy.reject_zero_scale {
            if let Some(idx) = self.scale.iter().position(|&s| s == 0.0) {
                return Err(Error::invalid_scaler(format!("scale[{}] is zero", idx)));
            }
        }

        Ok(())
    }

    /// Apply `(x - mean) / scale` elementwise.
    ///
    /// A zero scale entry is not guarded and yields a non-finite feature.
    pub fn standardize(&self, features: &[f32]) -> Vec<f32> {
        debug_assert_eq!(features.len(), self.mean.len());

        features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(&x, (&mean, &scale))| ((f64::from(x) - mean) / scale) as f32)
            .collect()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Number of features covered by the profile
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

/// Extract the numeric array following the quoted `key`.
///
/// Returns an empty vector when the key, the opening bracket or the closing
/// bracket is missing. Whitespace is removed from every token and empty
/// tokens are skipped; any other token must start with a number in `f64`
/// range. Text after the number is ignored.
pub fn extract_array(content: &str, key: &str) -> Result<Vec<f64>> {
    let quoted = format!("\"{}\"", key);
    let Some(key_pos) = content.find(&quoted) else {
        return Ok(Vec::new());
    };

    let after_key = &content[key_pos..];
    let Some(open) = after_key.find('[') else {
        return Ok(Vec::new());
    };
    let body = &after_key[open + 1..];
    let Some(close) = body.find(']') else {
        return Ok(Vec::new());
    };

    let mut values = Vec::new();
    for raw in body[..close].split(',') {
        let token: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if token.is_empty() {
            continue;
        }

        let value = parse_f64_prefix(&token).ok_or_else(|| Error::ScalerParse {
            key: key.to_string(),
            token: token.clone(),
        })?;
        values.push(value);
    }

    Ok(values)
}
