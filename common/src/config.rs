use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration for ray casting against a mesh and for the interior
/// distance computation built on top of it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TraceConfig {
    pub traversal: Traversal,
    /// Maximum number of triangles stored in one BVH leaf. Must be at least one.
    pub leaf_size: usize,
    /// Distance the origin of an interior ray is pushed into the mesh so it
    /// does not hit the face it started on.
    pub interior_ray_offset: f32,
}

/// How nearest-hit queries walk the mesh.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Traversal {
    /// Test every triangle of the mesh.
    Naive,
    /// Descend the bounding volume hierarchy.
    #[default]
    Accelerated,
}

impl TraceConfig {
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config = toml::from_str::<Self>(raw).context("Invalid trace config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config `{}`", path.display()))?;
        Self::from_toml(&raw)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.leaf_size >= 1, "leaf_size must be at least 1");
        anyhow::ensure!(
            self.interior_ray_offset.is_finite() && self.interior_ray_offset >= 0.0,
            "interior_ray_offset must be a finite, non-negative distance"
        );
        Ok(())
    }
}

impl Traversal {
    pub const ALL: [Traversal; 2] = [Traversal::Naive, Traversal::Accelerated];

    pub fn name(&self) -> &'static str {
        match self {
            Traversal::Naive => "Naive",
            Traversal::Accelerated => "BVH",
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            traversal: Traversal::Accelerated,
            leaf_size: 4,
            interior_ray_offset: 1e-4,
        }
    }
}
