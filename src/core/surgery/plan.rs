//! Surgery plans: the ordered list of region specs applied to one file.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::region::{CompiledRegion, RegionSpec};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurgeryPlan {
    pub regions: Vec<RegionSpec>,
}

impl SurgeryPlan {
    pub fn new(regions: Vec<RegionSpec>) -> Self {
        Self { regions }
    }

    /// Parse a plan from JSON. Accepts either `{"regions": [...]}` or a bare array.
    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed = if raw.trim_start().starts_with('[') {
            serde_json::from_str::<Vec<RegionSpec>>(raw).map(Self::new)
        } else {
            serde_json::from_str::<SurgeryPlan>(raw)
        };

        parsed.map_err(|e| {
            Error::validation_invalid_json(
                e,
                Some("parse surgery plan".to_string()),
                Some(raw.chars().take(200).collect()),
            )
        })
    }

    /// Validate and compile every region, in order.
    pub fn compile(&self) -> Result<Vec<CompiledRegion>> {
        if self.regions.is_empty() {
            return Err(Error::config_invalid_value(
                "regions",
                None,
                "Plan must contain at least one region",
            ));
        }

        let mut seen = HashSet::new();
        for (i, spec) in self.regions.iter().enumerate() {
            if !seen.insert(spec.name.as_str()) {
                return Err(Error::config_invalid_value(
                    format!("regions[{}].name", i),
                    Some(spec.name.clone()),
                    "Region names must be unique within a plan",
                ));
            }
        }

        self.regions
            .iter()
            .enumerate()
            .map(|(i, spec)| spec.compile(i))
            .collect()
    }
}
