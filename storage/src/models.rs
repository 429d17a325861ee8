use bson::oid::ObjectId;
use nlm_core::{GeneratorConfig, Landscape};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandscapeDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub name: String,
    // BSON has no unsigned 64-bit type; the seed's bits are kept as i64
    pub seed: i64,
    pub config: GeneratorConfig, // tagged by "model"
    pub landscape: Landscape,    // row-major grid, tagged by "kind"
}

impl LandscapeDoc {
    pub fn new(name: impl Into<String>, seed: u64, config: GeneratorConfig, landscape: Landscape) -> Self {
        Self {
            id: None,
            name: name.into(),
            seed: seed_key(seed),
            config,
            landscape,
        }
    }

    // Seed as the generators take it
    pub fn seed(&self) -> u64 {
        self.seed as u64
    }
}

// Bit-preserving u64 -> i64 used for the `seed` field and its queries
pub fn seed_key(seed: u64) -> i64 {
    seed as i64
}
