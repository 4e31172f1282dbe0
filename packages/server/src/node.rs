use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use serde::Serialize;
use uuid::Uuid;

/// Display colour used by dashboards to tell nodes apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct NodeColor {
    #[schema(example = "Peter River")]
    pub name: &'static str,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const fn color(name: &'static str, r: u8, g: u8, b: u8) -> NodeColor {
    NodeColor { name, r, g, b }
}

pub const PALETTE: [NodeColor; 7] = [
    color("Peter River", 52, 152, 219),
    color("Alizarin", 231, 76, 60),
    color("Turquoise", 26, 188, 156),
    color("Amethyst", 155, 89, 182),
    color("Forgotten Purple", 153, 128, 250),
    color("Bara Red", 237, 76, 103),
    color("Cornflower", 84, 109, 229),
];

/// Identity of this node, fixed for the lifetime of the process.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct NodeInfo {
    pub id: Uuid,
    pub name: String,
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    #[schema(example = "unix")]
    pub platform: &'static str,
    pub color: NodeColor,
    pub started_at: DateTime<Utc>,
}

impl NodeInfo {
    pub fn generate(name: impl Into<String>) -> Self {
        let color = PALETTE
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(PALETTE[0]);
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            version: env!("CARGO_PKG_VERSION"),
            platform: std::env::consts::FAMILY,
            color,
            started_at: Utc::now(),
        }
    }
}
