use serde::Serialize;
use std::str::FromStr;
use crate::models::GfxDetails;

const R15_BASE: u32 = 400;
const R6_BASE: u32 = 200;
const ROUGH_FINISH: u32 = 50;
const CUSTOM_OPTION: u32 = 50;
const PER_WEAPON: u32 = 100;

// Roblox avatar rig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigType {
    R6,
    R15,
}

impl RigType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RigType::R6 => "R6",
            RigType::R15 => "R15",
        }
    }

    fn base_price(&self) -> u32 {
        match self {
            RigType::R6 => R6_BASE,
            RigType::R15 => R15_BASE,
        }
    }
}

impl FromStr for RigType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "R6" => Ok(RigType::R6),
            "R15" => Ok(RigType::R15),
            other => Err(format!("unknown rig type: {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFinish {
    #[default]
    Shiny,
    Rough,
}

impl TextureFinish {
    // Anything other than "Rough" prices like the default finish
    pub fn parse_lenient(s: &str) -> Self {
        if s.trim() == "Rough" {
            TextureFinish::Rough
        } else {
            TextureFinish::Shiny
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub label: String,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub line_items: Vec<LineItem>,
    pub total: u32,
    pub currency: &'static str,
}

// Counts the listed weapons/tools: one per non-blank line.
pub fn weapons_count(weapons: &str) -> u32 {
    weapons
        .lines() // handles both \n and \r\n
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .count() as u32
}

// Prices a GFX order. Line items keep a fixed order so the same input
// always renders the same breakdown.
pub fn compute_total(gfx: &GfxDetails) -> Quote {
    let mut items = Vec::new();

    if let Ok(rig) = gfx.rig_type.parse::<RigType>() {
        items.push(LineItem {
            label: format!("Base GFX Render ({})", rig.as_str()),
            amount: rig.base_price(),
        });
    }

    if TextureFinish::parse_lenient(&gfx.texture_finish) == TextureFinish::Rough {
        items.push(LineItem {
            label: "Texture: Rough Finish".to_string(),
            amount: ROUGH_FINISH,
        });
    }

    let options = [
        (&gfx.lighting, "Custom Blender Lighting"),
        (&gfx.positioning, "Custom Character Pose"),
        (&gfx.stages, "Stages / Podiums"),
        (&gfx.effects, "Stroke / Glow / PS Effects"),
    ];
    for (field, label) in options {
        if !field.trim().is_empty() {
            items.push(LineItem {
                label: label.to_string(),
                amount: CUSTOM_OPTION,
            });
        }
    }

    let weapons = weapons_count(&gfx.weapons);
    if weapons > 0 {
        items.push(LineItem {
            label: format!("Weapons / Tools ({weapons})"),
            amount: PER_WEAPON * weapons,
        });
    }

    let total = items.iter().map(|item| item.amount).sum();

    Quote {
        line_items: items,
        total,
        currency: "Robux",
    }
}
