//! Ship group classification table.
//!
//! Maps inventory group ids to a size and a category. Only groups that
//! appear on killmails matter here; anything unmapped falls through to
//! `None` and is treated as unclassified by the analyzers.

use serde::{Deserialize, Serialize};

/// Hull size class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipSize {
    Frigate,
    Destroyer,
    Cruiser,
    Battlecruiser,
    Battleship,
    Capital,
    Industrial,
    Other,
}

/// Functional category of a hull.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipCategory {
    Combat,
    BlackOps,
    Logistics,
    Industrial,
    Mining,
    Transport,
    Capsule,
}

/// Size and category of one ship group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipClass {
    pub size: ShipSize,
    pub category: ShipCategory,
}

const fn class(size: ShipSize, category: ShipCategory) -> ShipClass {
    ShipClass { size, category }
}

/// Classification for a ship group id, `None` when the group is not a
/// hull the analyzers care about.
pub fn class_of_group(group_id: i64) -> Option<ShipClass> {
    use ShipCategory::*;
    use ShipSize::*;

    let found = match group_id {
        // Frigate hulls
        25 => class(Frigate, Combat),           // Frigate
        324 => class(Frigate, Combat),          // Assault Frigate
        830 => class(Frigate, Combat),          // Covert Ops
        831 => class(Frigate, Combat),          // Interceptor
        834 => class(Frigate, Combat),          // Stealth Bomber
        893 => class(Frigate, Combat),          // Electronic Attack Ship
        1283 => class(Frigate, Mining),         // Expedition Frigate
        1527 => class(Frigate, Logistics),      // Logistics Frigate

        // Destroyer hulls
        420 => class(Destroyer, Combat),        // Destroyer
        541 => class(Destroyer, Combat),        // Interdictor
        1305 => class(Destroyer, Combat),       // Tactical Destroyer
        1534 => class(Destroyer, Combat),       // Command Destroyer

        // Cruiser hulls
        26 => class(Cruiser, Combat),           // Cruiser
        358 => class(Cruiser, Combat),          // Heavy Assault Cruiser
        832 => class(Cruiser, Logistics),       // Logistics
        833 => class(Cruiser, Combat),          // Force Recon Ship
        894 => class(Cruiser, Combat),          // Heavy Interdiction Cruiser
        906 => class(Cruiser, Combat),          // Combat Recon Ship
        963 => class(Cruiser, Combat),          // Strategic Cruiser

        // Battlecruiser hulls
        419 => class(Battlecruiser, Combat),    // Combat Battlecruiser
        540 => class(Battlecruiser, Combat),    // Command Ship
        1201 => class(Battlecruiser, Combat),   // Attack Battlecruiser

        // Battleship hulls
        27 => class(Battleship, Combat),        // Battleship
        898 => class(Battleship, BlackOps),     // Black Ops
        900 => class(Battleship, Combat),       // Marauder

        // Capitals
        30 => class(Capital, Combat),           // Titan
        485 => class(Capital, Combat),          // Dreadnought
        547 => class(Capital, Combat),          // Carrier
        659 => class(Capital, Combat),          // Supercarrier
        883 => class(Capital, ShipCategory::Industrial),      // Capital Industrial Ship
        1538 => class(Capital, Combat),         // Force Auxiliary

        // Industrials and haulers
        28 => class(ShipSize::Industrial, ShipCategory::Industrial),    // Hauler
        380 => class(ShipSize::Industrial, Transport),        // Deep Space Transport
        513 => class(ShipSize::Industrial, Transport),        // Freighter
        902 => class(ShipSize::Industrial, Transport),        // Jump Freighter
        941 => class(ShipSize::Industrial, ShipCategory::Industrial),   // Industrial Command Ship
        1202 => class(ShipSize::Industrial, Transport),       // Blockade Runner

        // Mining
        463 => class(ShipSize::Industrial, Mining),           // Mining Barge
        543 => class(ShipSize::Industrial, Mining),           // Exhumer

        // Pods
        29 => class(Other, Capsule),            // Capsule

        _ => return None,
    };

    Some(found)
}
