//! Fixed EVE reference data used for classification.
//!
//! A thin slice of the static data export: ship group classes, a type to
//! group mapping for hulls that appear on killmails, cyno module types,
//! and the Pochven system set. The tables are fixed data, not fetched.

mod groups;
mod types;

pub use groups::{class_of_group, ShipCategory, ShipClass, ShipSize};
pub use types::group_of_type;

/// Cynosural field generator module type ids (standard and covert).
pub const CYNO_MODULE_TYPES: &[i64] = &[21096, 28646];

/// Solar systems of the Pochven region. The systems endpoint exposes no
/// region, so the triglavian systems are pinned by id.
pub const POCHVEN_SYSTEM_IDS: &[i64] = &[
    30000021, 30000157, 30000192, 30001372, 30001381, 30001413, 30001445,
    30002079, 30002737, 30002797, 30003504, 30003535, 30005029, 30010141,
    30031392, 30040141, 30045328, 30045329, 30001400, 30002652, 30002702,
    30002770, 30003495, 30003829, 30004972, 30005005, 30020141,
];

pub fn is_pochven_system(system_id: i64) -> bool {
    POCHVEN_SYSTEM_IDS.contains(&system_id)
}

/// Classification of a ship type, when its hull is known.
pub fn class_of_type(type_id: i64) -> Option<ShipClass> {
    group_of_type(type_id).and_then(class_of_group)
}

/// Whether the attacker row represents a cyno being lit.
pub fn is_cyno_module(type_id: i64) -> bool {
    CYNO_MODULE_TYPES.contains(&type_id)
}

impl ShipClass {
    pub fn is_capital(&self) -> bool {
        matches!(self.size, ShipSize::Capital)
    }

    pub fn is_industrial(&self) -> bool {
        matches!(
            self.category,
            ShipCategory::Industrial | ShipCategory::Mining | ShipCategory::Transport
        )
    }

    pub fn is_black_ops(&self) -> bool {
        matches!(self.category, ShipCategory::BlackOps)
    }
}
