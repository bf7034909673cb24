//! Ship type to inventory group mapping.
//!
//! Covers the hulls that dominate killmail traffic. The table is a fixed
//! excerpt of the static data export; unmapped types return `None` and
//! stay unclassified rather than guessing.

/// Inventory group for a ship type id.
pub fn group_of_type(type_id: i64) -> Option<i64> {
    let group = match type_id {
        // T1 frigates
        587 | 589 | 597 | 602 | 603 => 25,
        // Pirate faction frigates
        17932 | 17841 => 25,
        // Interceptors
        11176 | 11184 | 11196 | 11200 => 831,
        // Covert ops
        11172 | 11182 | 11188 | 11192 => 830,
        // Stealth bombers
        11377 | 12032 | 12034 | 12038 => 834,
        // Assault frigates
        11365 | 11379 | 12042 | 12044 => 324,

        // T1 destroyers
        16236 | 16238 | 16240 | 16242 => 420,
        // Interdictors
        22452 | 22456 | 22460 | 22464 => 541,
        // Tactical destroyers
        34317 | 34562 | 34828 | 35683 => 1305,

        // T1 cruisers
        621 | 622 | 623 | 624 | 626 | 627 | 629 | 2006 => 26,
        // Pirate faction cruisers
        17715 | 17720 | 17722 | 33818 => 26,
        // Heavy assault cruisers
        11993 | 11999 | 12003 | 12005 | 12011 | 12015 | 12019 | 12023 => 358,
        // Force recons
        11957 | 11963 | 11965 | 11969 => 833,
        // Combat recons
        11959 | 11961 | 11967 | 11971 => 906,
        // Logistics cruisers
        11978 | 11985 | 11987 | 11989 => 832,
        // Heavy interdiction cruisers
        11995 | 12013 | 12017 | 12021 => 894,
        // Strategic cruisers
        29984 | 29986 | 29988 | 29990 => 963,

        // Combat battlecruisers
        16227 | 16229 | 16231 | 16233 | 24696 | 24698 | 24700 | 24702 => 419,
        // Attack battlecruisers
        4302 | 4306 | 4308 | 4310 => 1201,
        // Command ships
        22442 | 22444 | 22446 | 22448 => 540,

        // T1 battleships
        638 | 639 | 640 | 641 | 642 | 643 | 644 | 645 => 27,
        // T2/faction battleships
        24688 | 24690 | 24692 | 24694 => 27,
        17736 | 17738 | 17740 | 17918 | 17920 => 27,
        // Marauders
        28659 | 28661 | 28665 | 28710 => 900,
        // Black ops
        22428 | 22430 | 22436 | 22440 => 898,

        // Dreadnoughts
        19720 | 19722 | 19724 | 19726 | 52907 => 485,
        // Carriers
        23757 | 23911 | 23915 | 24483 => 547,
        // Supercarriers
        22852 | 23913 | 23917 | 23919 => 659,
        // Titans
        671 | 3764 | 11567 | 23773 => 30,
        // Force auxiliaries
        37604 | 37605 | 37606 | 37608 => 1538,

        // Haulers
        648 | 649 | 652 | 655 | 657 | 1944 => 28,
        // Blockade runners
        12729 | 12731 | 12733 | 12735 => 1202,
        // Freighters
        20183 | 20185 | 20187 | 20189 => 513,
        // Jump freighters
        28840 | 28844 | 28846 | 28850 => 902,
        // Mining barges
        17476 | 17478 | 17480 => 463,
        // Exhumers
        22544 | 22546 | 22548 => 543,
        // Capital industrial / command
        28352 => 883,
        28606 => 941,

        // Capsule
        670 => 29,

        _ => return None,
    };

    Some(group)
}
