use serde::{Deserialize, Serialize};
use std::fmt;

/// An entity kind id outside the known range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what} kind {id}")]
pub struct UnknownKind {
    pub what: &'static str,
    pub id: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum EnemyKind {
    #[default]
    Zombie = 0,
    Sergeant = 1,
    Imp = 2,
    Demon = 3,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Zombie,
        EnemyKind::Sergeant,
        EnemyKind::Imp,
        EnemyKind::Demon,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Zombie => "Zombie",
            EnemyKind::Sergeant => "Sergeant",
            EnemyKind::Imp => "Imp",
            EnemyKind::Demon => "Demon",
        }
    }
}

impl TryFrom<u8> for EnemyKind {
    type Error = UnknownKind;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        EnemyKind::ALL
            .get(usize::from(id))
            .copied()
            .ok_or(UnknownKind { what: "enemy", id })
    }
}

impl From<EnemyKind> for u8 {
    fn from(kind: EnemyKind) -> u8 {
        kind.id()
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum PickupKind {
    #[default]
    AmmoClip = 0,
    HealthSmall = 1,
    HealthLarge = 2,
    Shotgun = 3,
    Helmet = 4,
    Armor = 5,
    Shells = 6,
    RocketLauncher = 7,
}

impl PickupKind {
    pub const ALL: [PickupKind; 8] = [
        PickupKind::AmmoClip,
        PickupKind::HealthSmall,
        PickupKind::HealthLarge,
        PickupKind::Shotgun,
        PickupKind::Helmet,
        PickupKind::Armor,
        PickupKind::Shells,
        PickupKind::RocketLauncher,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            PickupKind::AmmoClip => "Ammo clip",
            PickupKind::HealthSmall => "Health small",
            PickupKind::HealthLarge => "Health large",
            PickupKind::Shotgun => "Shotgun",
            PickupKind::Helmet => "Helmet",
            PickupKind::Armor => "Armor",
            PickupKind::Shells => "Shells",
            PickupKind::RocketLauncher => "Rocket launcher",
        }
    }
}

impl TryFrom<u8> for PickupKind {
    type Error = UnknownKind;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        PickupKind::ALL
            .get(usize::from(id))
            .copied()
            .ok_or(UnknownKind { what: "pickup", id })
    }
}

impl From<PickupKind> for u8 {
    fn from(kind: PickupKind) -> u8 {
        kind.id()
    }
}

impl fmt::Display for PickupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enemy_ids() {
        assert_eq!(EnemyKind::try_from(2), Ok(EnemyKind::Imp));
        assert!(EnemyKind::try_from(4).is_err());
    }

    #[test]
    fn pickup_ids() {
        assert_eq!(PickupKind::try_from(7), Ok(PickupKind::RocketLauncher));
        let err = PickupKind::try_from(8).unwrap_err();
        assert_eq!(err.to_string(), "unknown pickup kind 8");
    }
}
