use core::ops::{BitOr, BitOrAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Category tag attached to every intersectable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Classification {
    /// Geometry that blocks line of sight and can be hidden behind.
    Wall,
    /// The entity being evaded.
    Threat,
    /// Designated hiding spot.
    SafePoint,
    Other,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::Wall,
        Classification::Threat,
        Classification::SafePoint,
        Classification::Other,
    ];

    const fn bit(self) -> u8 {
        match self {
            Classification::Wall => 1 << 0,
            Classification::Threat => 1 << 1,
            Classification::SafePoint => 1 << 2,
            Classification::Other => 1 << 3,
        }
    }
}

/// A set of [`Classification`] tags.
///
/// Used both to restrict which objects a visibility query considers and to interpret the tag of
/// a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "Vec<Classification>", into = "Vec<Classification>")
)]
pub struct ClassMask(u8);

impl ClassMask {
    pub const NONE: Self = Self(0);
    pub const WALL: Self = Self::only(Classification::Wall);
    pub const THREAT: Self = Self::only(Classification::Threat);
    pub const SAFE_POINT: Self = Self::only(Classification::SafePoint);
    pub const OTHER: Self = Self::only(Classification::Other);
    pub const ALL: Self = Self(0b1111);

    pub const fn only(class: Classification) -> Self {
        Self(class.bit())
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, class: Classification) -> bool {
        self.0 & class.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Classification> {
        Classification::ALL
            .into_iter()
            .filter(move |c| self.contains(*c))
    }
}

impl From<Classification> for ClassMask {
    fn from(value: Classification) -> Self {
        Self::only(value)
    }
}

impl BitOr for ClassMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for ClassMask {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl FromIterator<Classification> for ClassMask {
    fn from_iter<I: IntoIterator<Item = Classification>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::NONE, |mask, class| mask | Self::only(class))
    }
}

impl From<Vec<Classification>> for ClassMask {
    fn from(value: Vec<Classification>) -> Self {
        value.into_iter().collect()
    }
}

impl From<ClassMask> for Vec<Classification> {
    fn from(value: ClassMask) -> Self {
        value.iter().collect()
    }
}

/// Which tags count as walls, threats and safe points for one scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClassMasks {
    pub wall: ClassMask,
    pub threat: ClassMask,
    pub safe_point: ClassMask,
}

impl Default for ClassMasks {
    fn default() -> Self {
        Self {
            wall: ClassMask::WALL,
            threat: ClassMask::THREAT,
            safe_point: ClassMask::SAFE_POINT,
        }
    }
}

impl ClassMasks {
    pub fn is_wall(&self, class: Classification) -> bool {
        self.wall.contains(class)
    }

    pub fn is_threat(&self, class: Classification) -> bool {
        self.threat.contains(class)
    }

    pub fn is_safe_point(&self, class: Classification) -> bool {
        self.safe_point.contains(class)
    }

    /// Mask for the directional probe: walls and threats stop a candidate ray.
    pub fn probe(&self) -> ClassMask {
        self.wall | self.threat
    }
}
