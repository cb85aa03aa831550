use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{CameraId, CameraStatus};

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown slot: {0}")]
pub struct SlotError(String);

/// Fixed display position on the camera wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    #[serde(rename = "main")]
    Main,
    #[serde(rename = "secondary-1")]
    Secondary1,
    #[serde(rename = "secondary-2")]
    Secondary2,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Main, Slot::Secondary1, Slot::Secondary2];

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Main => "main",
            Slot::Secondary1 => "secondary-1",
            Slot::Secondary2 => "secondary-2",
        }
    }

    fn index(self) -> usize {
        match self {
            Slot::Main => 0,
            Slot::Secondary1 => 1,
            Slot::Secondary2 => 2,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| SlotError(s.to_string()))
    }
}

/// A slot that can be swapped with `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecondarySlot {
    #[serde(rename = "secondary-1")]
    First,
    #[serde(rename = "secondary-2")]
    Second,
}

impl From<SecondarySlot> for Slot {
    fn from(slot: SecondarySlot) -> Self {
        match slot {
            SecondarySlot::First => Slot::Secondary1,
            SecondarySlot::Second => Slot::Secondary2,
        }
    }
}

impl fmt::Display for SecondarySlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Slot::from(*self).fmt(f)
    }
}

impl FromStr for SecondarySlot {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Slot>()? {
            Slot::Secondary1 => Ok(SecondarySlot::First),
            Slot::Secondary2 => Ok(SecondarySlot::Second),
            Slot::Main => Err(SlotError(s.to_string())),
        }
    }
}

/// Which camera occupies which slot.
///
/// Seeded once from the first status snapshot holding at least three cameras
/// and afterwards changed only by [`SlotAssignment::swap`]. Ids of cameras that
/// later vanish from the status list are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlotAssignment {
    slots: [Option<CameraId>; 3],
    #[serde(skip)]
    initialized: bool,
}

impl SlotAssignment {
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns `true` if this call performed the one-time seeding.
    pub fn seed(&mut self, cameras: &[CameraStatus]) -> bool {
        if self.initialized || cameras.len() < Slot::ALL.len() {
            return false;
        }

        for (slot, camera) in self.slots.iter_mut().zip(cameras) {
            *slot = Some(camera.camera_id.clone());
        }
        self.initialized = true;
        true
    }

    pub fn swap(&mut self, secondary: SecondarySlot) {
        self.slots
            .swap(Slot::Main.index(), Slot::from(secondary).index());
    }

    pub fn get(&self, slot: Slot) -> Option<&CameraId> {
        self.slots[slot.index()].as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, Option<&CameraId>)> {
        Slot::ALL.into_iter().map(|slot| (slot, self.get(slot)))
    }
}
