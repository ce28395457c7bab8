//! Room navigation
//!
//! The closed set of screens and the only legal moves between them.

use crate::database::UserImages;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Room {
    Onboarding,
    LivingRoom,
    Closet,
    Mirror,
}

impl Room {
    /// Where a session starts, given the hydrated reference photos
    pub fn initial(user_images: &UserImages) -> Room {
        if user_images.is_complete() {
            Room::LivingRoom
        } else {
            Room::Onboarding
        }
    }

    /// Transition table. Nothing leads back into `Onboarding`.
    pub fn can_enter(self, to: Room, onboarded: bool) -> bool {
        match (self, to) {
            (Room::Onboarding, Room::LivingRoom) => onboarded,
            (Room::LivingRoom, Room::Closet)
            | (Room::LivingRoom, Room::Mirror)
            | (Room::Closet, Room::LivingRoom)
            | (Room::Mirror, Room::LivingRoom) => true,
            _ => false,
        }
    }

    pub fn transition(self, to: Room, onboarded: bool) -> Result<Room> {
        if self.can_enter(to, onboarded) {
            Ok(to)
        } else {
            Err(AppError::InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// The "back" button: Closet and Mirror return to the living room.
    pub fn back(self) -> Room {
        match self {
            Room::Closet | Room::Mirror => Room::LivingRoom,
            other => other,
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Room::Onboarding => "Onboarding",
            Room::LivingRoom => "LivingRoom",
            Room::Closet => "Closet",
            Room::Mirror => "Mirror",
        };
        f.write_str(name)
    }
}
