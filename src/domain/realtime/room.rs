//! Broadcast rooms and the role → rooms table.

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::foundation::{Role, TableId, ValidationError};

/// Named audience a notification is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Room {
    Global,
    Kitchen,
    Waiters,
    Management,
    /// Joined explicitly, e.g. by a customer's phone after scanning the QR code.
    Table(TableId),
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Global => f.write_str("global"),
            Room::Kitchen => f.write_str("kitchen"),
            Room::Waiters => f.write_str("waiters"),
            Room::Management => f.write_str("management"),
            Room::Table(id) => write!(f, "table:{}", id),
        }
    }
}

impl FromStr for Room {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Room::Global),
            "kitchen" => Ok(Room::Kitchen),
            "waiters" => Ok(Room::Waiters),
            "management" => Ok(Room::Management),
            other => other
                .strip_prefix("table:")
                .and_then(|id| id.parse().ok())
                .map(Room::Table)
                .ok_or_else(|| {
                    ValidationError::invalid_format("room", format!("unknown room '{}'", other))
                }),
        }
    }
}

impl Serialize for Room {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Room {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Rooms each role joins automatically on connect.
pub static ROLE_ROOMS: &[(Role, &[Room])] = &[
    (
        Role::Admin,
        &[Room::Global, Room::Kitchen, Room::Waiters, Room::Management],
    ),
    (
        Role::Manager,
        &[Room::Global, Room::Kitchen, Room::Waiters, Room::Management],
    ),
    (Role::Kitchen, &[Room::Global, Room::Kitchen]),
    (Role::Waiter, &[Room::Global, Room::Waiters]),
    (Role::Cashier, &[Room::Global]),
    (Role::Customer, &[Room::Global]),
];

static ROLE_ROOM_INDEX: Lazy<HashMap<Role, &'static [Room]>> =
    Lazy::new(|| ROLE_ROOMS.iter().copied().collect());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomTableError {
    #[error("role {0} has no room entry")]
    MissingRole(Role),

    #[error("role {0} is listed more than once")]
    DuplicateRole(Role),

    #[error("role {0} does not join the global room")]
    MissingGlobal(Role),

    #[error("role {0} lists a table room; table rooms are joined explicitly")]
    StaticTableRoom(Role),
}

/// Checks a role → rooms table. Run once at startup against [`ROLE_ROOMS`].
pub fn validate_room_table(table: &[(Role, &[Room])]) -> Result<(), RoomTableError> {
    for (index, (role, rooms)) in table.iter().enumerate() {
        if table[..index].iter().any(|(earlier, _)| earlier == role) {
            return Err(RoomTableError::DuplicateRole(*role));
        }
        if !rooms.contains(&Room::Global) {
            return Err(RoomTableError::MissingGlobal(*role));
        }
        if rooms.iter().any(|room| matches!(room, Room::Table(_))) {
            return Err(RoomTableError::StaticTableRoom(*role));
        }
    }
    for role in Role::ALL {
        if !table.iter().any(|(listed, _)| *listed == role) {
            return Err(RoomTableError::MissingRole(role));
        }
    }
    Ok(())
}

pub fn validate_role_rooms() -> Result<(), RoomTableError> {
    validate_room_table(ROLE_ROOMS)
}

pub fn rooms_for_role(role: Role) -> &'static [Room] {
    ROLE_ROOM_INDEX
        .get(&role)
        .copied()
        .unwrap_or(&[Room::Global])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_table_is_valid() {
        assert_eq!(validate_role_rooms(), Ok(()));
    }

    #[test]
    fn kitchen_does_not_hear_waiter_traffic() {
        let rooms = rooms_for_role(Role::Kitchen);
        assert!(rooms.contains(&Room::Kitchen));
        assert!(!rooms.contains(&Room::Waiters));
        assert!(!rooms.contains(&Room::Management));
    }

    #[test]
    fn managers_join_every_staff_room() {
        let rooms = rooms_for_role(Role::Manager);
        for room in [Room::Global, Room::Kitchen, Room::Waiters, Room::Management] {
            assert!(rooms.contains(&room));
        }
    }

    #[test]
    fn validation_catches_missing_role() {
        let table: &[(Role, &[Room])] = &[(Role::Admin, &[Room::Global])];
        assert_eq!(
            validate_room_table(table),
            Err(RoomTableError::MissingRole(Role::Manager))
        );
    }

    #[test]
    fn validation_catches_missing_global() {
        let table: &[(Role, &[Room])] = &[(Role::Admin, &[Room::Kitchen])];
        assert_eq!(
            validate_room_table(table),
            Err(RoomTableError::MissingGlobal(Role::Admin))
        );
    }

    #[test]
    fn validation_rejects_table_rooms() {
        let table_room = [Room::Global, Room::Table(TableId::new())];
        let table: &[(Role, &[Room])] = &[(Role::Customer, &table_room)];
        assert_eq!(
            validate_room_table(table),
            Err(RoomTableError::StaticTableRoom(Role::Customer))
        );
    }

    #[test]
    fn room_names_round_trip() {
        let table = Room::Table(TableId::new());
        for room in [Room::Global, Room::Kitchen, Room::Waiters, Room::Management, table] {
            assert_eq!(room.to_string().parse::<Room>().unwrap(), room);
        }
        assert!("bar".parse::<Room>().is_err());
        assert!("table:nope".parse::<Room>().is_err());
    }

    #[test]
    fn rooms_serialize_as_names() {
        assert_eq!(serde_json::to_string(&Room::Kitchen).unwrap(), "\"kitchen\"");
    }
}
