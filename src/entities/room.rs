// Room records - the rentable unit of the PG.
//
// Room name is the operator-facing key and must be unique; the duplicate-name
// collision is the one storage fault this crate surfaces as a distinct error
// instead of a generic failure.

use anyhow::Result;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

// ============================================================================
// ROOM STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Vacant,
    Occupied,
    Maintenance,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Vacant => "vacant",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Maintenance => "maintenance",
        }
    }

    /// Unrecognized values degrade to the schema default.
    pub fn parse(s: &str) -> RoomStatus {
        match s {
            "occupied" => RoomStatus::Occupied,
            "maintenance" => RoomStatus::Maintenance,
            _ => RoomStatus::Vacant,
        }
    }
}

// ============================================================================
// DUPLICATE NAME ERROR
// ============================================================================

/// Room names are UNIQUE; a collision at creation time is surfaced as this
/// dedicated error so callers can tell it apart from storage faults.
#[derive(Debug, Clone)]
pub struct DuplicateRoomName {
    pub name: String,
}

impl std::fmt::Display for DuplicateRoomName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Room name must be unique: {:?} already exists", self.name)
    }
}

impl std::error::Error for DuplicateRoomName {}

// ============================================================================
// ROOM ENTITY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub rent: f64,
    pub deposit: f64,
    pub status: RoomStatus,
}

/// Insert a room. Returns the new row id, or `DuplicateRoomName` (through
/// anyhow, downcastable) when the name is already taken.
pub fn add_room(
    conn: &Connection,
    name: &str,
    rent: f64,
    deposit: f64,
    status: RoomStatus,
) -> Result<i64> {
    let result = conn.execute(
        "INSERT INTO rooms(name, rent, deposit, status) VALUES (?1, ?2, ?3, ?4)",
        params![name, rent, deposit, status.as_str()],
    );

    match result {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(DuplicateRoomName {
                name: name.to_string(),
            }
            .into())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn get_room(conn: &Connection, room_id: i64) -> Result<Option<Room>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, rent, deposit, status FROM rooms WHERE id = ?1",
    )?;

    let mut rows = stmt.query_map(params![room_id], row_to_room)?;
    match rows.next() {
        Some(room) => Ok(Some(room?)),
        None => Ok(None),
    }
}

pub fn list_rooms(conn: &Connection) -> Result<Vec<Room>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, rent, deposit, status FROM rooms ORDER BY name",
    )?;

    let rooms = stmt
        .query_map([], row_to_room)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rooms)
}

pub fn update_room_status(conn: &Connection, room_id: i64, status: RoomStatus) -> Result<()> {
    conn.execute(
        "UPDATE rooms SET status = ?1 WHERE id = ?2",
        params![status.as_str(), room_id],
    )?;
    Ok(())
}

/// Unguarded delete: tenants referencing this room keep their dangling
/// room_id and read paths resolve it to rent 0 / no room name.
pub fn delete_room(conn: &Connection, room_id: i64) -> Result<()> {
    conn.execute("DELETE FROM rooms WHERE id = ?1", params![room_id])?;
    Ok(())
}

fn row_to_room(row: &rusqlite::Row<'_>) -> rusqlite::Result<Room> {
    let status: String = row.get(4)?;
    Ok(Room {
        id: row.get(0)?,
        name: row.get(1)?,
        rent: row.get(2)?,
        deposit: row.get(3)?,
        status: RoomStatus::parse(&status),
    })
}
