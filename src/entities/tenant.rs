// Tenant records.
//
// A tenant's active period is [join_date, leave_date), both ends optional:
// no join date means "joined before records began", no leave date means the
// tenant is still with us.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::ledger::month_bounds;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub room_id: Option<i64>,
    pub join_date: Option<NaiveDate>,
    pub leave_date: Option<NaiveDate>,
    pub deposit_paid: f64,
}

/// Fields for tenant creation; the id is assigned by storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewTenant {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub room_id: Option<i64>,
    pub join_date: Option<NaiveDate>,
    pub leave_date: Option<NaiveDate>,
    pub deposit_paid: f64,
}

impl Tenant {
    /// Whether this tenant is active in the given billing period.
    ///
    /// Two independent half-open comparisons, deliberately asymmetric:
    /// join_date is checked strictly against the exclusive period end, while
    /// leave_date is checked inclusively against the period start. A tenant
    /// joining on the last day of the month owes that month; a tenant leaving
    /// on the first day of the month still owes that month.
    pub fn active_in(&self, year: i32, month: u32) -> bool {
        let (start, end) = month_bounds(year, month);
        let joined_before_end = self.join_date.map_or(true, |d| d < end);
        let left_after_start = self.leave_date.map_or(true, |d| d >= start);
        joined_before_end && left_after_start
    }
}

/// Insert a tenant. Assigning a room on the way in marks that room occupied,
/// mirroring how move-ins are recorded at the front desk.
pub fn add_tenant(conn: &Connection, tenant: &NewTenant) -> Result<i64> {
    conn.execute(
        "INSERT INTO tenants(name, phone, email, room_id, join_date, leave_date, deposit_paid)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            tenant.name,
            tenant.phone,
            tenant.email,
            tenant.room_id,
            tenant.join_date.map(|d| d.to_string()),
            tenant.leave_date.map(|d| d.to_string()),
            tenant.deposit_paid,
        ],
    )?;
    let tenant_id = conn.last_insert_rowid();

    if let Some(room_id) = tenant.room_id {
        conn.execute(
            "UPDATE rooms SET status = 'occupied' WHERE id = ?1",
            params![room_id],
        )?;
    }

    Ok(tenant_id)
}

pub fn get_tenant(conn: &Connection, tenant_id: i64) -> Result<Option<Tenant>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone, email, room_id, join_date, leave_date, deposit_paid
         FROM tenants WHERE id = ?1",
    )?;

    let mut rows = stmt.query_map(params![tenant_id], row_to_tenant)?;
    match rows.next() {
        Some(tenant) => Ok(Some(tenant?)),
        None => Ok(None),
    }
}

pub fn list_tenants(conn: &Connection) -> Result<Vec<Tenant>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone, email, room_id, join_date, leave_date, deposit_paid
         FROM tenants ORDER BY name",
    )?;

    let tenants = stmt
        .query_map([], row_to_tenant)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(tenants)
}

/// Unguarded delete: payments referencing this tenant are left in place.
pub fn delete_tenant(conn: &Connection, tenant_id: i64) -> Result<()> {
    conn.execute("DELETE FROM tenants WHERE id = ?1", params![tenant_id])?;
    Ok(())
}

fn row_to_tenant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tenant> {
    let join_date: Option<String> = row.get(5)?;
    let leave_date: Option<String> = row.get(6)?;

    Ok(Tenant {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        room_id: row.get(4)?,
        join_date: join_date.and_then(|s| s.parse().ok()),
        leave_date: leave_date.and_then(|s| s.parse().ok()),
        deposit_paid: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_database;
    use crate::entities::room::{add_room, get_room, RoomStatus};

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_tenant_marks_room_occupied() {
        let conn = test_conn();
        let room_id = add_room(&conn, "101", 6000.0, 0.0, RoomStatus::Vacant).unwrap();

        let tenant_id = add_tenant(
            &conn,
            &NewTenant {
                name: "Asha".to_string(),
                room_id: Some(room_id),
                join_date: Some(ymd(2024, 1, 1)),
                deposit_paid: 5000.0,
                ..Default::default()
            },
        )
        .unwrap();

        let tenant = get_tenant(&conn, tenant_id).unwrap().unwrap();
        assert_eq!(tenant.name, "Asha");
        assert_eq!(tenant.room_id, Some(room_id));
        assert_eq!(tenant.join_date, Some(ymd(2024, 1, 1)));
        assert!(tenant.leave_date.is_none());

        let room = get_room(&conn, room_id).unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Occupied);
    }

    #[test]
    fn test_add_tenant_without_room_leaves_rooms_alone() {
        let conn = test_conn();
        let room_id = add_room(&conn, "101", 6000.0, 0.0, RoomStatus::Vacant).unwrap();

        add_tenant(
            &conn,
            &NewTenant {
                name: "Ravi".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

        let room = get_room(&conn, room_id).unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Vacant);
    }

    #[test]
    fn test_active_in_join_boundaries() {
        let mut tenant = Tenant {
            id: 1,
            name: "T".to_string(),
            phone: None,
            email: None,
            room_id: None,
            join_date: Some(ymd(2024, 3, 1)),
            leave_date: None,
            deposit_paid: 0.0,
        };

        // Joined on the first day of March: active in March
        assert!(tenant.active_in(2024, 3));
        // ...but not in February (join_date is not before 2024-03-01)
        assert!(!tenant.active_in(2024, 2));

        // Joined on the last day of March: still active in March
        tenant.join_date = Some(ymd(2024, 3, 31));
        assert!(tenant.active_in(2024, 3));
    }

    #[test]
    fn test_active_in_leave_boundaries() {
        let mut tenant = Tenant {
            id: 1,
            name: "T".to_string(),
            phone: None,
            email: None,
            room_id: None,
            join_date: Some(ymd(2023, 1, 1)),
            leave_date: Some(ymd(2024, 2, 1)),
            deposit_paid: 0.0,
        };

        // Left on the first day of February: still counted for February
        assert!(tenant.active_in(2024, 2));
        assert!(!tenant.active_in(2024, 3));

        // Left on the last day of January: gone by February
        tenant.leave_date = Some(ymd(2024, 1, 31));
        assert!(!tenant.active_in(2024, 2));
        assert!(tenant.active_in(2024, 1));
    }

    #[test]
    fn test_active_in_open_ended_dates() {
        let tenant = Tenant {
            id: 1,
            name: "T".to_string(),
            phone: None,
            email: None,
            room_id: None,
            join_date: None,
            leave_date: None,
            deposit_paid: 0.0,
        };

        // No dates at all: active in any month
        assert!(tenant.active_in(2020, 1));
        assert!(tenant.active_in(2024, 12));
    }

    #[test]
    fn test_december_period_rolls_into_next_year() {
        let tenant = Tenant {
            id: 1,
            name: "T".to_string(),
            phone: None,
            email: None,
            room_id: None,
            join_date: Some(ymd(2024, 12, 31)),
            leave_date: None,
            deposit_paid: 0.0,
        };

        assert!(tenant.active_in(2024, 12));
        assert!(!tenant.active_in(2024, 11));
    }
}
