// Ledger core: rent resolution, active-tenant selection, and monthly
// arrears. Pure read-then-compute over the store - every call re-reads the
// authoritative tables, nothing is cached between calls.
//
// Absence means zero throughout: a missing tenant, a missing room, or an
// empty payment history all resolve to 0 / "Unknown" rather than an error.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// BILLING PERIOD BOUNDS
// ============================================================================

/// Calendar bounds of a billing period: first day of the month and the
/// (exclusive) first day of the following month. Out-of-range months are
/// clamped into [1, 12] so the function is total.
pub fn month_bounds(year: i32, month: u32) -> (NaiveDate, NaiveDate) {
    let month = month.clamp(1, 12);
    let start = NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is valid");
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).expect("first of January is valid")
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).expect("first of month is valid")
    };
    (start, end)
}

// ============================================================================
// RENT RESOLUTION
// ============================================================================

/// Monthly rent owed by a tenant: the rent of the currently assigned room.
///
/// Read live from the room record - there is no rent history, so changing a
/// room's rent retroactively changes every unpaid month for its occupant.
/// Returns 0.0 when the tenant does not exist or has no assigned room.
pub fn resolve_rent(conn: &Connection, tenant_id: i64) -> Result<f64> {
    let rent = conn
        .query_row(
            "SELECT r.rent FROM tenants t
             JOIN rooms r ON r.id = t.room_id
             WHERE t.id = ?1",
            params![tenant_id],
            |row| row.get::<_, f64>(0),
        )
        .optional()?;

    Ok(rent.unwrap_or(0.0))
}

/// Display name for a tenant, "Unknown" when the id resolves to nothing.
pub fn active_tenant_name(conn: &Connection, tenant_id: i64) -> Result<String> {
    let name = conn
        .query_row(
            "SELECT name FROM tenants WHERE id = ?1",
            params![tenant_id],
            |row| row.get::<_, String>(0),
        )
        .optional()?;

    Ok(name.unwrap_or_else(|| "Unknown".to_string()))
}

// ============================================================================
// ARREARS
// ============================================================================

/// One active tenant's position for a billing period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrearsRow {
    pub tenant_id: i64,
    pub tenant_name: String,
    /// None when the tenant has no assigned room (or the room was deleted).
    pub room_name: Option<String>,
    pub rent: f64,
    pub paid: f64,
    /// rent - paid, unclamped: a negative due is an overpayment credit.
    pub due: f64,
}

/// Arrears for every tenant active in the given billing period, ordered by
/// tenant name.
///
/// Activity uses the asymmetric half-open rule: joined strictly before the
/// period end, left on or after the period start. Paid sums only rent-kind
/// payments whose (year, month) tag matches the period exactly - the payment
/// date is irrelevant here.
pub fn compute_arrears(conn: &Connection, year: i32, month: u32) -> Result<Vec<ArrearsRow>> {
    // Normalize once so the activity bounds and the paid sum agree on the
    // same month (month_bounds clamps internally too).
    let month = month.clamp(1, 12);
    let (start, end) = month_bounds(year, month);

    let mut stmt = conn.prepare(
        "SELECT t.id, t.name, r.name, r.rent
         FROM tenants t
         LEFT JOIN rooms r ON r.id = t.room_id
         WHERE (t.join_date IS NULL OR date(t.join_date) < date(?1))
           AND (t.leave_date IS NULL OR date(t.leave_date) >= date(?2))
         ORDER BY t.name",
    )?;

    let active = stmt
        .query_map(params![end.to_string(), start.to_string()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<f64>>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT tenant_id, COALESCE(SUM(amount), 0)
         FROM payments
         WHERE year = ?1 AND month = ?2 AND kind = 'rent'
         GROUP BY tenant_id",
    )?;

    let paid_by_tenant: HashMap<i64, f64> = stmt
        .query_map(params![year, month], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<Result<HashMap<_, _>, _>>()?;

    let rows = active
        .into_iter()
        .map(|(tenant_id, tenant_name, room_name, rent)| {
            let rent = rent.unwrap_or(0.0);
            let paid = paid_by_tenant.get(&tenant_id).copied().unwrap_or(0.0);
            ArrearsRow {
                tenant_id,
                tenant_name,
                room_name,
                rent,
                paid,
                due: rent - paid,
            }
        })
        .collect();

    Ok(rows)
}

// ============================================================================
// AGGREGATES
// ============================================================================

/// Rent the period should bring in if every active tenant paid in full.
pub fn total_expected_rent(rows: &[ArrearsRow]) -> f64 {
    rows.iter().map(|row| row.rent).sum()
}

/// Outstanding rent across all tenants. Each row is floored at zero first:
/// one tenant's overpayment never offsets another's shortfall.
pub fn total_outstanding(rows: &[ArrearsRow]) -> f64 {
    rows.iter().map(|row| row.due.max(0.0)).sum()
}
