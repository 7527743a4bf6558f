// Monthly reporting on top of the ledger core: revenue vs expenses,
// occupancy, and per-tenant statements.

use anyhow::Result;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::entities::payment::{payments_for_tenant, Payment};
use crate::entities::tenant::get_tenant;
use crate::ledger::{compute_arrears, resolve_rent, total_expected_rent, total_outstanding};

// ============================================================================
// MONTHLY SUMMARY
// ============================================================================

/// Revenue/expense picture for one billing period.
///
/// Revenue counts every payment tagged to the period regardless of kind;
/// expenses are bucketed by the calendar month of their recorded date (they
/// carry no billing-period tag).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    /// All payments (any kind) tagged to this period.
    pub revenue: f64,
    /// Expenses dated within the calendar month.
    pub expenses: f64,
    /// revenue - expenses.
    pub net: f64,
    /// Rent-kind payments tagged to this period.
    pub rent_collected: f64,
    /// Sum of rent across active tenants, independent of payment status.
    pub expected_rent: f64,
    /// Sum of max(due, 0) across active tenants.
    pub outstanding: f64,
}

pub fn monthly_summary(conn: &Connection, year: i32, month: u32) -> Result<MonthlySummary> {
    // Same normalization as compute_arrears, so every figure in the summary
    // describes the same period.
    let month = month.clamp(1, 12);

    let revenue: f64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE year = ?1 AND month = ?2",
        params![year, month],
        |row| row.get(0),
    )?;

    let rent_collected: f64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM payments
         WHERE year = ?1 AND month = ?2 AND kind = 'rent'",
        params![year, month],
        |row| row.get(0),
    )?;

    // Expenses have no billing-period tag; match on the date's year and
    // month components.
    let expenses: f64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM expenses
         WHERE strftime('%Y', date) = ?1 AND strftime('%m', date) = ?2",
        params![year.to_string(), format!("{:02}", month)],
        |row| row.get(0),
    )?;

    let rows = compute_arrears(conn, year, month)?;

    Ok(MonthlySummary {
        year,
        month,
        revenue,
        expenses,
        net: revenue - expenses,
        rent_collected,
        expected_rent: total_expected_rent(&rows),
        outstanding: total_outstanding(&rows),
    })
}

// ============================================================================
// OCCUPANCY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancySnapshot {
    pub occupied: i64,
    pub vacant: i64,
    pub total: i64,
    /// Occupied share as a percentage, 0 when there are no rooms.
    pub rate: f64,
}

pub fn occupancy(conn: &Connection) -> Result<OccupancySnapshot> {
    let (occupied, vacant, total): (i64, i64, i64) = conn.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN status = 'occupied' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN status = 'vacant' THEN 1 ELSE 0 END), 0),
            COUNT(*)
         FROM rooms",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    let rate = if total > 0 {
        occupied as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    Ok(OccupancySnapshot {
        occupied,
        vacant,
        total,
        rate,
    })
}

// ============================================================================
// TENANT STATEMENT
// ============================================================================

/// One tenant's standing: profile, payment history, and the amount still due
/// for a chosen period. This is the display figure, so due is clamped at
/// zero here - the unclamped number lives in the arrears rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantStatement {
    pub tenant_id: i64,
    pub tenant_name: String,
    pub room_name: Option<String>,
    pub monthly_rent: f64,
    pub deposit_paid: f64,
    pub payments: Vec<Payment>,
    pub year: i32,
    pub month: u32,
    /// max(rent - rent paid for the period, 0).
    pub due_for_period: f64,
}

pub fn tenant_statement(
    conn: &Connection,
    tenant_id: i64,
    year: i32,
    month: u32,
) -> Result<TenantStatement> {
    let tenant = get_tenant(conn, tenant_id)?;

    let (tenant_name, room_name, deposit_paid) = match tenant {
        Some(t) => {
            let room_name = match t.room_id {
                Some(room_id) => crate::entities::room::get_room(conn, room_id)?.map(|r| r.name),
                None => None,
            };
            (t.name, room_name, t.deposit_paid)
        }
        // Absence means zero/default: a bad id produces an empty statement
        None => ("Unknown".to_string(), None, 0.0),
    };

    let monthly_rent = resolve_rent(conn, tenant_id)?;

    let paid: f64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM payments
         WHERE tenant_id = ?1 AND year = ?2 AND month = ?3 AND kind = 'rent'",
        params![tenant_id, year, month],
        |row| row.get(0),
    )?;

    let payments = payments_for_tenant(conn, tenant_id)?;

    Ok(TenantStatement {
        tenant_id,
        tenant_name,
        room_name,
        monthly_rent,
        deposit_paid,
        payments,
        year,
        month,
        due_for_period: (monthly_rent - paid).max(0.0),
    })
}
