// Payment records.
//
// Every payment carries a (month, year) billing-period tag saying which
// month's rent it is credited against. The tag is first-class and never
// derived from the payment date: rent for December is routinely collected in
// January and tagged back to December.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

// ============================================================================
// PAYMENT KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    Rent,
    Deposit,
    Other,
}

impl PaymentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentKind::Rent => "rent",
            PaymentKind::Deposit => "deposit",
            PaymentKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> PaymentKind {
        match s {
            "rent" => PaymentKind::Rent,
            "deposit" => PaymentKind::Deposit,
            _ => PaymentKind::Other,
        }
    }
}

// ============================================================================
// PAYMENT ENTITY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub tenant_id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: PaymentKind,
    pub notes: Option<String>,
    /// Billing period month, 1-12.
    pub month: u32,
    /// Billing period year (four digits).
    pub year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub tenant_id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: PaymentKind,
    pub notes: Option<String>,
    pub month: u32,
    pub year: i32,
}

pub fn add_payment(conn: &Connection, payment: &NewPayment) -> Result<i64> {
    conn.execute(
        "INSERT INTO payments(tenant_id, date, amount, kind, notes, month, year)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            payment.tenant_id,
            payment.date.to_string(),
            payment.amount,
            payment.kind.as_str(),
            payment.notes,
            payment.month,
            payment.year,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_payments(conn: &Connection) -> Result<Vec<Payment>> {
    let mut stmt = conn.prepare(
        "SELECT id, tenant_id, date, amount, kind, notes, month, year
         FROM payments ORDER BY date DESC, id DESC",
    )?;

    let payments = stmt
        .query_map([], row_to_payment)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(payments)
}

/// Full payment history for one tenant, newest first.
pub fn payments_for_tenant(conn: &Connection, tenant_id: i64) -> Result<Vec<Payment>> {
    let mut stmt = conn.prepare(
        "SELECT id, tenant_id, date, amount, kind, notes, month, year
         FROM payments WHERE tenant_id = ?1 ORDER BY date DESC, id DESC",
    )?;

    let payments = stmt
        .query_map(params![tenant_id], row_to_payment)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(payments)
}

pub fn delete_payment(conn: &Connection, payment_id: i64) -> Result<()> {
    conn.execute("DELETE FROM payments WHERE id = ?1", params![payment_id])?;
    Ok(())
}

fn row_to_payment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Payment> {
    let date: String = row.get(2)?;
    let kind: String = row.get(4)?;

    Ok(Payment {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        date: date.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
        amount: row.get(3)?,
        kind: PaymentKind::parse(&kind),
        notes: row.get(5)?,
        month: row.get(6)?,
        year: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_database;
    use crate::entities::tenant::{add_tenant, NewTenant};

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_billing_period_is_independent_of_date() {
        let conn = test_conn();
        let tenant_id = add_tenant(
            &conn,
            &NewTenant {
                name: "Asha".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

        // Paid in January, credited against December of the previous year
        add_payment(
            &conn,
            &NewPayment {
                tenant_id,
                date: ymd(2025, 1, 5),
                amount: 6000.0,
                kind: PaymentKind::Rent,
                notes: Some("late rent".to_string()),
                month: 12,
                year: 2024,
            },
        )
        .unwrap();

        let payments = payments_for_tenant(&conn, tenant_id).unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].date, ymd(2025, 1, 5));
        assert_eq!(payments[0].month, 12);
        assert_eq!(payments[0].year, 2024);
        assert_eq!(payments[0].kind, PaymentKind::Rent);
    }

    #[test]
    fn test_list_payments_newest_first() {
        let conn = test_conn();
        let tenant_id = add_tenant(
            &conn,
            &NewTenant {
                name: "Ravi".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

        for (day, amount) in [(1, 100.0), (15, 200.0), (28, 300.0)] {
            add_payment(
                &conn,
                &NewPayment {
                    tenant_id,
                    date: ymd(2024, 3, day),
                    amount,
                    kind: PaymentKind::Other,
                    notes: None,
                    month: 3,
                    year: 2024,
                },
            )
            .unwrap();
        }

        let payments = list_payments(&conn).unwrap();
        assert_eq!(payments.len(), 3);
        assert_eq!(payments[0].amount, 300.0);
        assert_eq!(payments[2].amount, 100.0);
    }

    #[test]
    fn test_delete_payment() {
        let conn = test_conn();
        let tenant_id = add_tenant(
            &conn,
            &NewTenant {
                name: "Ravi".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

        let payment_id = add_payment(
            &conn,
            &NewPayment {
                tenant_id,
                date: ymd(2024, 3, 1),
                amount: 100.0,
                kind: PaymentKind::Rent,
                notes: None,
                month: 3,
                year: 2024,
            },
        )
        .unwrap();

        delete_payment(&conn, payment_id).unwrap();
        assert!(list_payments(&conn).unwrap().is_empty());
    }
}
