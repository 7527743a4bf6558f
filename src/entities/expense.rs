// Expense records: utilities, repairs, supplies. Not tied to any tenant or
// room, and unlike payments they carry no billing-period tag - monthly
// reports bucket them by the date they were recorded.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub amount: f64,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub notes: Option<String>,
}

pub fn add_expense(conn: &Connection, expense: &NewExpense) -> Result<i64> {
    conn.execute(
        "INSERT INTO expenses(date, amount, category, vendor, notes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            expense.date.to_string(),
            expense.amount,
            expense.category,
            expense.vendor,
            expense.notes,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_expenses(conn: &Connection) -> Result<Vec<Expense>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, amount, category, vendor, notes
         FROM expenses ORDER BY date DESC, id DESC",
    )?;

    let expenses = stmt
        .query_map([], row_to_expense)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(expenses)
}

pub fn delete_expense(conn: &Connection, expense_id: i64) -> Result<()> {
    conn.execute("DELETE FROM expenses WHERE id = ?1", params![expense_id])?;
    Ok(())
}

fn row_to_expense(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
    let date: String = row.get(1)?;

    Ok(Expense {
        id: row.get(0)?,
        date: date.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        vendor: row.get(4)?,
        notes: row.get(5)?,
    })
}
