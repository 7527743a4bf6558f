// CSV export of report rows. Serializes to bytes; delivery (download,
// attachment, file on disk) is the caller's problem.

use anyhow::{Context, Result};

use crate::entities::expense::Expense;
use crate::entities::payment::Payment;
use crate::ledger::ArrearsRow;

/// Arrears table for a period, one row per active tenant.
pub fn arrears_csv(rows: &[ArrearsRow]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["tenant", "room", "rent", "paid", "due"])?;

    for row in rows {
        wtr.write_record([
            row.tenant_name.clone(),
            row.room_name.clone().unwrap_or_default(),
            format!("{:.2}", row.rent),
            format!("{:.2}", row.paid),
            format!("{:.2}", row.due),
        ])?;
    }

    wtr.into_inner().context("Failed to flush arrears CSV")
}

/// Payment history, e.g. a tenant's statement attachment.
pub fn payments_csv(payments: &[Payment]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["date", "amount", "kind", "notes", "month", "year"])?;

    for payment in payments {
        wtr.write_record([
            payment.date.to_string(),
            format!("{:.2}", payment.amount),
            payment.kind.as_str().to_string(),
            payment.notes.clone().unwrap_or_default(),
            payment.month.to_string(),
            payment.year.to_string(),
        ])?;
    }

    wtr.into_inner().context("Failed to flush payments CSV")
}

/// Full expense list.
pub fn expenses_csv(expenses: &[Expense]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["date", "amount", "category", "vendor", "notes"])?;

    for expense in expenses {
        wtr.write_record([
            expense.date.to_string(),
            format!("{:.2}", expense.amount),
            expense.category.clone().unwrap_or_default(),
            expense.vendor.clone().unwrap_or_default(),
            expense.notes.clone().unwrap_or_default(),
        ])?;
    }

    wtr.into_inner().context("Failed to flush expenses CSV")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::payment::PaymentKind;
    use chrono::NaiveDate;

    #[test]
    fn test_arrears_csv_shape() {
        let rows = vec![
            ArrearsRow {
                tenant_id: 1,
                tenant_name: "Asha".to_string(),
                room_name: Some("101".to_string()),
                rent: 10000.0,
                paid: 6000.0,
                due: 4000.0,
            },
            ArrearsRow {
                tenant_id: 2,
                tenant_name: "Ravi".to_string(),
                room_name: None,
                rent: 0.0,
                paid: 500.0,
                due: -500.0,
            },
        ];

        let bytes = arrears_csv(&rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "tenant,room,rent,paid,due");
        assert_eq!(lines[1], "Asha,101,10000.00,6000.00,4000.00");
        // Unassigned room exports as an empty column, due stays negative
        assert_eq!(lines[2], "Ravi,,0.00,500.00,-500.00");
    }

    #[test]
    fn test_payments_csv_shape() {
        let payments = vec![Payment {
            id: 1,
            tenant_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            amount: 6000.0,
            kind: PaymentKind::Rent,
            notes: Some("late rent".to_string()),
            month: 12,
            year: 2024,
        }];

        let text = String::from_utf8(payments_csv(&payments).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,amount,kind,notes,month,year");
        assert_eq!(lines[1], "2025-01-05,6000.00,rent,late rent,12,2024");
    }

    #[test]
    fn test_expenses_csv_empty_list_is_header_only() {
        let text = String::from_utf8(expenses_csv(&[]).unwrap()).unwrap();
        assert_eq!(text.trim_end(), "date,amount,category,vendor,notes");
    }
}
