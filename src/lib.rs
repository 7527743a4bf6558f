// PG Accounting - Core Library
// Exposes all modules for use in the CLI, API server, and tests

pub mod db;
pub mod entities;
pub mod export;
pub mod ledger;
pub mod reports;

// Re-export commonly used types
pub use db::{
    backup_database, open_database, restore_database, setup_database, DEFAULT_DB_PATH,
};
pub use entities::{
    add_expense, add_payment, add_room, add_tenant, delete_expense, delete_payment, delete_room,
    delete_tenant, get_room, get_tenant, list_expenses, list_payments, list_rooms, list_tenants,
    payments_for_tenant, update_room_status, DuplicateRoomName, Expense, NewExpense, NewPayment,
    NewTenant, Payment, PaymentKind, Room, RoomStatus, Tenant,
};
pub use export::{arrears_csv, expenses_csv, payments_csv};
pub use ledger::{
    active_tenant_name, compute_arrears, month_bounds, resolve_rent, total_expected_rent,
    total_outstanding, ArrearsRow,
};
pub use reports::{
    monthly_summary, occupancy, tenant_statement, MonthlySummary, OccupancySnapshot,
    TenantStatement,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
