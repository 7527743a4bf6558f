// Persisted record types and their CRUD, one file per entity.

pub mod expense;
pub mod payment;
pub mod room;
pub mod tenant;

pub use expense::{add_expense, delete_expense, list_expenses, Expense, NewExpense};
pub use payment::{
    add_payment, delete_payment, list_payments, payments_for_tenant, NewPayment, Payment,
    PaymentKind,
};
pub use room::{
    add_room, delete_room, get_room, list_rooms, update_room_status, DuplicateRoomName, Room,
    RoomStatus,
};
pub use tenant::{add_tenant, delete_tenant, get_tenant, list_tenants, NewTenant, Tenant};
