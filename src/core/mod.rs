/// Category lookups backing the category validation rule
pub mod category;

/// Recurring definition lifecycle - CRUD, status transitions, projections
pub mod recurring;

/// Pure schedule arithmetic - frequency stepping and next-occurrence projection
pub mod schedule;
