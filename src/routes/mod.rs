/// Router Module Index
///
/// Routes are grouped by the access they require. Each group gets its own
/// middleware layer in `create_router`, and every handler still runs the access
/// decision for its own allow-list.

/// Anonymous read-only routes plus login.
pub mod public;

/// Routes that only need a valid bearer token (any role, or none).
pub mod authenticated;

/// Content mutations and uploads, allowed for admins and editors.
pub mod editor;

/// User management, admins only.
pub mod admin;
