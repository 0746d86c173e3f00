//! Session keys. The session carries exactly one piece of state: the id of
//! the logged-in user, written at login and cleared at logout.

pub const USER_ID: &str = "user_id";
