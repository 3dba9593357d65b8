pub mod models;

pub use models::{
    get_recent_sessions, get_sessions_by_id, init_db, insert_session, SessionRecord,
    RECENT_SESSIONS_LIMIT, SESSION_HISTORY_LIMIT,
};
