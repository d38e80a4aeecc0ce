pub mod base;
pub mod live_room;
pub mod live_room_log;
pub mod live_room_poll;
pub mod live_room_state;
pub mod media;
pub mod member_state;
pub mod student;

pub use base::{BaseDao, DaoError, DaoResult};
