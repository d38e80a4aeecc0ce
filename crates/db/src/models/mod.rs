pub mod live_room;
pub mod live_room_log;
pub mod live_room_poll;
pub mod live_room_state;
pub mod media;
pub mod member_state;
pub mod student;

pub use live_room::*;
pub use live_room_log::*;
pub use live_room_poll::*;
pub use live_room_state::*;
pub use media::*;
pub use member_state::*;
pub use student::*;
