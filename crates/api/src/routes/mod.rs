pub mod live_room;
pub mod response;
