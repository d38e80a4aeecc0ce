pub mod activity;
pub mod auth;
pub mod dao;
pub mod error;
pub mod events;
pub mod liveroom;
pub mod media;
pub mod roles;
pub mod store;
pub mod whiteboard;

pub use auth::AuthService;
pub use dao::*;
pub use error::{RoomError, RoomResult};
pub use liveroom::{Dispatcher, LiveRoomService, StateReader};
