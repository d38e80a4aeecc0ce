pub mod command;
pub mod dispatcher;
pub mod hooks;
pub mod permission;
pub mod polling;
pub mod reader;
pub mod service;

pub use command::{Command, CommandKind, RoomAction};
pub use dispatcher::Dispatcher;
pub use hooks::{HookRunner, PostCommitHook};
pub use reader::{LiveRoomSnapshot, StateReader};
pub use service::{JoinedRoom, LiveRoomService, PublishStatus, UnpublishStatus};
