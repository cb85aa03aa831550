pub mod connection;
pub mod event;
pub mod id;
pub mod log;
pub mod message;
pub mod slots;
pub mod status;
pub mod view;

pub use connection::ConnectionState;
pub use event::{EventKind, EventMessage, FrameError, InfoMessage, StreamMessage};
pub use id::CameraId;
pub use log::{DEFAULT_LOG_CAPACITY, EventLog, LogEntry};
pub use message::{ClientMessage, ServerMessage};
pub use slots::{SecondarySlot, Slot, SlotAssignment, SlotError};
pub use status::{CameraStats, CameraStatus, PollOrdering, StatusBoard};
pub use view::{FeedSnapshot, SlotView, TransportMismatch, WallSnapshot};
