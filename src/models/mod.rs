mod notification;

pub use notification::{
    NotificationMessage, NotificationPayload, NotificationRequest, RelayRequest, RelayResult,
    is_truthy, json_kind,
};
