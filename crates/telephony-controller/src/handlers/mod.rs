//! HTTP request handlers for the Telephony Controller.

pub mod calls;
pub mod dispatch;
pub mod health;
pub mod trunks;

pub use calls::place_outbound_call;
pub use dispatch::{create_dispatch_rule, delete_dispatch_rule, list_dispatch_rules};
pub use health::health_check;
pub use trunks::{
    create_inbound_trunk, create_outbound_trunk, delete_trunk, list_inbound_trunks,
    list_outbound_trunks,
};
