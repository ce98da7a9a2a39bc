//! Order state management.
//!
//! Status is a free-form field: any status may be set from any other.
//! What the machine does guarantee is the optimistic-update contract:
//! apply the change to the caller's copy, attempt the persist, and on
//! failure restore exactly the fields the operation touched.

mod order;
#[cfg(test)]
pub(crate) mod test_support;
mod view;

pub use order::{OrderStateError, OrderStateMachine, PaymentResolution};
pub use view::StatusView;
