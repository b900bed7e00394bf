//! Home21 Server
//!
//! Role-based authorization for the Home21 residential-facility platform:
//! who may perform which action on which resource, which pages each role may
//! open, and which accounts a user may manage.

pub mod config;
pub mod guard;
pub mod observability;
pub mod permissions;
