// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (authentication, device identity, security).

pub mod auth;
pub mod device;
pub mod security;

pub use auth::{identify_user, CurrentUser};
pub use device::{ensure_device, DeviceId};
