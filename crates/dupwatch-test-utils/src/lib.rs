// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for dupwatch integration tests.
//!
//! Provides mock adapters and a controllable clock for fast, deterministic,
//! CI-runnable tests without a Telegram bot or a database file.
//!
//! # Components
//!
//! - [`MockChannel`] - Mock messaging channel with message injection and capture
//! - [`MockStorage`] - In-memory sighting backup with failure injection
//! - [`ManualClock`] - Clock that only moves when told to

pub mod clock;
pub mod mock_channel;
pub mod mock_storage;

pub use clock::ManualClock;
pub use mock_channel::{MockChannel, inbound_text};
pub use mock_storage::MockStorage;
