// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Terminal reporting for the `solidbool` binary

pub mod reporter;

pub use reporter::Reporter;
