// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod describe;
pub mod inspect;
pub mod ls;
pub mod resolve;
pub mod tables;
