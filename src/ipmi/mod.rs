/*
 * SPDX-FileCopyrightText: 2025 UnionTech Software Technology Co., Ltd.
 *
 * SPDX-License-Identifier: GPL-2.0-or-later
 */
pub mod constants;
pub mod context;
pub mod intf;
#[allow(clippy::module_inception)]
pub mod ipmi;
pub mod records;
pub mod strings;

#[cfg(test)]
pub mod mock;
