/*
 * SPDX-FileCopyrightText: 2025 UnionTech Software Technology Co., Ltd.
 *
 * SPDX-License-Identifier: GPL-2.0-or-later
 */
use crate::error::IpmiResult;
use crate::ipmi::context::IpmiContext;
use crate::ipmi::ipmi::{IpmiRq, IpmiRs};

/// The exchange primitive every transport implements.
///
/// `sendrecv` returning `None` means no response arrived (a transport
/// failure); a response with nonzero `ccode` is a controller rejection.
/// Callers must be able to tell the two apart.
pub trait IpmiIntf {
    fn context(&mut self) -> &mut IpmiContext;

    fn setup(&mut self) -> IpmiResult<()>;
    fn open(&mut self) -> IpmiResult<()>;
    fn close(&mut self);

    fn sendrecv(&mut self, req: &IpmiRq) -> Option<IpmiRs>;
}
