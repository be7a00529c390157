/*
 * SPDX-FileCopyrightText: 2025 UnionTech Software Technology Co., Ltd.
 *
 * SPDX-License-Identifier: GPL-2.0-or-later
 */
//! Scripted interface used by the unit tests: every `sendrecv` pops the
//! next canned response and records the outgoing request.

use crate::error::IpmiResult;
use crate::ipmi::context::IpmiContext;
use crate::ipmi::intf::IpmiIntf;
use crate::ipmi::ipmi::{IpmiRq, IpmiRs};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct SentRequest {
    pub netfn: u8,
    pub cmd: u8,
    pub data: Vec<u8>,
}

#[derive(Default)]
pub struct MockIntf {
    pub context: IpmiContext,
    pub requests: Vec<SentRequest>,
    pub responses: VecDeque<Option<IpmiRs>>,
}

impl MockIntf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response carrying `data`.
    pub fn push_ok(&mut self, data: &[u8]) {
        self.responses.push_back(Some(IpmiRs {
            ccode: 0,
            data: data.to_vec(),
        }));
    }

    /// Queue a response with a nonzero completion code.
    pub fn push_ccode(&mut self, ccode: u8) {
        self.responses.push_back(Some(IpmiRs {
            ccode,
            data: Vec::new(),
        }));
    }

    /// Queue a transport failure (no response at all).
    pub fn push_none(&mut self) {
        self.responses.push_back(None);
    }
}

impl IpmiIntf for MockIntf {
    fn context(&mut self) -> &mut IpmiContext {
        &mut self.context
    }

    fn setup(&mut self) -> IpmiResult<()> {
        Ok(())
    }

    fn open(&mut self) -> IpmiResult<()> {
        Ok(())
    }

    fn close(&mut self) {}

    fn sendrecv(&mut self, req: &IpmiRq) -> Option<IpmiRs> {
        self.requests.push(SentRequest {
            netfn: req.msg.netfn(),
            cmd: req.msg.cmd,
            data: req.msg.data.clone(),
        });
        self.responses
            .pop_front()
            .expect("mock interface ran out of scripted responses")
    }
}
