/*
 * SPDX-FileCopyrightText: 2025 UnionTech Software Technology Co., Ltd.
 *
 * SPDX-License-Identifier: GPL-2.0-or-later
 */
//! Linux OpenIPMI character device interface.

use crate::debug2;
use crate::debug3;
use crate::error::{IpmiError, IpmiResult};
use crate::helper::buf2str;
use crate::ipmi::context::IpmiContext;
use crate::ipmi::intf::IpmiIntf;
use crate::ipmi::ipmi::{IpmiRq, IpmiRs};

use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::select::{select, FdSet};
use nix::sys::stat::Mode;
use nix::sys::time::TimeVal;
use nix::{ioctl_read, ioctl_readwrite};
use std::os::fd::BorrowedFd;
use std::sync::atomic::{AtomicI64, Ordering};

pub const IPMI_MAX_ADDR_SIZE: usize = 0x20;
pub const IPMI_BMC_CHANNEL: i16 = 0xf;
pub const IPMI_BUF_SIZE: usize = 1024;

pub const IPMI_SYSTEM_INTERFACE_ADDR_TYPE: i32 = 0x0c;
pub const IPMI_RESPONSE_RECV_TYPE: i32 = 1;

pub const IPMI_OPENIPMI_READ_TIMEOUT: i64 = 15;

static CURR_SEQ: AtomicI64 = AtomicI64::new(0);
fn next_seq() -> i64 {
    CURR_SEQ.fetch_add(1, Ordering::SeqCst)
}

// Kernel ABI structs, include/uapi/linux/ipmi.h
#[repr(C)]
pub struct IpmiDrvMsg {
    pub netfn: u8,
    pub cmd: u8,
    pub data_len: u16,
    pub data: *mut u8,
}

impl Default for IpmiDrvMsg {
    fn default() -> Self {
        Self {
            netfn: 0,
            cmd: 0,
            data_len: 0,
            data: std::ptr::null_mut(),
        }
    }
}

#[repr(C)]
pub struct IpmiDrvReq {
    pub addr: *mut u8,
    pub addr_len: u32,
    pub msgid: i64,
    pub msg: IpmiDrvMsg,
}

impl Default for IpmiDrvReq {
    fn default() -> Self {
        Self {
            addr: std::ptr::null_mut(),
            addr_len: 0,
            msgid: 0,
            msg: IpmiDrvMsg::default(),
        }
    }
}

#[repr(C)]
pub struct IpmiDrvRecv {
    pub recv_type: i32,
    pub addr: *mut u8,
    pub addr_len: u32,
    pub msgid: i64,
    pub msg: IpmiDrvMsg,
}

impl Default for IpmiDrvRecv {
    fn default() -> Self {
        Self {
            recv_type: 0,
            addr: std::ptr::null_mut(),
            addr_len: 0,
            msgid: 0,
            msg: IpmiDrvMsg::default(),
        }
    }
}

#[derive(Default)]
#[repr(C)]
pub struct IpmiSystemInterfaceAddr {
    pub addr_type: i32,
    pub channel: i16,
    pub lun: u8,
}

// IOC commands
pub const IPMI_IOC_MAGIC: u8 = b'i';
pub const IPMICTL_RECEIVE_MSG_TRUNC: u8 = 11;
pub const IPMICTL_SEND_COMMAND: u8 = 13;
pub const IPMICTL_SET_GETS_EVENTS_CMD: u8 = 16;
pub const IPMICTL_SET_MY_ADDRESS_CMD: u8 = 17;

ioctl_readwrite!(
    ipmi_ioctl_receive_msg_trunc,
    IPMI_IOC_MAGIC,
    IPMICTL_RECEIVE_MSG_TRUNC,
    IpmiDrvRecv
);

ioctl_read!(
    ipmi_ioctl_send_command,
    IPMI_IOC_MAGIC,
    IPMICTL_SEND_COMMAND,
    IpmiDrvReq
);

ioctl_read!(
    ipmi_ioctl_set_gets_events_cmd,
    IPMI_IOC_MAGIC,
    IPMICTL_SET_GETS_EVENTS_CMD,
    i32
);

ioctl_read!(
    ipmi_ioctl_set_my_address_cmd,
    IPMI_IOC_MAGIC,
    IPMICTL_SET_MY_ADDRESS_CMD,
    u32
);

pub struct OpenIntf {
    pub fd: i32,
    pub opened: bool,
    pub devnum: u8,
    pub context: IpmiContext,
}

impl OpenIntf {
    pub fn new(devnum: u8, ctx: IpmiContext) -> Self {
        Self {
            fd: -1,
            opened: false,
            devnum,
            context: ctx,
        }
    }

    fn set_my_addr(&mut self, addr: u8) -> IpmiResult<()> {
        let mut a = addr as u32;
        match unsafe { ipmi_ioctl_set_my_address_cmd(self.fd, &mut a as *mut u32) } {
            Ok(_) => {
                self.context.set_my_addr(a);
                debug2!("Set IPMB address to 0x{:x}", a);
                Ok(())
            }
            Err(e) => Err(IpmiError::System(format!(
                "Could not set IPMB address: {}",
                e
            ))),
        }
    }
}

impl IpmiIntf for OpenIntf {
    fn context(&mut self) -> &mut IpmiContext {
        &mut self.context
    }

    fn setup(&mut self) -> IpmiResult<()> {
        Ok(())
    }

    fn open(&mut self) -> IpmiResult<()> {
        self.fd = -1;

        let dev_paths = [
            format!("/dev/ipmi{}", self.devnum),
            format!("/dev/ipmi/{}", self.devnum),
            format!("/dev/ipmidev/{}", self.devnum),
        ];

        debug2!("Using ipmi device {}", self.devnum);
        for path in &dev_paths {
            match open(path.as_str(), OFlag::O_RDWR, Mode::empty()) {
                Ok(fd) => {
                    self.fd = fd;
                    break;
                }
                Err(_) => continue,
            }
        }

        if self.fd < 0 {
            return Err(IpmiError::System(format!(
                "Could not open device at /dev/ipmi{} or /dev/ipmi/{} or /dev/ipmidev/{}: \
                 No such file or directory",
                self.devnum, self.devnum, self.devnum
            )));
        }

        let mut receive_events = 1;
        if unsafe { ipmi_ioctl_set_gets_events_cmd(self.fd, &mut receive_events) }.is_err() {
            return Err(IpmiError::System(
                "Could not enable event receiver".to_string(),
            ));
        }

        self.opened = true;

        let my_addr = self.context.my_addr() as u8;
        if my_addr != 0 {
            self.set_my_addr(my_addr)?;
        }

        Ok(())
    }

    fn close(&mut self) {
        if self.fd != -1 {
            let _ = nix::unistd::close(self.fd);
            self.fd = -1;
        }
        self.opened = false;
    }

    fn sendrecv(&mut self, req: &IpmiRq) -> Option<IpmiRs> {
        if !self.opened && self.open().is_err() {
            return None;
        }

        debug3!("OpenIPMI Request Message Header:");
        debug3!("  netfn     = 0x{:x}", req.msg.netfn());
        debug3!("  cmd       = 0x{:x}", req.msg.cmd);
        if !req.msg.data.is_empty() {
            debug3!(
                "OpenIPMI Request Message Data ({} bytes)",
                req.msg.data.len()
            );
            debug3!(" {}", buf2str(&req.msg.data, req.msg.data.len()));
        }

        let mut bmc_addr = IpmiSystemInterfaceAddr {
            addr_type: IPMI_SYSTEM_INTERFACE_ADDR_TYPE,
            channel: IPMI_BMC_CHANNEL,
            lun: req.msg.lun(),
        };

        // 数据必须可变，ioctl结构体持有裸指针
        let mut req_data = req.msg.data.clone();
        let msgid = next_seq();

        let mut drv_req = IpmiDrvReq {
            addr: &mut bmc_addr as *mut _ as *mut u8,
            addr_len: std::mem::size_of::<IpmiSystemInterfaceAddr>() as u32,
            msgid,
            msg: IpmiDrvMsg {
                netfn: req.msg.netfn(),
                cmd: req.msg.cmd,
                data_len: req_data.len() as u16,
                data: req_data.as_mut_ptr(),
            },
        };

        if let Err(e) = unsafe { ipmi_ioctl_send_command(self.fd, &mut drv_req) } {
            log::error!("Unable to send command: {}", e);
            return None;
        }

        let mut recv_addr = [0u8; IPMI_MAX_ADDR_SIZE];
        let mut recv_buf = [0u8; IPMI_BUF_SIZE];
        let mut recv = IpmiDrvRecv::default();

        let borrowfd = unsafe { BorrowedFd::borrow_raw(self.fd) };
        loop {
            let mut timeout = TimeVal::new(IPMI_OPENIPMI_READ_TIMEOUT, 0);
            let mut fd_set = FdSet::new();
            fd_set.insert(&borrowfd);

            match select(self.fd + 1, &mut fd_set, None, None, &mut timeout) {
                Ok(0) => {
                    log::error!("No data available");
                    return None;
                }
                Ok(_) if !fd_set.contains(&borrowfd) => {
                    log::error!("No data available");
                    return None;
                }
                Ok(_) => {}
                Err(Errno::EINTR) => continue,
                Err(e) => {
                    log::error!("I/O Error: {}", e);
                    return None;
                }
            }

            recv.addr = recv_addr.as_mut_ptr();
            recv.addr_len = recv_addr.len() as u32;
            recv.msg.data = recv_buf.as_mut_ptr();
            recv.msg.data_len = recv_buf.len() as u16;

            if let Err(e) = unsafe { ipmi_ioctl_receive_msg_trunc(self.fd, &mut recv) } {
                if e != Errno::EMSGSIZE {
                    log::error!("Unable to receive msg: {}", e);
                    return None;
                }
            }

            if recv.msgid != msgid {
                log::error!(
                    "Received a response with unexpected ID {} vs. {}",
                    recv.msgid,
                    msgid
                );
                continue;
            }
            break;
        }

        let len = recv.msg.data_len as usize;
        if len == 0 || len > recv_buf.len() {
            log::error!("Received an empty or oversized message");
            return None;
        }

        let rsp = IpmiRs {
            ccode: recv_buf[0],
            data: recv_buf[1..len].to_vec(),
        };

        debug3!("OpenIPMI Response Message:");
        debug3!("  msgid     = {}", recv.msgid);
        debug3!("  ccode     = 0x{:02x}", rsp.ccode);
        debug3!("  data      = {}", buf2str(&rsp.data, rsp.data.len()));

        Some(rsp)
    }
}
