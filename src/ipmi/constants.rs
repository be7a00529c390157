/*
 * SPDX-FileCopyrightText: 2025 UnionTech Software Technology Co., Ltd.
 *
 * SPDX-License-Identifier: GPL-2.0-or-later
 */
#![allow(dead_code)]

use bitflags::bitflags;

// Channel commands, App netfn (0x06)
pub const IPMI_GET_CHANNEL_AUTH_CAP: u8 = 0x38;
pub const IPMI_SET_CHANNEL_ACCESS: u8 = 0x40;
pub const IPMI_GET_CHANNEL_ACCESS: u8 = 0x41;
pub const IPMI_GET_CHANNEL_INFO: u8 = 0x42;
pub const IPMI_GET_CHANNEL_CIPHER_SUITES: u8 = 0x54;

// User commands, App netfn (0x06)
pub const IPMI_SET_USER_ACCESS: u8 = 0x43;
pub const IPMI_GET_USER_ACCESS: u8 = 0x44;
pub const IPMI_SET_USER_NAME: u8 = 0x45;
pub const IPMI_GET_USER_NAME: u8 = 0x46;
pub const IPMI_SET_USER_PASSWORD: u8 = 0x47;

// Get Channel Access storage selector (request byte 1)
pub const IPMI_CHANNEL_ACCESS_VOLATILE: u8 = 0x80;
pub const IPMI_CHANNEL_ACCESS_NON_VOLATILE: u8 = 0x40;

// 当前通道（请求到达的那个通道）
pub const IPMI_CURRENT_CHANNEL: u8 = 0x0E;

bitflags! {
    /// IPMI 1.5 authentication type support bits, Get Channel
    /// Authentication Capabilities response byte 2.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AuthTypes: u8 {
        const NONE     = 0x01;
        const MD2      = 0x02;
        const MD5      = 0x04;
        const PASSWORD = 0x10;
        const OEM      = 0x20;
    }
}

// Session privilege levels
pub const IPMI_SESSION_PRIV_CALLBACK: u8 = 0x1;
pub const IPMI_SESSION_PRIV_USER: u8 = 0x2;
pub const IPMI_SESSION_PRIV_OPERATOR: u8 = 0x3;
pub const IPMI_SESSION_PRIV_ADMIN: u8 = 0x4;
pub const IPMI_SESSION_PRIV_OEM: u8 = 0x5;
pub const IPMI_SESSION_PRIV_NOACCESS: u8 = 0xF;

// Channel medium types
pub const IPMI_CHANNEL_MEDIUM_RESERVED: u8 = 0x0;
pub const IPMI_CHANNEL_MEDIUM_IPMB_I2C: u8 = 0x1;
pub const IPMI_CHANNEL_MEDIUM_ICMB_1: u8 = 0x2;
pub const IPMI_CHANNEL_MEDIUM_ICMB_09: u8 = 0x3;
pub const IPMI_CHANNEL_MEDIUM_LAN: u8 = 0x4;
pub const IPMI_CHANNEL_MEDIUM_SERIAL: u8 = 0x5;
pub const IPMI_CHANNEL_MEDIUM_LAN_OTHER: u8 = 0x6;
pub const IPMI_CHANNEL_MEDIUM_SMBUS_PCI: u8 = 0x7;
pub const IPMI_CHANNEL_MEDIUM_SMBUS_1: u8 = 0x8;
pub const IPMI_CHANNEL_MEDIUM_SMBUS_2: u8 = 0x9;
pub const IPMI_CHANNEL_MEDIUM_USB_1: u8 = 0xa;
pub const IPMI_CHANNEL_MEDIUM_USB_2: u8 = 0xb;
pub const IPMI_CHANNEL_MEDIUM_SYSTEM: u8 = 0xc;

// Channel session support, Get Channel Info response byte 4 bits [7:6]
pub const IPMI_CHANNEL_SESSION_LESS: u8 = 0x0;
pub const IPMI_CHANNEL_SESSION_SINGLE: u8 = 0x1;
pub const IPMI_CHANNEL_SESSION_MULTI: u8 = 0x2;
pub const IPMI_CHANNEL_SESSION_BASED: u8 = 0x3;

// Channel access modes
pub const IPMI_CHANNEL_ACCESS_MODE_DISABLED: u8 = 0x0;
pub const IPMI_CHANNEL_ACCESS_MODE_PREBOOT: u8 = 0x1;
pub const IPMI_CHANNEL_ACCESS_MODE_ALWAYS: u8 = 0x2;
pub const IPMI_CHANNEL_ACCESS_MODE_SHARED: u8 = 0x3;

// RAKP authentication algorithms
pub const IPMI_AUTH_RAKP_NONE: u8 = 0x00;
pub const IPMI_AUTH_RAKP_HMAC_SHA1: u8 = 0x01;
pub const IPMI_AUTH_RAKP_HMAC_MD5: u8 = 0x02;

// Integrity algorithms
pub const IPMI_INTEGRITY_NONE: u8 = 0x00;
pub const IPMI_INTEGRITY_HMAC_SHA1_96: u8 = 0x01;
pub const IPMI_INTEGRITY_HMAC_MD5_128: u8 = 0x02;
pub const IPMI_INTEGRITY_MD5_128: u8 = 0x03;

// Confidentiality algorithms
pub const IPMI_CRYPT_NONE: u8 = 0x00;
pub const IPMI_CRYPT_AES_CBC_128: u8 = 0x01;
pub const IPMI_CRYPT_XRC4_128: u8 = 0x02;
pub const IPMI_CRYPT_XRC4_40: u8 = 0x03;
