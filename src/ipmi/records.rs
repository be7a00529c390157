/*
 * SPDX-FileCopyrightText: 2025 UnionTech Software Technology Co., Ltd.
 *
 * SPDX-License-Identifier: GPL-2.0-or-later
 */
//! Fixed-layout record codecs for the channel and user commands.
//!
//! The wire layouts come straight from the IPMI v2.0 command tables
//! (22-15 Get Channel Authentication Capabilities, 22-23 Get Channel
//! Info, 22-22 Get Channel Access, 22-27/22-26 Get/Set User Access,
//! 22-29 Get User Name). Every multi-bit field is extracted with an
//! explicit shift/mask so the codec has no dependence on struct layout.
//!
//! This layer validates lengths only. Enum-like fields decode to plain
//! integers; interpreting or rejecting out-of-range values is the
//! caller's business.

use crate::error::IpmiError;
use crate::helper::{htoipmi24, ipmi24toh};
use crate::ipmi::constants::AuthTypes;
use std::fmt;

pub const CHANNEL_AUTH_CAP_DATA_LEN: usize = 8;
pub const CHANNEL_INFO_DATA_LEN: usize = 9;
pub const CHANNEL_ACCESS_DATA_LEN: usize = 2;
pub const USER_ACCESS_DATA_LEN: usize = 4;
pub const USER_NAME_DATA_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    WrongLength {
        record: &'static str,
        expected: &'static str,
        got: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::WrongLength {
                record,
                expected,
                got,
            } => write!(
                f,
                "{}: expected {} data bytes, got {}",
                record, expected, got
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<DecodeError> for IpmiError {
    fn from(e: DecodeError) -> Self {
        IpmiError::InvalidData(e.to_string())
    }
}

// Get Channel Authentication Capabilities, response byte 2
const AUTH_TYPE_MASK: u8 = 0x3F;
const AUTH_V20_DATA_AVAILABLE: u8 = 0x80;
// response byte 3
const AUTH_ANON_LOGIN_ENABLED: u8 = 0x01;
const AUTH_NULL_USERNAMES: u8 = 0x02;
const AUTH_NON_NULL_USERNAMES: u8 = 0x04;
const AUTH_USER_LEVEL_DISABLED: u8 = 0x08;
const AUTH_PER_MESSAGE_DISABLED: u8 = 0x10;
const AUTH_KG_NONZERO: u8 = 0x20;
// response byte 4
const AUTH_IPMI_V15_SUPPORT: u8 = 0x01;
const AUTH_IPMI_V20_SUPPORT: u8 = 0x02;

/// OEM fields of the auth-capability record. Only meaningful when the
/// OEM bit is set in `enabled_auth_types`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OemAuthData {
    pub iana: u32,
    pub aux_data: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelAuthCap {
    pub channel_number: u8,
    pub enabled_auth_types: AuthTypes,
    pub v20_data_available: bool,
    pub kg_status: bool,
    pub per_message_auth_disabled: bool,
    pub user_level_auth_disabled: bool,
    pub non_null_usernames: bool,
    pub null_usernames: bool,
    pub anon_login_enabled: bool,
    pub ipmiv15_support: bool,
    pub ipmiv20_support: bool,
    pub oem: Option<OemAuthData>,
}

impl ChannelAuthCap {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() != CHANNEL_AUTH_CAP_DATA_LEN {
            return Err(DecodeError::WrongLength {
                record: "Get Channel Auth Capabilities response",
                expected: "8",
                got: data.len(),
            });
        }
        let enabled_auth_types = AuthTypes::from_bits_retain(data[1] & AUTH_TYPE_MASK);
        let oem = if enabled_auth_types.contains(AuthTypes::OEM) {
            Some(OemAuthData {
                iana: ipmi24toh(&[data[4], data[5], data[6]]),
                aux_data: data[7],
            })
        } else {
            None
        };
        Ok(ChannelAuthCap {
            channel_number: data[0],
            enabled_auth_types,
            v20_data_available: data[1] & AUTH_V20_DATA_AVAILABLE != 0,
            kg_status: data[2] & AUTH_KG_NONZERO != 0,
            per_message_auth_disabled: data[2] & AUTH_PER_MESSAGE_DISABLED != 0,
            user_level_auth_disabled: data[2] & AUTH_USER_LEVEL_DISABLED != 0,
            non_null_usernames: data[2] & AUTH_NON_NULL_USERNAMES != 0,
            null_usernames: data[2] & AUTH_NULL_USERNAMES != 0,
            anon_login_enabled: data[2] & AUTH_ANON_LOGIN_ENABLED != 0,
            ipmiv15_support: data[3] & AUTH_IPMI_V15_SUPPORT != 0,
            ipmiv20_support: data[3] & AUTH_IPMI_V20_SUPPORT != 0,
            oem,
        })
    }

    pub fn encode(&self) -> [u8; CHANNEL_AUTH_CAP_DATA_LEN] {
        let mut data = [0u8; CHANNEL_AUTH_CAP_DATA_LEN];
        data[0] = self.channel_number;
        data[1] = self.enabled_auth_types.bits() & AUTH_TYPE_MASK;
        if self.v20_data_available {
            data[1] |= AUTH_V20_DATA_AVAILABLE;
        }
        if self.kg_status {
            data[2] |= AUTH_KG_NONZERO;
        }
        if self.per_message_auth_disabled {
            data[2] |= AUTH_PER_MESSAGE_DISABLED;
        }
        if self.user_level_auth_disabled {
            data[2] |= AUTH_USER_LEVEL_DISABLED;
        }
        if self.non_null_usernames {
            data[2] |= AUTH_NON_NULL_USERNAMES;
        }
        if self.null_usernames {
            data[2] |= AUTH_NULL_USERNAMES;
        }
        if self.anon_login_enabled {
            data[2] |= AUTH_ANON_LOGIN_ENABLED;
        }
        if self.ipmiv15_support {
            data[3] |= AUTH_IPMI_V15_SUPPORT;
        }
        if self.ipmiv20_support {
            data[3] |= AUTH_IPMI_V20_SUPPORT;
        }
        if let Some(oem) = &self.oem {
            let iana = htoipmi24(oem.iana);
            data[4] = iana[0];
            data[5] = iana[1];
            data[6] = iana[2];
            data[7] = oem.aux_data;
        }
        data
    }
}

// Get Channel Info field masks
const INFO_CHANNEL_MASK: u8 = 0x0F;
const INFO_MEDIUM_MASK: u8 = 0x7F;
const INFO_PROTOCOL_MASK: u8 = 0x1F;
const INFO_SESSION_SUPPORT_SHIFT: u8 = 6;
const INFO_ACTIVE_SESSION_MASK: u8 = 0x3F;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelInfo {
    pub channel_number: u8,
    pub channel_medium: u8,
    pub channel_protocol: u8,
    pub session_support: u8,
    pub active_sessions: u8,
    pub vendor_id: u32,
    pub aux_info: [u8; 2],
}

impl ChannelInfo {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() != CHANNEL_INFO_DATA_LEN {
            return Err(DecodeError::WrongLength {
                record: "Get Channel Info response",
                expected: "9",
                got: data.len(),
            });
        }
        Ok(ChannelInfo {
            channel_number: data[0] & INFO_CHANNEL_MASK,
            channel_medium: data[1] & INFO_MEDIUM_MASK,
            channel_protocol: data[2] & INFO_PROTOCOL_MASK,
            session_support: data[3] >> INFO_SESSION_SUPPORT_SHIFT,
            active_sessions: data[3] & INFO_ACTIVE_SESSION_MASK,
            vendor_id: ipmi24toh(&[data[4], data[5], data[6]]),
            aux_info: [data[7], data[8]],
        })
    }

    pub fn encode(&self) -> [u8; CHANNEL_INFO_DATA_LEN] {
        let iana = htoipmi24(self.vendor_id);
        [
            self.channel_number & INFO_CHANNEL_MASK,
            self.channel_medium & INFO_MEDIUM_MASK,
            self.channel_protocol & INFO_PROTOCOL_MASK,
            (self.session_support << INFO_SESSION_SUPPORT_SHIFT)
                | (self.active_sessions & INFO_ACTIVE_SESSION_MASK),
            iana[0],
            iana[1],
            iana[2],
            self.aux_info[0],
            self.aux_info[1],
        ]
    }
}

// Get Channel Access field masks, response byte 1
const ACCESS_MODE_MASK: u8 = 0x07;
const ACCESS_USER_LEVEL_DISABLED: u8 = 0x08;
const ACCESS_PER_MESSAGE_DISABLED: u8 = 0x10;
const ACCESS_ALERTING_DISABLED: u8 = 0x20;
// response byte 2
const ACCESS_PRIV_MASK: u8 = 0x0F;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelAccess {
    pub access_mode: u8,
    pub user_level_auth_disabled: bool,
    pub per_message_auth_disabled: bool,
    pub alerting_disabled: bool,
    pub privilege_limit: u8,
}

impl ChannelAccess {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() != CHANNEL_ACCESS_DATA_LEN {
            return Err(DecodeError::WrongLength {
                record: "Get Channel Access response",
                expected: "2",
                got: data.len(),
            });
        }
        Ok(ChannelAccess {
            access_mode: data[0] & ACCESS_MODE_MASK,
            user_level_auth_disabled: data[0] & ACCESS_USER_LEVEL_DISABLED != 0,
            per_message_auth_disabled: data[0] & ACCESS_PER_MESSAGE_DISABLED != 0,
            alerting_disabled: data[0] & ACCESS_ALERTING_DISABLED != 0,
            privilege_limit: data[1] & ACCESS_PRIV_MASK,
        })
    }

    pub fn encode(&self) -> [u8; CHANNEL_ACCESS_DATA_LEN] {
        let mut b0 = self.access_mode & ACCESS_MODE_MASK;
        if self.user_level_auth_disabled {
            b0 |= ACCESS_USER_LEVEL_DISABLED;
        }
        if self.per_message_auth_disabled {
            b0 |= ACCESS_PER_MESSAGE_DISABLED;
        }
        if self.alerting_disabled {
            b0 |= ACCESS_ALERTING_DISABLED;
        }
        [b0, self.privilege_limit & ACCESS_PRIV_MASK]
    }
}

// User id fields are 6 bits wide
pub const IPMI_UID_MASK: u8 = 0x3F;

// Get User Access response masks
const USER_ENABLE_STATUS_MASK: u8 = 0xC0;
const USER_NO_CALLIN: u8 = 0x40;
const USER_LINK_AUTH: u8 = 0x20;
const USER_IPMI_MESSAGING: u8 = 0x10;
const USER_PRIV_MASK: u8 = 0x0F;

/// Decoded Get User Access response. Flag fields hold the masked wire
/// bits in place (`callin_callback` is 0x40 or 0, and so on), the way
/// the reports consume them. `user_id` and `channel` are request-side
/// context filled in by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAccess {
    pub user_id: u8,
    pub channel: u8,
    pub max_user_ids: u8,
    pub enable_status: u8,
    pub enabled_user_ids: u8,
    pub fixed_user_ids: u8,
    pub callin_callback: u8,
    pub link_auth: u8,
    pub ipmi_messaging: u8,
    pub privilege_limit: u8,
    pub session_limit: u8,
}

impl UserAccess {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() != USER_ACCESS_DATA_LEN {
            return Err(DecodeError::WrongLength {
                record: "Get User Access response",
                expected: "4",
                got: data.len(),
            });
        }
        Ok(UserAccess {
            max_user_ids: data[0] & IPMI_UID_MASK,
            enable_status: data[1] & USER_ENABLE_STATUS_MASK,
            enabled_user_ids: data[1] & IPMI_UID_MASK,
            fixed_user_ids: data[2] & IPMI_UID_MASK,
            callin_callback: data[3] & USER_NO_CALLIN,
            link_auth: data[3] & USER_LINK_AUTH,
            ipmi_messaging: data[3] & USER_IPMI_MESSAGING,
            privilege_limit: data[3] & USER_PRIV_MASK,
            ..Default::default()
        })
    }

    pub fn encode(&self) -> [u8; USER_ACCESS_DATA_LEN] {
        [
            self.max_user_ids & IPMI_UID_MASK,
            (self.enable_status & USER_ENABLE_STATUS_MASK) | (self.enabled_user_ids & IPMI_UID_MASK),
            self.fixed_user_ids & IPMI_UID_MASK,
            (self.callin_callback & USER_NO_CALLIN)
                | (self.link_auth & USER_LINK_AUTH)
                | (self.ipmi_messaging & USER_IPMI_MESSAGING)
                | (self.privilege_limit & USER_PRIV_MASK),
        ]
    }
}

// Set User Access request, byte 1
const SET_ACCESS_CHANGE_BITS: u8 = 0x80;
const SET_ACCESS_CALLIN: u8 = 0x40;
const SET_ACCESS_LINK_AUTH: u8 = 0x20;
const SET_ACCESS_IPMI_MSG: u8 = 0x10;
const SET_ACCESS_CHANNEL_MASK: u8 = 0x0F;
const SET_ACCESS_SESSION_MASK: u8 = 0x0F;

/// Set User Access request record. With `change_access_bits` clear the
/// controller ignores the three access flags and only applies the
/// privilege limit (the `user priv` path); set, all four take effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAccessRequest {
    pub channel: u8,
    pub user_id: u8,
    pub change_access_bits: bool,
    pub callin_callback: bool,
    pub link_auth: bool,
    pub ipmi_messaging: bool,
    pub privilege_limit: u8,
    pub session_limit: u8,
}

impl UserAccessRequest {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() != USER_ACCESS_DATA_LEN {
            return Err(DecodeError::WrongLength {
                record: "Set User Access request",
                expected: "4",
                got: data.len(),
            });
        }
        Ok(UserAccessRequest {
            channel: data[0] & SET_ACCESS_CHANNEL_MASK,
            user_id: data[1] & IPMI_UID_MASK,
            change_access_bits: data[0] & SET_ACCESS_CHANGE_BITS != 0,
            callin_callback: data[0] & SET_ACCESS_CALLIN != 0,
            link_auth: data[0] & SET_ACCESS_LINK_AUTH != 0,
            ipmi_messaging: data[0] & SET_ACCESS_IPMI_MSG != 0,
            privilege_limit: data[2] & USER_PRIV_MASK,
            session_limit: data[3] & SET_ACCESS_SESSION_MASK,
        })
    }

    pub fn encode(&self) -> [u8; USER_ACCESS_DATA_LEN] {
        let mut b0 = self.channel & SET_ACCESS_CHANNEL_MASK;
        if self.change_access_bits {
            b0 |= SET_ACCESS_CHANGE_BITS;
        }
        if self.callin_callback {
            b0 |= SET_ACCESS_CALLIN;
        }
        if self.link_auth {
            b0 |= SET_ACCESS_LINK_AUTH;
        }
        if self.ipmi_messaging {
            b0 |= SET_ACCESS_IPMI_MSG;
        }
        [
            b0,
            self.user_id & IPMI_UID_MASK,
            self.privilege_limit & USER_PRIV_MASK,
            self.session_limit & SET_ACCESS_SESSION_MASK,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName {
    pub user_id: u8,
    pub user_name: [u8; 17],
}

impl Default for UserName {
    fn default() -> Self {
        UserName {
            user_id: 0,
            user_name: [0; 17],
        }
    }
}

impl UserName {
    /// Decode a Get User Name response. Controllers return 16 name
    /// bytes; some append a trailing byte. The 16-byte short form is
    /// accepted and zero-padded, anything else is a length error.
    pub fn decode(user_id: u8, data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() != USER_NAME_DATA_LEN && data.len() != USER_NAME_DATA_LEN + 1 {
            return Err(DecodeError::WrongLength {
                record: "Get User Name response",
                expected: "16 or 17",
                got: data.len(),
            });
        }
        let mut name = UserName {
            user_id,
            user_name: [0; 17],
        };
        name.user_name[..USER_NAME_DATA_LEN].copy_from_slice(&data[..USER_NAME_DATA_LEN]);
        Ok(name)
    }

    /// The 16 raw name bytes as carried in Set User Name requests.
    pub fn encode(&self) -> [u8; USER_NAME_DATA_LEN] {
        let mut data = [0u8; USER_NAME_DATA_LEN];
        data.copy_from_slice(&self.user_name[..USER_NAME_DATA_LEN]);
        data
    }

    /// 获取用户名的字符串表示
    pub fn name_as_string(&self) -> String {
        let end = self.user_name.iter().position(|&x| x == 0).unwrap_or(16);
        String::from_utf8_lossy(&self.user_name[..end]).to_string()
    }
}
