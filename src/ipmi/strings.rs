/*
 * SPDX-FileCopyrightText: 2025 UnionTech Software Technology Co., Ltd.
 *
 * SPDX-License-Identifier: GPL-2.0-or-later
 */
use crate::ipmi::constants::*;

pub struct U8Str {
    pub val: u8,
    pub desc: &'static str,
}

pub fn u8_to_str(val: u8, vals: &[U8Str]) -> Option<&'static str> {
    vals.iter().find(|v| v.val == val).map(|v| v.desc)
}

/// 权限级别显示，未知值显示为"Unknown (0xXX)"
pub fn privlvl_str(level: u8) -> String {
    match u8_to_str(level, IPMI_PRIVLVL_VALS) {
        Some(desc) => desc.to_string(),
        None => format!("Unknown (0x{:02X})", level),
    }
}

pub const IPMI_PRIVLVL_VALS: &[U8Str] = &[
    U8Str {
        val: IPMI_SESSION_PRIV_CALLBACK,
        desc: "CALLBACK",
    },
    U8Str {
        val: IPMI_SESSION_PRIV_USER,
        desc: "USER",
    },
    U8Str {
        val: IPMI_SESSION_PRIV_OPERATOR,
        desc: "OPERATOR",
    },
    U8Str {
        val: IPMI_SESSION_PRIV_ADMIN,
        desc: "ADMINISTRATOR",
    },
    U8Str {
        val: IPMI_SESSION_PRIV_OEM,
        desc: "OEM",
    },
    U8Str {
        val: IPMI_SESSION_PRIV_NOACCESS,
        desc: "NO ACCESS",
    },
];

pub const IPMI_AUTHTYPE_VALS: &[U8Str] = &[
    U8Str {
        val: AuthTypes::NONE.bits(),
        desc: "NONE",
    },
    U8Str {
        val: AuthTypes::MD2.bits(),
        desc: "MD2",
    },
    U8Str {
        val: AuthTypes::MD5.bits(),
        desc: "MD5",
    },
    U8Str {
        val: AuthTypes::PASSWORD.bits(),
        desc: "PASSWORD",
    },
    U8Str {
        val: AuthTypes::OEM.bits(),
        desc: "OEM",
    },
];

/// Describe the supported IPMI 1.5 authentication types in `mask`.
pub fn ipmi_1_5_authtypes(mask: AuthTypes) -> String {
    let names: Vec<&str> = IPMI_AUTHTYPE_VALS
        .iter()
        .filter(|v| mask.bits() & v.val != 0)
        .map(|v| v.desc)
        .collect();
    names.join(" ")
}

pub const IPMI_CHANNEL_MEDIUM_VALS: &[U8Str] = &[
    U8Str {
        val: IPMI_CHANNEL_MEDIUM_RESERVED,
        desc: "reserved",
    },
    U8Str {
        val: IPMI_CHANNEL_MEDIUM_IPMB_I2C,
        desc: "IPMB (I2C)",
    },
    U8Str {
        val: IPMI_CHANNEL_MEDIUM_ICMB_1,
        desc: "ICMB v1.0",
    },
    U8Str {
        val: IPMI_CHANNEL_MEDIUM_ICMB_09,
        desc: "ICMB v0.9",
    },
    U8Str {
        val: IPMI_CHANNEL_MEDIUM_LAN,
        desc: "802.3 LAN",
    },
    U8Str {
        val: IPMI_CHANNEL_MEDIUM_SERIAL,
        desc: "Serial/Modem",
    },
    U8Str {
        val: IPMI_CHANNEL_MEDIUM_LAN_OTHER,
        desc: "Other LAN",
    },
    U8Str {
        val: IPMI_CHANNEL_MEDIUM_SMBUS_PCI,
        desc: "PCI SMBus",
    },
    U8Str {
        val: IPMI_CHANNEL_MEDIUM_SMBUS_1,
        desc: "SMBus v1.0/v1.1",
    },
    U8Str {
        val: IPMI_CHANNEL_MEDIUM_SMBUS_2,
        desc: "SMBus v2.0",
    },
    U8Str {
        val: IPMI_CHANNEL_MEDIUM_USB_1,
        desc: "USB 1.x",
    },
    U8Str {
        val: IPMI_CHANNEL_MEDIUM_USB_2,
        desc: "USB 2.x",
    },
    U8Str {
        val: IPMI_CHANNEL_MEDIUM_SYSTEM,
        desc: "System Interface",
    },
];

pub const IPMI_CHANNEL_PROTOCOL_VALS: &[U8Str] = &[
    U8Str {
        val: 0x00,
        desc: "reserved",
    },
    U8Str {
        val: 0x01,
        desc: "IPMB-1.0",
    },
    U8Str {
        val: 0x02,
        desc: "ICMB-1.0",
    },
    U8Str {
        val: 0x03,
        desc: "reserved",
    },
    U8Str {
        val: 0x04,
        desc: "IPMI-SMBus",
    },
    U8Str {
        val: 0x05,
        desc: "KCS",
    },
    U8Str {
        val: 0x06,
        desc: "SMIC",
    },
    U8Str {
        val: 0x07,
        desc: "BT-10",
    },
    U8Str {
        val: 0x08,
        desc: "BT-15",
    },
    U8Str {
        val: 0x09,
        desc: "TMode",
    },
    U8Str {
        val: 0x1c,
        desc: "OEM 1",
    },
    U8Str {
        val: 0x1d,
        desc: "OEM 2",
    },
    U8Str {
        val: 0x1e,
        desc: "OEM 3",
    },
    U8Str {
        val: 0x1f,
        desc: "OEM 4",
    },
];

pub const IPMI_AUTH_ALGORITHMS: &[U8Str] = &[
    U8Str {
        val: IPMI_AUTH_RAKP_NONE,
        desc: "none",
    },
    U8Str {
        val: IPMI_AUTH_RAKP_HMAC_SHA1,
        desc: "hmac_sha1",
    },
    U8Str {
        val: IPMI_AUTH_RAKP_HMAC_MD5,
        desc: "hmac_md5",
    },
];

pub const IPMI_INTEGRITY_ALGORITHMS: &[U8Str] = &[
    U8Str {
        val: IPMI_INTEGRITY_NONE,
        desc: "none",
    },
    U8Str {
        val: IPMI_INTEGRITY_HMAC_SHA1_96,
        desc: "hmac_sha1_96",
    },
    U8Str {
        val: IPMI_INTEGRITY_HMAC_MD5_128,
        desc: "hmac_md5_128",
    },
    U8Str {
        val: IPMI_INTEGRITY_MD5_128,
        desc: "md5_128",
    },
];

pub const IPMI_ENCRYPTION_ALGORITHMS: &[U8Str] = &[
    U8Str {
        val: IPMI_CRYPT_NONE,
        desc: "none",
    },
    U8Str {
        val: IPMI_CRYPT_AES_CBC_128,
        desc: "aes_cbc_128",
    },
    U8Str {
        val: IPMI_CRYPT_XRC4_128,
        desc: "xrc4_128",
    },
    U8Str {
        val: IPMI_CRYPT_XRC4_40,
        desc: "xrc4_40",
    },
];

pub const IPMI_USER_ENABLE_STATUS_VALS: &[U8Str] = &[
    U8Str {
        val: 0x00,
        desc: "unknown",
    },
    U8Str {
        val: 0x40,
        desc: "enabled",
    },
    U8Str {
        val: 0x80,
        desc: "disabled",
    },
    U8Str {
        val: 0xC0,
        desc: "reserved",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privlvl_lookup() {
        assert_eq!(privlvl_str(0x4), "ADMINISTRATOR");
        assert_eq!(privlvl_str(0xF), "NO ACCESS");
        assert_eq!(privlvl_str(0x9), "Unknown (0x09)");
    }

    #[test]
    fn test_authtype_description() {
        let mask = AuthTypes::NONE | AuthTypes::MD5 | AuthTypes::PASSWORD;
        assert_eq!(ipmi_1_5_authtypes(mask), "NONE MD5 PASSWORD");
        assert_eq!(ipmi_1_5_authtypes(AuthTypes::empty()), "");
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!(u8_to_str(0, IPMI_AUTH_ALGORITHMS), Some("none"));
        assert_eq!(u8_to_str(1, IPMI_ENCRYPTION_ALGORITHMS), Some("aes_cbc_128"));
        assert_eq!(u8_to_str(0x3f, IPMI_INTEGRITY_ALGORITHMS), None);
    }
}
