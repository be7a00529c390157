/*
 * SPDX-FileCopyrightText: 2025 UnionTech Software Technology Co., Ltd.
 *
 * SPDX-License-Identifier: GPL-2.0-or-later
 */
pub mod cipher;

use clap::Subcommand;
use std::error::Error;

use crate::commands::user;
use crate::debug1;
use crate::error::{ccode_str, IpmiError, IpmiResult};
use crate::helper::buf2str;
use crate::ipmi::constants::*;
use crate::ipmi::intf::IpmiIntf;
use crate::ipmi::ipmi::IpmiRq;
use crate::ipmi::records::{ChannelAccess, ChannelAuthCap, ChannelInfo, UserAccessRequest};
use crate::ipmi::strings::{
    ipmi_1_5_authtypes, privlvl_str, u8_to_str, IPMI_CHANNEL_MEDIUM_VALS,
    IPMI_CHANNEL_PROTOCOL_VALS,
};

use self::cipher::CipherPayload;

/// getaccess枚举上限，比user list的63窄
pub const IPMI_CHANNEL_GETACCESS_UID_MAX: u8 = 16;

fn parse_channel_number(s: &str) -> Result<u8, String> {
    let channel = if s.starts_with("0x") || s.starts_with("0X") {
        u8::from_str_radix(&s[2..], 16)
            .map_err(|_| format!("Invalid hexadecimal channel number: '{}'", s))?
    } else {
        s.parse::<u8>()
            .map_err(|_| format!("Invalid channel number: '{}'", s))?
    };
    if channel > 0x0F {
        return Err(format!(
            "Invalid channel number: {}. Must be between 0 and 15",
            channel
        ));
    }
    Ok(channel)
}

#[derive(Subcommand, Debug)]
pub enum ChannelCommand {
    /// Show channel authentication capabilities
    Authcap {
        #[arg(value_name = "CHANNEL_NUM", value_parser = parse_channel_number)]
        channel: u8,
        #[arg(value_name = "MAX_PRIVILEGE", value_parser = crate::commands::user::parse_privilege_level)]
        privilege: u8,
    },
    /// Display channel settings
    Info {
        #[arg(value_name = "CHANNEL_NUM", value_parser = parse_channel_number)]
        channel: Option<u8>,
    },
    /// Show user access on a channel
    Getaccess {
        #[arg(value_name = "CHANNEL_NUM", value_parser = parse_channel_number)]
        channel: u8,
        #[arg(value_name = "USER_ID")]
        user_id: Option<u8>,
    },
    /// Update user access on a channel
    Setaccess {
        #[arg(value_name = "CHANNEL_NUM", value_parser = parse_channel_number)]
        channel: u8,
        #[arg(value_name = "USER_ID")]
        user_id: u8,
        #[arg(value_name = "OPTION")]
        options: Vec<String>,
    },
    /// List cipher suites supported on a channel
    Getciphers {
        #[arg(value_name = "PAYLOAD")]
        payload: CipherPayload,
        #[arg(value_name = "CHANNEL_NUM", value_parser = parse_channel_number)]
        channel: Option<u8>,
    },
}

pub fn ipmi_channel_main(
    command: ChannelCommand,
    mut intf: Box<dyn IpmiIntf>,
) -> Result<(), Box<dyn Error>> {
    match command {
        ChannelCommand::Authcap { channel, privilege } => {
            let cap = ipmi_get_channel_auth_cap(intf.as_mut(), channel, privilege)?;
            print_channel_auth_cap(&cap);
            Ok(())
        }
        ChannelCommand::Info { channel } => {
            ipmi_get_channel_info(intf.as_mut(), channel.unwrap_or(IPMI_CURRENT_CHANNEL))
        }
        ChannelCommand::Getaccess { channel, user_id } => {
            ipmi_get_user_channel_access(intf.as_mut(), channel, user_id)
        }
        ChannelCommand::Setaccess {
            channel,
            user_id,
            options,
        } => ipmi_set_user_channel_access(intf.as_mut(), channel, user_id, &options),
        ChannelCommand::Getciphers { payload, channel } => cipher::ipmi_get_channel_cipher_suites(
            intf.as_mut(),
            &payload,
            channel.unwrap_or(IPMI_CURRENT_CHANNEL),
        ),
    }
}

pub fn show_channel_commands_help() {
    println!("Channel Commands: authcap   <channel number> <max privilege>");
    println!("                  getaccess <channel number> [user id]");
    println!(
        "                  setaccess <channel number> <user id> \
         [callin=on|off] [ipmi=on|off] [link=on|off] [privilege=level]"
    );
    println!("                  info      [channel number]");
    println!("                  getciphers <ipmi | sol> [channel]");
    println!();
    println!("Possible privilege levels are:");
    println!("   1   Callback level");
    println!("   2   User level");
    println!("   3   Operator level");
    println!("   4   Administrator level");
    println!("   5   OEM Proprietary level");
    println!("  15   No access");
}

/// Get Channel Authentication Capabilities with the v2 probe fallback.
///
/// The first request sets bit 7 of the channel byte to ask for IPMI v2
/// data. Controllers that predate v2 reject it, so on any failure the
/// request is retried exactly once with the bit cleared. A second
/// failure is terminal.
pub fn ipmi_get_channel_auth_cap(
    intf: &mut dyn IpmiIntf,
    channel: u8,
    priv_level: u8,
) -> IpmiResult<ChannelAuthCap> {
    let mut msg_data = [channel | 0x80, priv_level];

    let mut rsp = intf.sendrecv(&IpmiRq::app(IPMI_GET_CHANNEL_AUTH_CAP, msg_data.to_vec()));
    if !matches!(&rsp, Some(r) if r.ok()) {
        msg_data[0] &= 0x7F;
        rsp = intf.sendrecv(&IpmiRq::app(IPMI_GET_CHANNEL_AUTH_CAP, msg_data.to_vec()));
    }

    match rsp {
        None => Err(IpmiError::Interface(
            "Unable to Get Channel Authentication Capabilities".to_string(),
        )),
        Some(r) if r.fail() => Err(IpmiError::Interface(format!(
            "Get Channel Authentication Capabilities failed: {}",
            ccode_str(r.ccode)
        ))),
        Some(r) => Ok(ChannelAuthCap::decode(&r.data)?),
    }
}

pub fn print_channel_auth_cap(cap: &ChannelAuthCap) {
    println!("Channel number             : {}", cap.channel_number);
    println!(
        "IPMI v1.5  auth types      : {}",
        ipmi_1_5_authtypes(cap.enabled_auth_types)
    );

    if cap.v20_data_available {
        println!(
            "KG status                  : {}",
            if cap.kg_status {
                "non-zero"
            } else {
                "default (all zeroes)"
            }
        );
    }

    println!(
        "Per message authentication : {}abled",
        if cap.per_message_auth_disabled {
            "dis"
        } else {
            "en"
        }
    );
    println!(
        "User level authentication  : {}abled",
        if cap.user_level_auth_disabled {
            "dis"
        } else {
            "en"
        }
    );
    println!(
        "Non-null user names exist  : {}",
        if cap.non_null_usernames { "yes" } else { "no" }
    );
    println!(
        "Null user names exist      : {}",
        if cap.null_usernames { "yes" } else { "no" }
    );
    println!(
        "Anonymous login enabled    : {}",
        if cap.anon_login_enabled { "yes" } else { "no" }
    );

    if cap.v20_data_available {
        println!(
            "Channel supports IPMI v1.5 : {}",
            if cap.ipmiv15_support { "yes" } else { "no" }
        );
        println!(
            "Channel supports IPMI v2.0 : {}",
            if cap.ipmiv20_support { "yes" } else { "no" }
        );
    }

    if let Some(oem) = &cap.oem {
        println!("IANA Number for OEM        : {}", oem.iana);
        println!("OEM Auxiliary Data         : 0x{:x}", oem.aux_data);
    }
}

fn fetch_channel_info(intf: &mut dyn IpmiIntf, channel: u8) -> IpmiResult<ChannelInfo> {
    let req = IpmiRq::app(IPMI_GET_CHANNEL_INFO, vec![channel]);
    let rsp = intf
        .sendrecv(&req)
        .ok_or_else(|| IpmiError::Interface("Unable to Get Channel Info".to_string()))?;
    if rsp.fail() {
        return Err(IpmiError::Interface(format!(
            "Get Channel Info failed: {}",
            ccode_str(rsp.ccode)
        )));
    }
    Ok(ChannelInfo::decode(&rsp.data)?)
}

/// Fetch one Get Channel Access record; `selector` picks the volatile
/// (0x80) or non-volatile (0x40) storage.
pub fn ipmi_get_channel_access(
    intf: &mut dyn IpmiIntf,
    channel: u8,
    selector: u8,
) -> IpmiResult<ChannelAccess> {
    let kind = if selector == IPMI_CHANNEL_ACCESS_VOLATILE {
        "volatile"
    } else {
        "non-volatile"
    };
    let req = IpmiRq::app(IPMI_GET_CHANNEL_ACCESS, vec![channel & 0x0F, selector]);
    let rsp = intf.sendrecv(&req).ok_or_else(|| {
        IpmiError::Interface(format!("Unable to Get Channel Access ({})", kind))
    })?;
    if rsp.fail() {
        return Err(IpmiError::Interface(format!(
            "Get Channel Access ({}) failed: {}",
            kind,
            ccode_str(rsp.ccode)
        )));
    }
    Ok(ChannelAccess::decode(&rsp.data)?)
}

fn session_support_str(support: u8) -> &'static str {
    match support {
        IPMI_CHANNEL_SESSION_LESS => "session-less",
        IPMI_CHANNEL_SESSION_SINGLE => "single-session",
        IPMI_CHANNEL_SESSION_MULTI => "multi-session",
        _ => "session-based",
    }
}

fn access_mode_str(mode: u8) -> &'static str {
    match mode {
        IPMI_CHANNEL_ACCESS_MODE_DISABLED => "disabled",
        IPMI_CHANNEL_ACCESS_MODE_PREBOOT => "pre-boot only",
        IPMI_CHANNEL_ACCESS_MODE_ALWAYS => "always available",
        IPMI_CHANNEL_ACCESS_MODE_SHARED => "shared",
        _ => "unknown",
    }
}

fn print_channel_access(access: &ChannelAccess, header: &str) {
    println!("  {}", header);
    println!(
        "    Alerting            : {}abled",
        if access.alerting_disabled { "dis" } else { "en" }
    );
    println!(
        "    Per-message Auth    : {}abled",
        if access.per_message_auth_disabled {
            "dis"
        } else {
            "en"
        }
    );
    println!(
        "    User Level Auth     : {}abled",
        if access.user_level_auth_disabled {
            "dis"
        } else {
            "en"
        }
    );
    println!("    Access Mode         : {}", access_mode_str(access.access_mode));
}

pub fn ipmi_get_channel_info(
    intf: &mut dyn IpmiIntf,
    channel: u8,
) -> Result<(), Box<dyn Error>> {
    let info = fetch_channel_info(intf, channel)?;

    println!("Channel 0x{:x} info:", info.channel_number);
    println!(
        "  Channel Medium Type   : {}",
        u8_to_str(info.channel_medium, IPMI_CHANNEL_MEDIUM_VALS).unwrap_or("reserved")
    );
    println!(
        "  Channel Protocol Type : {}",
        u8_to_str(info.channel_protocol, IPMI_CHANNEL_PROTOCOL_VALS).unwrap_or("reserved")
    );
    println!(
        "  Session Support       : {}",
        session_support_str(info.session_support)
    );
    println!("  Active Session Count  : {}", info.active_sessions);
    println!("  Protocol Vendor ID    : {}", info.vendor_id);
    if info.aux_info != [0, 0] {
        debug1!("  Aux Channel Info      : {}", buf2str(&info.aux_info, 2));
    }

    // only proceed if this is a LAN channel
    let medium = ipmi_get_channel_medium(intf, channel);
    if medium != IPMI_CHANNEL_MEDIUM_LAN && medium != IPMI_CHANNEL_MEDIUM_LAN_OTHER {
        return Ok(());
    }

    let volatile = ipmi_get_channel_access(intf, channel, IPMI_CHANNEL_ACCESS_VOLATILE)?;
    print_channel_access(&volatile, "Volatile(active) Settings");

    let non_volatile = ipmi_get_channel_access(intf, channel, IPMI_CHANNEL_ACCESS_NON_VOLATILE)?;
    print_channel_access(&non_volatile, "Non-Volatile Settings");

    Ok(())
}

/// Query the medium type of a channel. Failures fall back to the
/// reserved medium instead of propagating: the result only decides
/// whether optional follow-up fetches are attempted.
pub fn ipmi_get_channel_medium(intf: &mut dyn IpmiIntf, channel: u8) -> u8 {
    let req = IpmiRq::app(IPMI_GET_CHANNEL_INFO, vec![channel]);
    let rsp = match intf.sendrecv(&req) {
        Some(rsp) => rsp,
        None => {
            log::error!("Get Channel Info command failed");
            return IPMI_CHANNEL_MEDIUM_RESERVED;
        }
    };
    if rsp.fail() {
        if rsp.ccode != 0xcc {
            log::info!(
                "Get Channel Info command failed: {}",
                ccode_str(rsp.ccode)
            );
        }
        return IPMI_CHANNEL_MEDIUM_RESERVED;
    }
    match ChannelInfo::decode(&rsp.data) {
        Ok(info) => info.channel_medium,
        Err(_) => IPMI_CHANNEL_MEDIUM_RESERVED,
    }
}

fn ipmi_get_user_channel_access(
    intf: &mut dyn IpmiIntf,
    channel: u8,
    user_id: Option<u8>,
) -> Result<(), Box<dyn Error>> {
    // id 0 is reserved and requests a full enumeration
    let user_id = user_id.filter(|&id| id != 0);
    let records =
        user::collect_user_records(intf, channel, user_id, IPMI_CHANNEL_GETACCESS_UID_MAX)?;

    if let Some(first) = records.first() {
        println!("Maximum User IDs     : {}", first.access.max_user_ids);
        println!("Enabled User IDs     : {}", first.access.enabled_user_ids);
    }

    for rec in &records {
        println!();
        println!("User ID              : {}", rec.access.user_id);
        println!("User Name            : {}", rec.name.name_as_string());
        println!(
            "Fixed Name           : {}",
            if rec.access.user_id <= rec.access.fixed_user_ids {
                "Yes"
            } else {
                "No"
            }
        );
        println!(
            "Access Available     : {}",
            if rec.access.callin_callback != 0 {
                "callback"
            } else {
                "call-in / callback"
            }
        );
        println!(
            "Link Authentication  : {}abled",
            if rec.access.link_auth != 0 { "en" } else { "dis" }
        );
        println!(
            "IPMI Messaging       : {}abled",
            if rec.access.ipmi_messaging != 0 {
                "en"
            } else {
                "dis"
            }
        );
        println!(
            "Privilege Level      : {}",
            privlvl_str(rec.access.privilege_limit)
        );
    }

    Ok(())
}

fn ipmi_set_user_channel_access(
    intf: &mut dyn IpmiIntf,
    channel: u8,
    user_id: u8,
    options: &[String],
) -> Result<(), Box<dyn Error>> {
    // read-modify-write from the current access record
    let current = user::ipmi_get_user_access(intf, channel, user_id).map_err(|e| {
        format!(
            "Unable to Get User Access (channel {} id {}): {}",
            channel, user_id, e
        )
    })?;

    let mut request = UserAccessRequest {
        channel,
        user_id,
        change_access_bits: true,
        callin_callback: current.callin_callback != 0,
        link_auth: current.link_auth != 0,
        ipmi_messaging: current.ipmi_messaging != 0,
        privilege_limit: current.privilege_limit,
        session_limit: 0,
    };

    for opt in options {
        if let Some(value) = opt.strip_prefix("callin=") {
            request.callin_callback = value == "off";
        } else if let Some(value) = opt.strip_prefix("link=") {
            request.link_auth = value != "off";
        } else if let Some(value) = opt.strip_prefix("ipmi=") {
            request.ipmi_messaging = value != "off";
        } else if let Some(value) = opt.strip_prefix("privilege=") {
            request.privilege_limit = value.parse::<u8>().map_err(|_| {
                format!("Numeric value expected, but '{}' given.", value)
            })?;
        } else {
            show_channel_commands_help();
            return Err(format!("Invalid option: {}", opt).into());
        }
    }

    let req = IpmiRq::app(IPMI_SET_USER_ACCESS, request.encode().to_vec());
    match intf.sendrecv(&req) {
        Some(rsp) if rsp.fail() => Err(format!(
            "Unable to Set User Access (channel {} id {}): {}",
            channel,
            user_id,
            ccode_str(rsp.ccode)
        )
        .into()),
        Some(_) => {
            println!(
                "Set User Access (channel {} id {}) successful.",
                channel, user_id
            );
            Ok(())
        }
        None => Err(format!(
            "Unable to Set User Access (channel {} id {}): no response",
            channel, user_id
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipmi::mock::MockIntf;

    #[test]
    fn test_auth_cap_first_attempt_success() {
        let mut intf = MockIntf::new();
        intf.push_ok(&[0x0E, 0x15, 0x1C, 0x03, 0x00, 0x00, 0x00, 0x00]);

        let cap = ipmi_get_channel_auth_cap(&mut intf, 0x0E, 4).unwrap();
        assert_eq!(intf.requests.len(), 1);
        assert_eq!(intf.requests[0].cmd, IPMI_GET_CHANNEL_AUTH_CAP);
        // v2 probe bit set on the first attempt
        assert_eq!(intf.requests[0].data, vec![0x8E, 0x04]);
        assert!(cap.oem.is_none());
    }

    #[test]
    fn test_auth_cap_retries_with_probe_bit_cleared() {
        let mut intf = MockIntf::new();
        intf.push_ccode(0xcc);
        // OEM auth type bit set, IANA 01 02 03
        intf.push_ok(&[0x0E, 0x20, 0x00, 0x00, 0x01, 0x02, 0x03, 0x00]);

        let cap = ipmi_get_channel_auth_cap(&mut intf, 0x0E, 4).unwrap();
        assert_eq!(intf.requests.len(), 2);
        assert_eq!(intf.requests[0].data[0], 0x8E);
        assert_eq!(intf.requests[1].data[0], 0x0E);
        assert_eq!(cap.oem.unwrap().iana, 0x030201);
    }

    #[test]
    fn test_auth_cap_retries_after_transport_failure() {
        let mut intf = MockIntf::new();
        intf.push_none();
        intf.push_ok(&[0x0E, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

        assert!(ipmi_get_channel_auth_cap(&mut intf, 0x0E, 4).is_ok());
        assert_eq!(intf.requests.len(), 2);
    }

    #[test]
    fn test_auth_cap_second_failure_is_terminal() {
        let mut intf = MockIntf::new();
        intf.push_ccode(0xd4);
        intf.push_ccode(0xd4);

        let err = ipmi_get_channel_auth_cap(&mut intf, 0x0E, 4).unwrap_err();
        assert!(err
            .to_string()
            .contains("Get Channel Authentication Capabilities failed"));
        assert_eq!(intf.requests.len(), 2);
    }

    #[test]
    fn test_channel_medium_falls_back_to_reserved() {
        let mut intf = MockIntf::new();
        intf.push_ccode(0xcc);
        assert_eq!(
            ipmi_get_channel_medium(&mut intf, 1),
            IPMI_CHANNEL_MEDIUM_RESERVED
        );

        let mut intf = MockIntf::new();
        intf.push_none();
        assert_eq!(
            ipmi_get_channel_medium(&mut intf, 1),
            IPMI_CHANNEL_MEDIUM_RESERVED
        );
    }

    #[test]
    fn test_channel_medium_decodes_medium_field() {
        let mut intf = MockIntf::new();
        intf.push_ok(&[0x01, IPMI_CHANNEL_MEDIUM_LAN, 0x01, 0x80, 0, 0, 0, 0, 0]);
        assert_eq!(ipmi_get_channel_medium(&mut intf, 1), IPMI_CHANNEL_MEDIUM_LAN);
    }

    #[test]
    fn test_channel_info_skips_access_on_non_lan() {
        let mut intf = MockIntf::new();
        // info response: medium 0x5 (serial)
        intf.push_ok(&[0x01, 0x05, 0x01, 0x80, 0, 0, 0, 0, 0]);
        // medium query reuses Get Channel Info
        intf.push_ok(&[0x01, 0x05, 0x01, 0x80, 0, 0, 0, 0, 0]);

        ipmi_get_channel_info(&mut intf, 1).unwrap();
        assert_eq!(intf.requests.len(), 2);
    }

    #[test]
    fn test_channel_info_fetches_both_access_variants_on_lan() {
        let mut intf = MockIntf::new();
        let info = [0x01, IPMI_CHANNEL_MEDIUM_LAN, 0x01, 0x80, 0, 0, 0, 0, 0];
        intf.push_ok(&info);
        intf.push_ok(&info);
        intf.push_ok(&[0x22, 0x04]); // volatile
        intf.push_ok(&[0x2A, 0x04]); // non-volatile

        ipmi_get_channel_info(&mut intf, 1).unwrap();
        assert_eq!(intf.requests.len(), 4);
        assert_eq!(intf.requests[2].cmd, IPMI_GET_CHANNEL_ACCESS);
        assert_eq!(intf.requests[2].data, vec![0x01, IPMI_CHANNEL_ACCESS_VOLATILE]);
        assert_eq!(
            intf.requests[3].data,
            vec![0x01, IPMI_CHANNEL_ACCESS_NON_VOLATILE]
        );
    }

    #[test]
    fn test_setaccess_read_modify_write() {
        let mut intf = MockIntf::new();
        // current access: callin restricted, link off, ipmi on, priv USER
        intf.push_ok(&[0x10, 0x42, 0x02, 0x52]);
        intf.push_ok(&[]); // set response
        let options = vec!["link=on".to_string(), "privilege=4".to_string()];
        ipmi_set_user_channel_access(&mut intf, 1, 2, &options).unwrap();

        assert_eq!(intf.requests.len(), 2);

        let set_req = intf.requests.last().unwrap();
        assert_eq!(set_req.cmd, IPMI_SET_USER_ACCESS);
        // change bit + callin restricted + link enabled + ipmi enabled + channel 1
        assert_eq!(set_req.data[0], 0x80 | 0x40 | 0x20 | 0x10 | 0x01);
        assert_eq!(set_req.data[1], 0x02);
        assert_eq!(set_req.data[2], 0x04);
        assert_eq!(set_req.data[3], 0x00);
    }

    #[test]
    fn test_setaccess_rejects_unknown_option() {
        let mut intf = MockIntf::new();
        intf.push_ok(&[0x10, 0x42, 0x02, 0x12]);
        let options = vec!["bogus=1".to_string()];
        let err = ipmi_set_user_channel_access(&mut intf, 1, 2, &options).unwrap_err();
        assert!(err.to_string().contains("Invalid option"));
        // the write never happened
        assert_eq!(intf.requests.len(), 1);
    }

    #[test]
    fn test_getaccess_explicit_id_single_iteration() {
        let mut intf = MockIntf::new();
        intf.push_ok(&[0x10, 0x42, 0x05, 0x34]);
        intf.push_ok(&[0u8; 16]);

        ipmi_get_user_channel_access(&mut intf, 1, Some(3)).unwrap();
        assert_eq!(intf.requests.len(), 2);
    }

    #[test]
    fn test_parse_channel_number() {
        assert_eq!(parse_channel_number("14").unwrap(), 14);
        assert_eq!(parse_channel_number("0x0E").unwrap(), 14);
        assert!(parse_channel_number("16").is_err());
        assert!(parse_channel_number("lan").is_err());
    }
}
