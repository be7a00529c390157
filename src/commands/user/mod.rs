/*
 * SPDX-FileCopyrightText: 2025 UnionTech Software Technology Co., Ltd.
 *
 * SPDX-License-Identifier: GPL-2.0-or-later
 */
use clap::{Args, Subcommand};
use std::error::Error;

use crate::debug1;
use crate::error::{ccode_str, IpmiError, IpmiResult};
use crate::ipmi::constants::*;
use crate::ipmi::intf::IpmiIntf;
use crate::ipmi::ipmi::{IpmiRq, IPMI_CC_INV_DATA_FIELD_IN_REQ};
use crate::ipmi::records::{UserAccess, UserAccessRequest, UserName, IPMI_UID_MASK};
use crate::ipmi::strings::privlvl_str;

// Set User Password operation selector (request byte 2)
pub const IPMI_PASSWORD_DISABLE_USER: u8 = 0x00;
pub const IPMI_PASSWORD_ENABLE_USER: u8 = 0x01;
pub const IPMI_PASSWORD_SET_PASSWORD: u8 = 0x02;
pub const IPMI_PASSWORD_TEST_PASSWORD: u8 = 0x03;

pub const IPMI_UID_MIN: u8 = 1;
pub const IPMI_UID_MAX: u8 = 63;

#[inline]
pub fn ipmi_uid(id: u8) -> u8 {
    id & IPMI_UID_MASK
}

/// 解析权限级别，支持十进制和十六进制输入
pub(crate) fn parse_privilege_level(s: &str) -> Result<u8, String> {
    let privilege = if s.starts_with("0x") || s.starts_with("0X") {
        u8::from_str_radix(&s[2..], 16)
            .map_err(|_| format!("Invalid hexadecimal privilege level: '{}'", s))?
    } else {
        s.parse::<u8>()
            .map_err(|_| format!("Invalid decimal privilege level: '{}'", s))?
    };

    match privilege {
        1..=5 | 15 => Ok(privilege),
        _ => Err(format!(
            "Invalid privilege level: {}. Valid values are:\n\
            Privilege levels:\n  \
            * 0x1 - Callback\n  \
            * 0x2 - User\n  \
            * 0x3 - Operator\n  \
            * 0x4 - Administrator\n  \
            * 0x5 - OEM Proprietary\n  \
            * 0xF - No Access",
            privilege
        )),
    }
}

/// 解析密码格式参数 (16或20字节)
fn parse_password_format(s: &str) -> Result<u8, String> {
    match s {
        "16" => Ok(16),
        "20" => Ok(20),
        _ => Err(format!(
            "Invalid password format: '{}'. Valid values are:\n  \
            16 - 16-byte password format\n  \
            20 - 20-byte password format",
            s
        )),
    }
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Show user summary
    Summary {
        #[arg(value_name = "CHANNEL_NUM")]
        channel: Option<u8>,
    },
    /// List all users
    List {
        #[arg(value_name = "CHANNEL_NUM")]
        channel: Option<u8>,
    },
    /// Set user attributes
    Set(UserSetCommand),
    /// Disable user
    Disable {
        #[arg(value_name = "USER_ID")]
        user_id: u8,
    },
    /// Enable user
    Enable {
        #[arg(value_name = "USER_ID")]
        user_id: u8,
    },
    #[command(about = "Set user privilege level\n\
                      \n\
                      Privilege levels:\n  \
                      * 0x1 - Callback\n  \
                      * 0x2 - User\n  \
                      * 0x3 - Operator\n  \
                      * 0x4 - Administrator\n  \
                      * 0x5 - OEM Proprietary\n  \
                      * 0xF - No Access")]
    Priv {
        #[arg(value_name = "USER_ID")]
        user_id: Option<u8>,
        #[arg(value_name = "PRIVILEGE_LEVEL", value_parser = parse_privilege_level)]
        privilege: Option<u8>,
        #[arg(value_name = "CHANNEL_NUM")]
        channel: Option<u8>,
    },
    /// Test password storage format
    Test {
        #[arg(value_name = "USER_ID")]
        user_id: u8,
        #[arg(value_name = "FORMAT", value_parser = parse_password_format)]
        format: u8,
        #[arg(value_name = "PASSWORD")]
        password: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct UserSetCommand {
    #[command(subcommand)]
    pub action: UserSetAction,
}

#[derive(Subcommand, Debug)]
pub enum UserSetAction {
    /// Set username
    Name {
        #[arg(value_name = "USER_ID")]
        user_id: u8,
        #[arg(value_name = "USERNAME")]
        username: String,
    },
    /// Set/clear password
    Password {
        #[arg(value_name = "USER_ID")]
        user_id: u8,
        #[arg(value_name = "PASSWORD")]
        password: Option<String>,
        #[arg(value_name = "FORMAT", value_parser = parse_password_format)]
        format: Option<u8>,
    },
}

pub fn ipmi_user_main(
    command: UserCommand,
    mut intf: Box<dyn IpmiIntf>,
) -> Result<(), Box<dyn Error>> {
    match command {
        UserCommand::Summary { channel } => {
            ipmi_print_user_summary(intf.as_mut(), channel.unwrap_or(IPMI_CURRENT_CHANNEL))
        }
        UserCommand::List { channel } => {
            ipmi_print_user_list(intf.as_mut(), channel.unwrap_or(IPMI_CURRENT_CHANNEL))
        }
        UserCommand::Set(set_cmd) => match set_cmd.action {
            UserSetAction::Name { user_id, username } => {
                ipmi_set_user_name(intf.as_mut(), user_id, &username)
            }
            UserSetAction::Password {
                user_id,
                password,
                format,
            } => {
                let is_twenty_byte = format == Some(20);
                ipmi_set_user_password(intf.as_mut(), user_id, password.as_deref(), is_twenty_byte)
            }
        },
        UserCommand::Disable { user_id } => ipmi_user_disable(intf.as_mut(), user_id),
        UserCommand::Enable { user_id } => ipmi_user_enable(intf.as_mut(), user_id),
        UserCommand::Priv {
            user_id,
            privilege,
            channel,
        } => match (user_id, privilege) {
            (Some(uid), Some(priv_level)) => {
                ipmi_user_set_privilege(intf.as_mut(), uid, priv_level, channel)
            }
            _ => {
                show_user_commands_help_impl(false);
                Ok(())
            }
        },
        UserCommand::Test {
            user_id,
            format,
            password,
        } => {
            let is_twenty_byte = format == 20;
            let password = match password {
                Some(pwd) => pwd,
                None => rpassword::prompt_password(build_password_prompt(user_id))
                    .map_err(|e| format!("Failed to read password: {}", e))?,
            };
            match ipmi_user_test_password(
                intf.as_mut(),
                user_id,
                Some(&password),
                is_twenty_byte,
            )? {
                PasswordTestOutcome::Correct => {
                    println!("Success");
                    Ok(())
                }
                PasswordTestOutcome::Incorrect => {
                    println!("Failure: password incorrect");
                    std::process::exit(1);
                }
                PasswordTestOutcome::WrongSize => {
                    println!("Failure: wrong password size");
                    std::process::exit(1);
                }
                PasswordTestOutcome::Failed(_) => {
                    println!("Unknown error");
                    std::process::exit(1);
                }
            }
        }
    }
}

/// 显示用户命令帮助信息，与ipmitool保持一致
pub fn show_user_commands_help() {
    show_user_commands_help_impl(true);
}

pub fn show_user_commands_help_impl(show_error_message: bool) {
    if show_error_message {
        println!("Not enough parameters given.");
    }
    println!("User Commands:");
    println!("        summary         [<channel number>]");
    println!("        list            [<channel number>]");
    println!("        set name        <user id> <username>");
    println!("        set password    <user id> [<password> <16|20>]");
    println!("        disable         <user id>");
    println!("        enable          <user id>");
    println!("        priv            <user id> <privilege level> [<channel number>]");
    println!("                        Privilege levels:");
    println!("                        * 0x1 - Callback");
    println!("                        * 0x2 - User");
    println!("                        * 0x3 - Operator");
    println!("                        * 0x4 - Administrator");
    println!("                        * 0x5 - OEM Proprietary");
    println!("                        * 0xF - No Access");
    println!();
    println!("        test            <user id> <16|20> [<password>]");
    println!();
}

/// Fetch the access record for one user id on a channel.
pub(crate) fn ipmi_get_user_access(
    intf: &mut dyn IpmiIntf,
    channel: u8,
    user_id: u8,
) -> IpmiResult<UserAccess> {
    let req = IpmiRq::app(
        IPMI_GET_USER_ACCESS,
        vec![channel & 0x0F, ipmi_uid(user_id)],
    );
    let rsp = intf.sendrecv(&req).ok_or(IpmiError::ResponseError)?;
    if rsp.fail() {
        return Err(IpmiError::CompletionCode(rsp.ccode));
    }
    let mut access = UserAccess::decode(&rsp.data)?;
    access.user_id = user_id;
    access.channel = channel;
    Ok(access)
}

/// Fetch the name record for one user id. A 0xCC completion status
/// means the controller has no record for this id and is reported as
/// an empty name, not a failure.
pub(crate) fn ipmi_get_user_name(intf: &mut dyn IpmiIntf, user_id: u8) -> IpmiResult<UserName> {
    let req = IpmiRq::app(IPMI_GET_USER_NAME, vec![ipmi_uid(user_id)]);
    let rsp = intf.sendrecv(&req).ok_or(IpmiError::ResponseError)?;
    if rsp.ccode == IPMI_CC_INV_DATA_FIELD_IN_REQ {
        return Ok(UserName {
            user_id,
            ..Default::default()
        });
    }
    if rsp.fail() {
        return Err(IpmiError::CompletionCode(rsp.ccode));
    }
    Ok(UserName::decode(user_id, &rsp.data)?)
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub access: UserAccess,
    pub name: UserName,
}

/// Enumerate user records on a channel, ascending ids.
///
/// With `user_id` given the scan is exactly one access+name fetch pair.
/// Otherwise it starts at id 1 and runs through the maximum id reported
/// by the first access record, additionally bounded by `id_cap`. Any
/// fetch failure aborts the whole scan; partial listings are never
/// returned.
pub(crate) fn collect_user_records(
    intf: &mut dyn IpmiIntf,
    channel: u8,
    user_id: Option<u8>,
    id_cap: u8,
) -> IpmiResult<Vec<UserRecord>> {
    let mut records = Vec::new();
    let mut curr_uid = user_id.unwrap_or(IPMI_UID_MIN);
    let mut max_uid = 0u8;
    let mut first = true;

    loop {
        let access = ipmi_get_user_access(intf, channel, curr_uid).map_err(|e| {
            IpmiError::Interface(format!(
                "Unable to Get User Access (channel {} id {}): {}",
                channel, curr_uid, e
            ))
        })?;
        let name = ipmi_get_user_name(intf, curr_uid).map_err(|e| {
            IpmiError::Interface(format!(
                "Unable to Get User Name (channel {} id {}): {}",
                channel, curr_uid, e
            ))
        })?;

        if first {
            // The maximum id is taken from the first record only.
            max_uid = access.max_user_ids.min(id_cap);
            first = false;
        }
        records.push(UserRecord { access, name });

        if user_id.is_some() {
            break;
        }
        curr_uid += 1;
        if curr_uid > max_uid {
            break;
        }
    }

    Ok(records)
}

/// `user list` presentation filter: empty records are suppressed.
fn listable(rec: &UserRecord) -> bool {
    rec.access.user_id == 0
        || rec.access.link_auth != 0
        || rec.access.ipmi_messaging != 0
        || !rec.name.name_as_string().is_empty()
}

pub fn format_user_summary(access: &UserAccess, csv: bool) -> String {
    if csv {
        format!(
            "{},{},{}",
            access.max_user_ids, access.enabled_user_ids, access.fixed_user_ids
        )
    } else {
        format!(
            "Maximum IDs         : {}\nEnabled User Count  : {}\nFixed Name Count    : {}",
            access.max_user_ids, access.enabled_user_ids, access.fixed_user_ids
        )
    }
}

/// Table/CSV writer for `user list`. Owns the header state so repeated
/// invocations cannot leak it across reports.
pub struct UserListWriter {
    csv: bool,
    verbose: u8,
    header_printed: bool,
}

impl UserListWriter {
    pub fn new(csv: bool, verbose: u8) -> Self {
        Self {
            csv,
            verbose,
            header_printed: false,
        }
    }

    pub fn format_record(&mut self, rec: &UserRecord) -> String {
        let access = &rec.access;
        let user_name = rec.name.name_as_string();

        if self.csv {
            return format!(
                "{},{},{},{},{},{}\n",
                access.user_id,
                user_name,
                if access.callin_callback != 0 {
                    "false"
                } else {
                    "true"
                },
                if access.link_auth != 0 { "true" } else { "false" },
                if access.ipmi_messaging != 0 {
                    "true"
                } else {
                    "false"
                },
                privlvl_str(access.privilege_limit)
            );
        }

        let mut output = String::new();
        if !self.header_printed {
            output
                .push_str("ID  Name             Callin  Link Auth  IPMI Msg   Channel Priv Limit\n");
            self.header_printed = true;
        }

        output.push_str(&format!(
            "{:<4}{:<17}{:<8}{:<11}{:<11}{}\n",
            access.user_id,
            user_name,
            if access.callin_callback != 0 {
                "false"
            } else {
                "true "
            },
            if access.link_auth != 0 { "true " } else { "false" },
            if access.ipmi_messaging != 0 {
                "true "
            } else {
                "false"
            },
            privlvl_str(access.privilege_limit)
        ));

        if self.verbose > 0 {
            output.push_str(&format!("    Enable Status: 0x{:02X}\n", access.enable_status));
        }
        if self.verbose > 1 {
            output.push_str(&format!("    Max User IDs: {}\n", access.max_user_ids));
            output.push_str(&format!(
                "    Enabled User IDs: {}\n",
                access.enabled_user_ids
            ));
            output.push_str(&format!("    Fixed User IDs: {}\n", access.fixed_user_ids));
        }

        output
    }
}

pub fn ipmi_print_user_summary(
    intf: &mut dyn IpmiIntf,
    channel_number: u8,
) -> Result<(), Box<dyn Error>> {
    let access = ipmi_get_user_access(intf, channel_number, 1).map_err(|e| {
        format!(
            "Unable to Get User Access (channel {} id 1): {}",
            channel_number, e
        )
    })?;

    let is_csv = intf.context().output_config().csv;
    println!("{}", format_user_summary(&access, is_csv));
    Ok(())
}

pub fn ipmi_print_user_list(
    intf: &mut dyn IpmiIntf,
    channel_number: u8,
) -> Result<(), Box<dyn Error>> {
    let output_config = intf.context().output_config().clone();
    let records = collect_user_records(intf, channel_number, None, IPMI_UID_MAX)?;

    let mut writer = UserListWriter::new(output_config.csv, output_config.verbose);
    for rec in records.iter().filter(|r| listable(r)) {
        print!("{}", writer.format_record(rec));
    }
    Ok(())
}

/// 设置用户名
pub fn ipmi_set_user_name(
    intf: &mut dyn IpmiIntf,
    user_id: u8,
    username: &str,
) -> Result<(), Box<dyn Error>> {
    if !(IPMI_UID_MIN..=IPMI_UID_MAX).contains(&user_id) {
        return Err(format!(
            "Invalid user ID: {}. Must be between {} and {}",
            user_id, IPMI_UID_MIN, IPMI_UID_MAX
        )
        .into());
    }

    // 最大16字节，超长在发送前拒绝
    if username.len() > 16 {
        return Err("Username is too long (> 16 bytes)".into());
    }

    debug1!("Setting username '{}' for user {}", username, user_id);

    let mut name_rec = UserName {
        user_id,
        ..Default::default()
    };
    name_rec.user_name[..username.len()].copy_from_slice(username.as_bytes());

    let mut msg_data = Vec::with_capacity(17);
    msg_data.push(ipmi_uid(user_id));
    msg_data.extend_from_slice(&name_rec.encode());

    let req = IpmiRq::app(IPMI_SET_USER_NAME, msg_data);
    match intf.sendrecv(&req) {
        Some(rsp) if rsp.fail() => Err(format!(
            "Set User Name command failed (user {}, name {}): {}",
            user_id,
            username,
            ccode_str(rsp.ccode)
        )
        .into()),
        Some(_) => Ok(()),
        None => Err(format!(
            "Set User Name command failed (user {}, name {}): no response",
            user_id, username
        )
        .into()),
    }
}

/// Submit one Set User Password request. All four operations (disable,
/// enable, set, test) go through here; the password region is 16 or 20
/// bytes, selected by the top bit of the id byte.
fn set_user_password_op(
    intf: &mut dyn IpmiIntf,
    user_id: u8,
    operation: u8,
    password: Option<&str>,
    is_twenty_byte: bool,
) -> IpmiResult<()> {
    if !(IPMI_UID_MIN..=IPMI_UID_MAX).contains(&user_id) {
        return Err(IpmiError::InvalidData(format!(
            "Invalid user ID: {}. Must be between {} and {}",
            user_id, IPMI_UID_MIN, IPMI_UID_MAX
        )));
    }

    let password_length = if is_twenty_byte { 20 } else { 16 };
    if let Some(pwd) = password {
        if pwd.len() > password_length {
            return Err(IpmiError::InvalidData(format!(
                "Password is too long (> {} bytes)",
                password_length
            )));
        }
    }

    debug1!(
        "User password operation: user={}, operation=0x{:02x}",
        user_id,
        operation
    );

    let mut data = vec![0u8; password_length + 2];
    data[0] = ipmi_uid(user_id);
    if is_twenty_byte {
        data[0] |= 0x80;
    }
    data[1] = operation & 0x03;
    if let Some(pwd) = password {
        data[2..2 + pwd.len()].copy_from_slice(pwd.as_bytes());
    }

    let req = IpmiRq::app(IPMI_SET_USER_PASSWORD, data);
    let rsp = intf.sendrecv(&req).ok_or(IpmiError::ResponseError)?;
    if rsp.fail() {
        return Err(IpmiError::CompletionCode(rsp.ccode));
    }
    Ok(())
}

fn build_password_prompt(user_id: u8) -> String {
    format!("Password for user {}: ", user_id)
}

/// 设置用户密码
pub fn ipmi_set_user_password(
    intf: &mut dyn IpmiIntf,
    user_id: u8,
    password: Option<&str>,
    is_twenty_byte: bool,
) -> Result<(), Box<dyn Error>> {
    let password = match password {
        Some(pwd) => pwd.to_string(),
        None => {
            // 交互式输入两次，不一致则重试
            loop {
                let password1 = rpassword::prompt_password(build_password_prompt(user_id))
                    .map_err(|e| format!("Failed to read password: {}", e))?;
                let password2 = rpassword::prompt_password(build_password_prompt(user_id))
                    .map_err(|e| format!("Failed to read password: {}", e))?;
                if password1 == password2 {
                    break password1;
                }
                eprintln!("Passwords do not match, try again.");
            }
        }
    };

    if password.len() > 20 {
        return Err("Password is too long (> 20 bytes)".into());
    }

    match set_user_password_op(
        intf,
        user_id,
        IPMI_PASSWORD_SET_PASSWORD,
        Some(&password),
        is_twenty_byte,
    ) {
        Ok(()) => {
            println!("Set User Password command successful (user {})", user_id);
            Ok(())
        }
        Err(e) => Err(format!(
            "Set User Password command failed (user {}): {}",
            user_id, e
        )
        .into()),
    }
}

/// 禁用用户
pub fn ipmi_user_disable(intf: &mut dyn IpmiIntf, user_id: u8) -> Result<(), Box<dyn Error>> {
    debug1!("Disabling user {}", user_id);
    set_user_password_op(intf, user_id, IPMI_PASSWORD_DISABLE_USER, None, false).map_err(|e| {
        format!("Set User Password command failed (user {}): {}", user_id, e).into()
    })
}

/// 启用用户
pub fn ipmi_user_enable(intf: &mut dyn IpmiIntf, user_id: u8) -> Result<(), Box<dyn Error>> {
    debug1!("Enabling user {}", user_id);
    set_user_password_op(intf, user_id, IPMI_PASSWORD_ENABLE_USER, None, false).map_err(|e| {
        format!("Set User Password command failed (user {}): {}", user_id, e).into()
    })
}

/// 设置用户权限
pub fn ipmi_user_set_privilege(
    intf: &mut dyn IpmiIntf,
    user_id: u8,
    privilege_level: u8,
    channel: Option<u8>,
) -> Result<(), Box<dyn Error>> {
    if !(IPMI_UID_MIN..=IPMI_UID_MAX).contains(&user_id) {
        return Err(format!(
            "Invalid user ID: {}. Must be between {} and {}",
            user_id, IPMI_UID_MIN, IPMI_UID_MAX
        )
        .into());
    }

    let channel = channel.unwrap_or(IPMI_CURRENT_CHANNEL);
    debug1!(
        "Setting privilege level {} for user {} on channel {}",
        privilege_level,
        user_id,
        channel
    );

    // change-access bit clear: only the privilege limit takes effect
    let request = UserAccessRequest {
        channel,
        user_id,
        privilege_limit: privilege_level & 0x0F,
        ..Default::default()
    };

    let req = IpmiRq::app(IPMI_SET_USER_ACCESS, request.encode().to_vec());
    match intf.sendrecv(&req) {
        Some(rsp) if rsp.fail() => Err(format!(
            "Set Privilege Level command failed (user {}): {}",
            user_id,
            ccode_str(rsp.ccode)
        )
        .into()),
        Some(_) => {
            println!("Set Privilege Level command successful (user {})", user_id);
            Ok(())
        }
        None => Err(format!(
            "Set Privilege Level command failed (user {}): no response",
            user_id
        )
        .into()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordTestOutcome {
    Correct,
    Incorrect,
    WrongSize,
    Failed(u8),
}

/// 测试用户密码
pub fn ipmi_user_test_password(
    intf: &mut dyn IpmiIntf,
    user_id: u8,
    password: Option<&str>,
    is_twenty_byte: bool,
) -> IpmiResult<PasswordTestOutcome> {
    debug1!("Testing password for user {}", user_id);

    match set_user_password_op(
        intf,
        user_id,
        IPMI_PASSWORD_TEST_PASSWORD,
        password,
        is_twenty_byte,
    ) {
        Ok(()) => Ok(PasswordTestOutcome::Correct),
        Err(IpmiError::CompletionCode(0x80)) => Ok(PasswordTestOutcome::Incorrect),
        Err(IpmiError::CompletionCode(0x81)) => Ok(PasswordTestOutcome::WrongSize),
        Err(IpmiError::CompletionCode(code)) => Ok(PasswordTestOutcome::Failed(code)),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipmi::mock::MockIntf;

    fn access_rsp(max_ids: u8, flags: u8) -> [u8; 4] {
        [max_ids, 0x40, 0x00, flags]
    }

    fn name_rsp(name: &str) -> [u8; 16] {
        let mut data = [0u8; 16];
        data[..name.len()].copy_from_slice(name.as_bytes());
        data
    }

    #[test]
    fn test_single_id_scan_is_one_fetch_pair() {
        let mut intf = MockIntf::new();
        intf.push_ok(&access_rsp(16, 0x14));
        intf.push_ok(&name_rsp("admin"));

        let records = collect_user_records(&mut intf, 1, Some(4), 16).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].access.user_id, 4);
        assert_eq!(records[0].name.name_as_string(), "admin");

        assert_eq!(intf.requests.len(), 2);
        assert_eq!(intf.requests[0].cmd, IPMI_GET_USER_ACCESS);
        assert_eq!(intf.requests[0].data, vec![0x01, 0x04]);
        assert_eq!(intf.requests[1].cmd, IPMI_GET_USER_NAME);
        assert_eq!(intf.requests[1].data, vec![0x04]);
    }

    #[test]
    fn test_full_scan_iterates_to_reported_maximum() {
        let mut intf = MockIntf::new();
        for name in ["root", "admin", ""] {
            intf.push_ok(&access_rsp(3, 0x14));
            intf.push_ok(&name_rsp(name));
        }

        let records = collect_user_records(&mut intf, 0x0E, None, IPMI_UID_MAX).unwrap();
        assert_eq!(records.len(), 3);
        let ids: Vec<u8> = records.iter().map(|r| r.access.user_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(intf.requests.len(), 6);
    }

    #[test]
    fn test_full_scan_honors_id_cap() {
        let mut intf = MockIntf::new();
        for _ in 0..16 {
            intf.push_ok(&access_rsp(32, 0x10));
            intf.push_ok(&name_rsp("u"));
        }

        // controller claims 32 ids but the narrow path stops at 16
        let records = collect_user_records(&mut intf, 2, None, 16).unwrap();
        assert_eq!(records.len(), 16);
        assert_eq!(records.last().unwrap().access.user_id, 16);
    }

    #[test]
    fn test_scan_aborts_on_mid_failure() {
        let mut intf = MockIntf::new();
        intf.push_ok(&access_rsp(4, 0x10));
        intf.push_ok(&name_rsp("root"));
        intf.push_ok(&access_rsp(4, 0x10));
        intf.push_ccode(0xd4); // name fetch for id 2 rejected

        let err = collect_user_records(&mut intf, 1, None, 16).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unable to Get User Name"));
        assert!(msg.contains("id 2"));
    }

    #[test]
    fn test_name_fetch_0xcc_is_empty_name() {
        let mut intf = MockIntf::new();
        intf.push_ccode(0xcc);
        let name = ipmi_get_user_name(&mut intf, 7).unwrap();
        assert_eq!(name.user_id, 7);
        assert_eq!(name.name_as_string(), "");
    }

    #[test]
    fn test_list_filter() {
        let named = UserRecord {
            access: UserAccess {
                user_id: 2,
                ..Default::default()
            },
            name: UserName::decode(2, &name_rsp("root")).unwrap(),
        };
        let empty = UserRecord {
            access: UserAccess {
                user_id: 5,
                ..Default::default()
            },
            name: UserName::default(),
        };
        let link_only = UserRecord {
            access: UserAccess {
                user_id: 6,
                link_auth: 0x20,
                ..Default::default()
            },
            name: UserName::default(),
        };
        assert!(listable(&named));
        assert!(!listable(&empty));
        assert!(listable(&link_only));
    }

    #[test]
    fn test_list_writer_prints_header_once() {
        let rec = UserRecord {
            access: UserAccess {
                user_id: 1,
                ipmi_messaging: 0x10,
                privilege_limit: 4,
                ..Default::default()
            },
            name: UserName::decode(1, &name_rsp("admin")).unwrap(),
        };
        let mut writer = UserListWriter::new(false, 0);
        let first = writer.format_record(&rec);
        let second = writer.format_record(&rec);
        assert!(first.starts_with("ID  Name"));
        assert!(!second.starts_with("ID  Name"));
        assert!(second.contains("admin"));
        assert!(second.contains("ADMINISTRATOR"));
    }

    #[test]
    fn test_list_writer_csv() {
        let rec = UserRecord {
            access: UserAccess {
                user_id: 3,
                callin_callback: 0x40,
                link_auth: 0x20,
                privilege_limit: 3,
                ..Default::default()
            },
            name: UserName::decode(3, &name_rsp("op")).unwrap(),
        };
        let mut writer = UserListWriter::new(true, 0);
        assert_eq!(writer.format_record(&rec), "3,op,false,true,false,OPERATOR\n");
    }

    #[test]
    fn test_set_user_name_too_long_sends_nothing() {
        let mut intf = MockIntf::new();
        let err =
            ipmi_set_user_name(&mut intf, 2, "a-name-longer-than-16-bytes").unwrap_err();
        assert!(err.to_string().contains("too long"));
        assert!(intf.requests.is_empty());
    }

    #[test]
    fn test_set_user_name_request_layout() {
        let mut intf = MockIntf::new();
        intf.push_ok(&[]);
        ipmi_set_user_name(&mut intf, 2, "root").unwrap();

        assert_eq!(intf.requests.len(), 1);
        let req = &intf.requests[0];
        assert_eq!(req.cmd, IPMI_SET_USER_NAME);
        assert_eq!(req.data.len(), 17);
        assert_eq!(req.data[0], 2);
        assert_eq!(&req.data[1..5], b"root");
        assert!(req.data[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_password_op_sixteen_byte_layout() {
        let mut intf = MockIntf::new();
        intf.push_ok(&[]);
        set_user_password_op(&mut intf, 3, IPMI_PASSWORD_SET_PASSWORD, Some("secret"), false)
            .unwrap();

        let req = &intf.requests[0];
        assert_eq!(req.cmd, IPMI_SET_USER_PASSWORD);
        assert_eq!(req.data.len(), 18);
        assert_eq!(req.data[0], 3);
        assert_eq!(req.data[1], IPMI_PASSWORD_SET_PASSWORD);
        assert_eq!(&req.data[2..8], b"secret");
        assert!(req.data[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_password_op_twenty_byte_flag() {
        let mut intf = MockIntf::new();
        intf.push_ok(&[]);
        set_user_password_op(&mut intf, 3, IPMI_PASSWORD_TEST_PASSWORD, Some("pw"), true)
            .unwrap();

        let req = &intf.requests[0];
        assert_eq!(req.data.len(), 22);
        assert_eq!(req.data[0], 0x80 | 3);
        assert_eq!(req.data[1], IPMI_PASSWORD_TEST_PASSWORD);
    }

    #[test]
    fn test_disable_and_enable_operation_codes() {
        let mut intf = MockIntf::new();
        intf.push_ok(&[]);
        intf.push_ok(&[]);
        ipmi_user_disable(&mut intf, 5).unwrap();
        ipmi_user_enable(&mut intf, 5).unwrap();

        assert_eq!(intf.requests[0].data[1], IPMI_PASSWORD_DISABLE_USER);
        assert_eq!(intf.requests[1].data[1], IPMI_PASSWORD_ENABLE_USER);
        // disable/enable always use the 16-byte form
        assert_eq!(intf.requests[0].data.len(), 18);
    }

    #[test]
    fn test_password_too_long_for_region() {
        let mut intf = MockIntf::new();
        let err = set_user_password_op(
            &mut intf,
            3,
            IPMI_PASSWORD_SET_PASSWORD,
            Some("seventeen-chars!!"),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("too long"));
        assert!(intf.requests.is_empty());
    }

    #[test]
    fn test_test_password_outcome_mapping() {
        let cases = [
            (None, PasswordTestOutcome::Correct),
            (Some(0x80), PasswordTestOutcome::Incorrect),
            (Some(0x81), PasswordTestOutcome::WrongSize),
            (Some(0xc1), PasswordTestOutcome::Failed(0xc1)),
        ];
        for (ccode, expected) in cases {
            let mut intf = MockIntf::new();
            match ccode {
                None => intf.push_ok(&[]),
                Some(cc) => intf.push_ccode(cc),
            }
            let outcome =
                ipmi_user_test_password(&mut intf, 2, Some("pw"), false).unwrap();
            assert_eq!(outcome, expected);
        }
    }

    #[test]
    fn test_test_password_transport_failure_is_error() {
        let mut intf = MockIntf::new();
        intf.push_none();
        assert!(ipmi_user_test_password(&mut intf, 2, Some("pw"), false).is_err());
    }

    #[test]
    fn test_set_privilege_request_layout() {
        let mut intf = MockIntf::new();
        intf.push_ok(&[]);
        ipmi_user_set_privilege(&mut intf, 2, 4, Some(1)).unwrap();

        let req = &intf.requests[0];
        assert_eq!(req.cmd, IPMI_SET_USER_ACCESS);
        assert_eq!(req.data, vec![0x01, 0x02, 0x04, 0x00]);
    }

    #[test]
    fn test_parse_privilege_level() {
        assert_eq!(parse_privilege_level("4").unwrap(), 4);
        assert_eq!(parse_privilege_level("0xF").unwrap(), 15);
        assert_eq!(parse_privilege_level("0x5").unwrap(), 5);
        assert!(parse_privilege_level("0").is_err());
        assert!(parse_privilege_level("6").is_err());
        assert!(parse_privilege_level("banana").is_err());
    }

    #[test]
    fn test_parse_password_format() {
        assert_eq!(parse_password_format("16").unwrap(), 16);
        assert_eq!(parse_password_format("20").unwrap(), 20);
        assert!(parse_password_format("17").is_err());
    }
}
