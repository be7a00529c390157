/*
 * SPDX-FileCopyrightText: 2025 UnionTech Software Technology Co., Ltd.
 *
 * SPDX-License-Identifier: GPL-2.0-or-later
 */
mod cli;

use clap::Parser;
use cli::{Cli, InterfaceType, MainCommand};
use std::sync::atomic::Ordering;

use bmcaccess::commands::channel::{ipmi_channel_main, show_channel_commands_help};
use bmcaccess::commands::user::{self, ipmi_user_main};
use bmcaccess::interface::open::OpenIntf;
use bmcaccess::ipmi::context::{IpmiContext, OutputContext};
use bmcaccess::ipmi::intf::IpmiIntf;
use bmcaccess::ipmi::ipmi::IPMI_BMC_SLAVE_ADDR;
use bmcaccess::logging;
use bmcaccess::VERBOSE_LEVEL;

fn main() {
    let input: Vec<String> = std::env::args().collect();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // 用户/通道命令缺少参数时显示ipmitool风格的帮助
            if input.len() >= 2 && input[1] == "user" {
                match err.kind() {
                    clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                        if input.len() == 2 =>
                    {
                        user::show_user_commands_help();
                        return;
                    }
                    clap::error::ErrorKind::InvalidSubcommand if input.len() >= 3 => {
                        println!("Invalid user command: '{}'", input[2]);
                        println!();
                        user::show_user_commands_help_impl(false);
                        return;
                    }
                    _ => {}
                }
            }
            if input.len() >= 2 && input[1] == "channel" {
                match err.kind() {
                    clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                        if input.len() == 2 =>
                    {
                        show_channel_commands_help();
                        return;
                    }
                    clap::error::ErrorKind::InvalidSubcommand if input.len() >= 3 => {
                        println!("Invalid CHANNEL command: {}", input[2]);
                        show_channel_commands_help();
                        return;
                    }
                    _ => {}
                }
            }
            err.exit();
        }
    };

    logging::setup_logger(cli.global.verbose);
    VERBOSE_LEVEL.store(cli.global.verbose as usize, Ordering::Relaxed);

    // priv参数不全时只显示帮助，不打开设备
    if let MainCommand::User {
        subcmd:
            user::UserCommand::Priv {
                user_id, privilege, ..
            },
    } = &cli.command
    {
        if user_id.is_none() || privilege.is_none() {
            user::show_user_commands_help_impl(false);
            return;
        }
    }

    let my_addr = if cli.global.arg_addr != 0 {
        cli.global.arg_addr as u32
    } else {
        IPMI_BMC_SLAVE_ADDR
    };
    let ctx = IpmiContext::new(
        my_addr,
        OutputContext::new(cli.global.csv_output, cli.global.verbose),
    );

    let mut intf: Box<dyn IpmiIntf> = match cli.global.interface {
        InterfaceType::Open => Box::new(OpenIntf::new(cli.global.devnum, ctx)),
    };

    if let Err(e) = intf.setup() {
        eprintln!("Unable to setup interface: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = intf.open() {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        MainCommand::Channel { subcmd } => ipmi_channel_main(subcmd, intf),
        MainCommand::User { subcmd } => ipmi_user_main(subcmd, intf),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
