/*
 * SPDX-FileCopyrightText: 2025 UnionTech Software Technology Co., Ltd.
 *
 * SPDX-License-Identifier: GPL-2.0-or-later
 */
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use bmcaccess::commands::channel::ChannelCommand;
use bmcaccess::commands::user::UserCommand;

// 核心接口类型枚举
#[derive(ValueEnum, Clone, Debug)]
pub enum InterfaceType {
    #[clap(name = "open")]
    Open,
}

#[derive(Parser, Debug)]
#[command(
    name = "bmcaccess",
    version,
    about = "IPMI channel and user administration utility",
    max_term_width = 100
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: MainCommand,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    #[arg(short = 'v', action = ArgAction::Count, help = "Verbose (can use multiple times)")]
    pub verbose: u8,

    #[arg(short = 'c', long)]
    pub csv_output: bool,

    // 设备接口参数
    #[arg(short = 'I', long, default_value = "open")]
    pub interface: InterfaceType,
    #[arg(short = 'd', default_value_t = 0)]
    pub devnum: u8,

    #[arg(short = 'm', long, default_value_t = 0)]
    pub arg_addr: u8,
}

#[derive(Subcommand, Debug)]
pub enum MainCommand {
    /// Channel management
    Channel {
        #[command(subcommand)]
        subcmd: ChannelCommand,
    },

    /// User management
    User {
        #[command(subcommand)]
        subcmd: UserCommand,
    },
}
