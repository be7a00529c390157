/*
 * SPDX-FileCopyrightText: 2025 UnionTech Software Technology Co., Ltd.
 *
 * SPDX-License-Identifier: GPL-2.0-or-later
 */

/// 输出格式上下文 - 控制命令输出的格式和详细程度
#[derive(Clone, Debug, Default)]
pub struct OutputContext {
    /// 是否使用CSV格式输出
    pub csv: bool,
    /// 详细输出级别
    pub verbose: u8,
}

impl OutputContext {
    pub fn new(csv: bool, verbose: u8) -> Self {
        Self { csv, verbose }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0
    }
}

/// 基础IPMI上下文
#[derive(Clone, Debug, Default)]
pub struct IpmiBaseContext {
    /// 本地IPMB地址
    pub my_addr: u32,
}

/// 完整的IPMI上下文 - 接口持有，命令层只读输出配置
#[derive(Clone, Debug, Default)]
pub struct IpmiContext {
    pub base: IpmiBaseContext,
    pub output: OutputContext,
}

impl IpmiContext {
    pub fn new(my_addr: u32, output: OutputContext) -> Self {
        Self {
            base: IpmiBaseContext { my_addr },
            output,
        }
    }

    pub fn my_addr(&self) -> u32 {
        self.base.my_addr
    }

    pub fn set_my_addr(&mut self, addr: u32) {
        self.base.my_addr = addr;
    }

    pub fn output_config(&self) -> &OutputContext {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_creation() {
        let ctx = IpmiContext::new(0x20, OutputContext::new(true, 2));
        assert_eq!(ctx.my_addr(), 0x20);
        assert!(ctx.output_config().csv);
        assert!(ctx.output_config().is_verbose());
    }
}
