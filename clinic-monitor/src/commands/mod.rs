/// 面板命令模块
///
/// 包含监控面板和各页面可调用的命令:
/// - log_commands: 日志写入、阈值修改、日志查询
/// - metrics_commands: 指标读取与清零
/// - activity_commands: 页面访问记录与审计查询

pub mod activity_commands;
pub mod log_commands;
pub mod metrics_commands;
