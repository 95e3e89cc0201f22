/// 基于提示符的交互式读写
///
/// 设备打印提示符即表示命令执行完毕。提示符是最后一行、以 `#` 或 `>` 结尾、
/// 且不含空白，例如 `RP/0/RP0/CPU0:ios(config-if)#`。

use crate::infrastructure::ssh::ByteStream;
use crate::shared::error::DeviceError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const READ_CHUNK: usize = 4096;

/// 单条命令输出上限
const MAX_OUTPUT: usize = 4 * 1024 * 1024;

const MAX_PROMPT_LEN: usize = 128;

/// 提示符行加上少量首尾空白
const PROMPT_WINDOW: usize = MAX_PROMPT_LEN + 16;

pub struct PromptStream {
    stream: Box<dyn ByteStream>,
    pending: Vec<u8>,
}

impl PromptStream {
    pub fn new(stream: Box<dyn ByteStream>) -> Self {
        Self {
            stream,
            pending: Vec::with_capacity(READ_CHUNK),
        }
    }

    /// 读取直到出现提示符，返回包含提示符在内的全部文本
    pub async fn read_until_prompt(&mut self) -> Result<String, DeviceError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if ends_with_prompt(&self.pending) {
                let text = String::from_utf8_lossy(&self.pending).replace('\r', "");
                self.pending.clear();
                return Ok(text);
            }

            if self.pending.len() > MAX_OUTPUT {
                return Err(DeviceError::Transport(format!(
                    "device output exceeded {} bytes without a prompt",
                    MAX_OUTPUT
                )));
            }

            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(DeviceError::Transport(
                    "session closed by device before prompt".to_string(),
                ));
            }
            self.pending.extend_from_slice(&chunk[..n]);
        }
    }

    /// 发送命令并返回其输出
    pub async fn execute(&mut self, command: &str) -> Result<String, DeviceError> {
        self.stream.write_all(command.as_bytes()).await?;
        self.stream.write_all(b"\n").await?;
        self.stream.flush().await?;

        let raw = self.read_until_prompt().await?;
        Ok(strip_echo_and_prompt(command, &raw))
    }

    pub async fn shutdown(&mut self) -> Result<(), DeviceError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

fn is_prompt(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty()
        && line.len() <= MAX_PROMPT_LEN
        && (line.ends_with('#') || line.ends_with('>'))
        && !line.contains(char::is_whitespace)
}

/// 只检查缓冲区末尾一个窗口，不随累计输出增长
fn ends_with_prompt(buf: &[u8]) -> bool {
    let window_start = buf.len().saturating_sub(PROMPT_WINDOW);
    let window = &buf[window_start..];
    let last_line = match window.iter().rposition(|&b| b == b'\n') {
        Some(i) => &window[i + 1..],
        None if window_start == 0 => window,
        None => return false,
    };
    is_prompt(&String::from_utf8_lossy(last_line))
}

/// 去掉首行命令回显与末行提示符
fn strip_echo_and_prompt(command: &str, raw: &str) -> String {
    let mut lines: Vec<&str> = raw.lines().collect();

    if lines.last().is_some_and(|line| is_prompt(line)) {
        lines.pop();
    }
    if lines
        .first()
        .is_some_and(|line| line.trim_end().ends_with(command.trim()))
    {
        lines.remove(0);
    }

    lines.join("\n")
}
