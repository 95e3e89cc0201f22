/// NETCONF 帧编解码器
///
/// RFC 6242 定义两种分帧方式：
/// - base:1.0 以 `]]>]]>` 结尾 (hello 阶段始终使用)
/// - base:1.1 分块：`\n#<size>\n<data>` 若干块，以 `\n##\n` 结束

use crate::shared::error::DeviceError;
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// base:1.0 消息结束标记
pub const END_OF_MESSAGE: &[u8] = b"]]>]]>";

/// RFC 6242 允许的最大块长度
const MAX_CHUNK_SIZE: u64 = 4_294_967_295;

/// 分帧方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    EndOfMessage,
    Chunked,
}

/// NETCONF编解码器
///
/// 初始为 `]]>]]>` 分帧，双方都声明 base:1.1 后切换为分块分帧
pub struct NetconfCodec {
    framing: Framing,
    max_message_len: usize,
}

impl NetconfCodec {
    pub fn new() -> Self {
        Self {
            framing: Framing::EndOfMessage,
            max_message_len: 16 * 1024 * 1024, // 16MB默认上限
        }
    }

    pub fn with_max_message_len(max_message_len: usize) -> Self {
        Self {
            framing: Framing::EndOfMessage,
            max_message_len,
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn set_framing(&mut self, framing: Framing) {
        self.framing = framing;
    }

    fn decode_end_of_message(&mut self, src: &mut BytesMut) -> Result<Option<String>, CodecError> {
        let Some(pos) = src.windows(END_OF_MESSAGE.len()).position(|w| w == END_OF_MESSAGE) else {
            if src.len() > self.max_message_len {
                return Err(CodecError::MessageTooLarge {
                    len: src.len(),
                    max: self.max_message_len,
                });
            }
            return Ok(None); // 需要更多数据
        };

        let frame = src.split_to(pos);
        src.advance(END_OF_MESSAGE.len());

        let text = String::from_utf8(frame.to_vec()).map_err(|_| CodecError::InvalidUtf8)?;
        Ok(Some(text.trim().to_string()))
    }

    fn decode_chunked(&mut self, src: &mut BytesMut) -> Result<Option<String>, CodecError> {
        let mut pos = 0;
        let mut body = Vec::new();

        loop {
            // 块头 "\n#"
            if src.len() < pos + 3 {
                return Ok(None);
            }
            if src[pos] != b'\n' || src[pos + 1] != b'#' {
                return Err(CodecError::InvalidChunkHeader(format!(
                    "expected LF '#' at offset {}",
                    pos
                )));
            }

            // 结束标记 "\n##\n"
            if src[pos + 2] == b'#' {
                if src.len() < pos + 4 {
                    return Ok(None);
                }
                if src[pos + 3] != b'\n' {
                    return Err(CodecError::InvalidChunkHeader(
                        "end-of-chunks marker not followed by LF".to_string(),
                    ));
                }
                src.advance(pos + 4);
                let text = String::from_utf8(body).map_err(|_| CodecError::InvalidUtf8)?;
                return Ok(Some(text));
            }

            let digits_start = pos + 2;
            let mut cursor = digits_start;
            while cursor < src.len() && src[cursor].is_ascii_digit() {
                cursor += 1;
                if cursor - digits_start > 10 {
                    return Err(CodecError::InvalidChunkHeader(
                        "chunk size has too many digits".to_string(),
                    ));
                }
            }
            if cursor == src.len() {
                return Ok(None);
            }
            if cursor == digits_start || src[cursor] != b'\n' {
                return Err(CodecError::InvalidChunkHeader(
                    "chunk size must be digits followed by LF".to_string(),
                ));
            }

            let digits = std::str::from_utf8(&src[digits_start..cursor])
                .map_err(|_| CodecError::InvalidChunkHeader("non-ascii chunk size".to_string()))?;
            let size: usize = digits
                .parse()
                .map_err(|_| CodecError::InvalidChunkHeader(format!("bad chunk size '{}'", digits)))?;
            if size == 0 || size as u64 > MAX_CHUNK_SIZE {
                return Err(CodecError::InvalidChunkHeader(format!(
                    "chunk size {} out of range",
                    size
                )));
            }
            if body.len() + size > self.max_message_len {
                return Err(CodecError::MessageTooLarge {
                    len: body.len() + size,
                    max: self.max_message_len,
                });
            }

            let data_start = cursor + 1;
            if src.len() < data_start + size {
                return Ok(None);
            }
            body.extend_from_slice(&src[data_start..data_start + size]);
            pos = data_start + size;
        }
    }
}

impl Default for NetconfCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for NetconfCodec {
    type Item = String;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.framing {
            Framing::EndOfMessage => self.decode_end_of_message(src),
            Framing::Chunked => self.decode_chunked(src),
        }
    }
}

impl Encoder<String> for NetconfCodec {
    type Error = CodecError;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() > self.max_message_len {
            return Err(CodecError::MessageTooLarge {
                len: item.len(),
                max: self.max_message_len,
            });
        }

        match self.framing {
            Framing::EndOfMessage => {
                dst.reserve(item.len() + END_OF_MESSAGE.len());
                dst.put_slice(item.as_bytes());
                dst.put_slice(END_OF_MESSAGE);
            }
            Framing::Chunked => {
                let header = format!("\n#{}\n", item.len());
                dst.reserve(header.len() + item.len() + 4);
                dst.put_slice(header.as_bytes());
                dst.put_slice(item.as_bytes());
                dst.put_slice(b"\n##\n");
            }
        }
        Ok(())
    }
}

/// 编解码错误
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Message too large: {len} bytes (max: {max})")]
    MessageTooLarge { len: usize, max: usize },

    #[error("Invalid chunk header: {0}")]
    InvalidChunkHeader(String),

    #[error("Message is not valid UTF-8")]
    InvalidUtf8,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CodecError> for DeviceError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => DeviceError::Transport(e.to_string()),
            other => DeviceError::Transport(format!("malformed NETCONF frame: {}", other)),
        }
    }
}
