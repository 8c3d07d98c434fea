//! Byte stream → protocol lines.

use crate::{errors::Error, Result};

/// Incremental line framer for a possibly partial byte stream.
///
/// Text that has not yet seen a `\n` is kept across pushes. A multi-byte
/// UTF-8 sequence split between two chunks is carried over, while a chunk with
/// an invalid sequence is dropped whole without disturbing buffered text.
#[derive(Debug, Default)]
pub struct LineFramer {
    text: String,
    carry: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; returns the lines it completed.
    ///
    /// On `Err(Error::Undecodable)` the chunk has been discarded and the framer
    /// is ready for the next push.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>> {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(chunk);

        match std::str::from_utf8(&bytes) {
            Ok(s) => self.text.push_str(s),
            Err(e) if e.error_len().is_none() => {
                // Valid up to an incomplete sequence at the very end.
                let (valid, tail) = bytes.split_at(e.valid_up_to());
                self.text.push_str(std::str::from_utf8(valid).unwrap_or_default());
                self.carry = tail.to_vec();
            }
            Err(_) => return Err(Error::Undecodable { len: chunk.len() }),
        }

        Ok(self.drain_lines())
    }

    /// Bytes of an unterminated trailing fragment still buffered.
    pub fn pending(&self) -> usize {
        self.text.len() + self.carry.len()
    }

    fn drain_lines(&mut self) -> Vec<String> {
        let Some(last_newline) = self.text.rfind('\n') else {
            return Vec::new();
        };

        let rest = self.text.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.text, rest);

        complete
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}
