//! Chunk-to-line splitting for producer output.

/// Accumulates raw output chunks and yields complete lines.
///
/// Splitting happens on bytes, so a UTF-8 sequence cut across two reads is
/// decoded only once the whole line is present. Invalid UTF-8 is replaced
/// rather than rejected.
#[derive(Debug, Default)]
pub struct LineSplitter {
    remainder: Vec<u8>,
}

impl LineSplitter {
    pub const fn new() -> Self {
        Self {
            remainder: Vec::new(),
        }
    }

    /// Feed a chunk and return every line it completes, without terminators.
    ///
    /// Both `\n` and `\r\n` end a line. Anything after the last newline is
    /// kept for the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.remainder.extend_from_slice(chunk);

        let Some(last_newline) = self.remainder.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.remainder.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.remainder, rest);

        complete[..last_newline]
            .split(|&b| b == b'\n')
            .map(|line| {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                String::from_utf8_lossy(line).into_owned()
            })
            .collect()
    }

    /// Drop any partial line.
    pub fn clear(&mut self) {
        self.remainder.clear();
    }

    /// Bytes held back waiting for a newline.
    pub fn pending(&self) -> usize {
        self.remainder.len()
    }
}
