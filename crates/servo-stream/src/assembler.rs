use crate::sampler::parse_angle;

/// Accumulates raw device bytes and yields decoded angle records.
///
/// At most one decoded angle is returned per [`feed`](Self::feed) call:
/// records that fail to decode are discarded and scanning continues within
/// the same call, but the first successful decode returns immediately.
/// Later complete records stay buffered so samples surface in arrival order
/// across ticks, one per tick. A trailing partial record is retained and
/// prefixed to the next chunk.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: String,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and try to extract the next decodable record.
    pub fn feed(&mut self, bytes: &[u8]) -> Option<f64> {
        self.buf.push_str(&String::from_utf8_lossy(bytes));
        while let Some(pos) = self.buf.find('\n') {
            let record: String = self.buf.drain(..=pos).collect();
            if let Some(angle) = parse_angle(record.trim_end_matches('\n')) {
                return Some(angle);
            }
        }
        None
    }

    /// Buffered text not yet terminated by a record separator.
    pub fn pending(&self) -> &str {
        &self.buf
    }
}
