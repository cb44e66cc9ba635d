//! Block container: splits large inputs on word boundaries, transforms every block
//! independently (optionally in parallel) and frames the result.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! magic "TXC1" | escape1 u8 | escape2 u8 | flags u8 | log_hash_size u8
//! | dict_size - 1 u16 | dictionary fingerprint u32 | block count u32
//! then per block: skip flags u8 | raw length u32 | payload length u32 | payload
//! ```
//!
//! Blocks that did not shrink are stored raw with every skip flag set.

use std::sync::Arc;

use log::{debug, trace};
use rayon::prelude::*;

use crate::config::TextCodecConfig;
use crate::dictionary_lib::dict_entry::MAX_WORD_LENGTH;
use crate::dictionary_lib::{WordList, DEFAULT_WORD_LIST};
use crate::error::{Result, TextCodecError};
use crate::transform_sequence::{ByteTransformSequence, TRANSFORM_SKIP_MASK};
use crate::utils::find_delimiter_boundary;
use crate::TextCodec;

pub const MAGIC: &[u8; 4] = b"TXC1";
pub const DEFAULT_BLOCK_SIZE: usize = 1 << 20;
pub const HEADER_LEN: usize = 18;
const FLAG_CASE_FOLDING: u8 = 0x01;

/// Outcome of one [`BlockCodec::encode`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlockStats {
    pub blocks: usize,
    /// Blocks stored transformed; the others are stored raw.
    pub transformed: usize,
}

pub struct BlockCodec {
    config: TextCodecConfig,
    words: Arc<WordList>,
    block_size: usize,
    is_parallel: bool,
}

impl BlockCodec {
    pub fn new(config: TextCodecConfig, words: Arc<WordList>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            words,
            block_size: DEFAULT_BLOCK_SIZE,
            is_parallel: true,
        })
    }

    pub fn set_block_size(&mut self, block_size: usize) -> Result<()> {
        if block_size == 0 || block_size > u32::MAX as usize {
            return Err(TextCodecError::InvalidConfig(format!(
                "block size must be in 1..={}, got {}",
                u32::MAX,
                block_size
            )));
        }
        self.block_size = block_size;
        Ok(())
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn set_parallel(&mut self, is_parallel: bool) {
        self.is_parallel = is_parallel;
    }

    pub fn get_parallel(&self) -> bool {
        self.is_parallel
    }

    pub fn config(&self) -> &TextCodecConfig {
        &self.config
    }

    fn new_sequence(&self) -> ByteTransformSequence {
        ByteTransformSequence::single(Box::new(TextCodec::build(
            Arc::clone(&self.words),
            self.config,
        )))
    }

    fn split_blocks<'a>(&self, src: &'a [u8]) -> Vec<&'a [u8]> {
        let mut blocks = Vec::with_capacity(src.len() / self.block_size + 1);
        let mut rest = src;
        while !rest.is_empty() {
            let cut = find_delimiter_boundary(rest, self.block_size);
            let (block, tail) = rest.split_at(cut);
            blocks.push(block);
            rest = tail;
        }
        blocks
    }

    pub fn encode(&self, src: &[u8]) -> Result<Vec<u8>> {
        self.encode_with_stats(src).map(|(data, _)| data)
    }

    pub fn encode_with_stats(&self, src: &[u8]) -> Result<(Vec<u8>, BlockStats)> {
        let blocks = self.split_blocks(src);
        let count = u32::try_from(blocks.len())
            .map_err(|_| TextCodecError::Container(format!("too many blocks ({})", blocks.len())))?;

        let encoded: Vec<(u8, Vec<u8>)> = if self.is_parallel {
            blocks
                .par_iter()
                .map_init(|| self.new_sequence(), |seq, block| encode_block(seq, block))
                .collect()
        } else {
            let mut seq = self.new_sequence();
            blocks.iter().map(|block| encode_block(&mut seq, block)).collect()
        };

        let payload: usize = encoded.iter().map(|(_, p)| p.len() + 9).sum();
        let mut out = Vec::with_capacity(HEADER_LEN + payload);
        self.write_header(&mut out, count);

        let mut stats = BlockStats {
            blocks: blocks.len(),
            transformed: 0,
        };
        for (block, (flags, data)) in blocks.iter().zip(&encoded) {
            if *flags != TRANSFORM_SKIP_MASK {
                stats.transformed += 1;
            }
            out.push(*flags);
            out.extend_from_slice(&(block.len() as u32).to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(data);
        }

        debug!(
            "encoded {} bytes into {} bytes ({} of {} blocks transformed)",
            src.len(),
            out.len(),
            stats.transformed,
            stats.blocks
        );
        Ok((out, stats))
    }

    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut reader = Reader::new(data);
        let count = self.read_header(&mut reader)?;

        let mut records = Vec::with_capacity(count.min(data.len() / 9));
        let mut total = 0usize;
        for i in 0..count {
            let flags = reader.u8()?;
            let raw_len = reader.u32()? as usize;
            let payload_len = reader.u32()? as usize;
            let payload = reader.take(payload_len)?;

            if flags & !TRANSFORM_SKIP_MASK != 0 {
                return Err(TextCodecError::Container(format!(
                    "block {}: invalid skip flags {:#04x}",
                    i, flags
                )));
            }
            let consistent = if flags == TRANSFORM_SKIP_MASK {
                raw_len == payload_len
            } else {
                // A 2-byte reference expands to at most MAX_WORD_LENGTH bytes.
                raw_len <= payload_len.saturating_mul(MAX_WORD_LENGTH / 2)
            };
            if !consistent {
                return Err(TextCodecError::Container(format!(
                    "block {}: raw length {} does not fit payload length {}",
                    i, raw_len, payload_len
                )));
            }
            total += raw_len;
            records.push((flags, raw_len, payload));
        }
        if !reader.is_empty() {
            return Err(TextCodecError::Container(format!(
                "{} trailing bytes after the last block",
                reader.remaining()
            )));
        }

        let decoded: Vec<Vec<u8>> = if self.is_parallel {
            records
                .par_iter()
                .map_init(|| self.new_sequence(), |seq, record| decode_block(seq, record))
                .collect::<Result<_>>()?
        } else {
            let mut seq = self.new_sequence();
            records
                .iter()
                .map(|record| decode_block(&mut seq, record))
                .collect::<Result<_>>()?
        };

        let mut out = Vec::with_capacity(total);
        for block in decoded {
            out.extend_from_slice(&block);
        }
        debug!("decoded {} blocks into {} bytes", count, out.len());
        Ok(out)
    }

    fn write_header(&self, out: &mut Vec<u8>, block_count: u32) {
        out.extend_from_slice(MAGIC);
        out.push(self.config.escape1);
        out.push(self.config.escape2);
        out.push(if self.config.case_folding { FLAG_CASE_FOLDING } else { 0 });
        out.push(self.config.log_hash_size as u8);
        out.extend_from_slice(&((self.config.dict_size - 1) as u16).to_le_bytes());
        out.extend_from_slice(&self.words.fingerprint().to_le_bytes());
        out.extend_from_slice(&block_count.to_le_bytes());
    }

    fn read_header(&self, reader: &mut Reader<'_>) -> Result<usize> {
        if reader.take(MAGIC.len())? != MAGIC {
            return Err(TextCodecError::Container("bad magic".to_string()));
        }
        let escape1 = reader.u8()?;
        let escape2 = reader.u8()?;
        let flags = reader.u8()?;
        let log_hash_size = reader.u8()? as u32;
        let dict_size = reader.u16()? as usize + 1;
        let fingerprint = reader.u32()?;
        let count = reader.u32()? as usize;

        if flags & !FLAG_CASE_FOLDING != 0 {
            return Err(TextCodecError::Container(format!("unknown header flags {:#04x}", flags)));
        }
        let cfg = &self.config;
        let mismatch = |what: &str| {
            Err(TextCodecError::Container(format!(
                "{} differs from the decoder configuration",
                what
            )))
        };
        if (escape1, escape2) != (cfg.escape1, cfg.escape2) {
            return mismatch("escape bytes");
        }
        if (flags & FLAG_CASE_FOLDING != 0) != cfg.case_folding {
            return mismatch("case folding");
        }
        if log_hash_size != cfg.log_hash_size {
            return mismatch("hash table size");
        }
        if dict_size != cfg.dict_size {
            return mismatch("dictionary size");
        }
        if fingerprint != self.words.fingerprint() {
            return mismatch("static word list");
        }
        Ok(count)
    }
}

impl Default for BlockCodec {
    fn default() -> Self {
        Self {
            config: TextCodecConfig::default(),
            words: Arc::clone(&DEFAULT_WORD_LIST),
            block_size: DEFAULT_BLOCK_SIZE,
            is_parallel: true,
        }
    }
}

fn encode_block(seq: &mut ByteTransformSequence, block: &[u8]) -> (u8, Vec<u8>) {
    let mut dst = vec![0u8; seq.max_encoded_len(block.len())];
    match seq.forward(block, &mut dst) {
        Ok(n) => {
            dst.truncate(n);
            (seq.skip_flags(), dst)
        }
        Err(err) => {
            trace!("block of {} bytes stored raw: {}", block.len(), err);
            (TRANSFORM_SKIP_MASK, block.to_vec())
        }
    }
}

fn decode_block(seq: &mut ByteTransformSequence, record: &(u8, usize, &[u8])) -> Result<Vec<u8>> {
    let &(flags, raw_len, payload) = record;
    seq.set_skip_flags(flags)?;
    let mut dst = vec![0u8; raw_len];
    let n = seq.inverse(payload, &mut dst, raw_len)?;
    if n != raw_len {
        return Err(TextCodecError::Container(format!(
            "block decoded to {} bytes, expected {}",
            n, raw_len
        )));
    }
    Ok(dst)
}

/// Bounds-checked little-endian reader over the container bytes.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                TextCodecError::Container(format!("truncated container at offset {}", self.pos))
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
