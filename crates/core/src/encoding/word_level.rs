//! Rank-ordered BPE over a single pre-tokenized word.
//!
//! The word is split into characters and the last one carries the `</w>`
//! end-of-word marker. Adjacent pairs are merged lowest rank first until no
//! known pair remains.

use crate::core::MergeRanks;
use crate::error::{NodeError, Result};
use compact_str::CompactString;

/// End-of-word marker appended to the final symbol of every word.
pub const END_OF_WORD: &str = "</w>";

/// Split `word` into subword symbols using `ranks`.
///
/// Fails with [`NodeError::EmptyToken`] on an empty word.
pub fn bpe_merge(word: &str, ranks: &MergeRanks) -> Result<Vec<CompactString>> {
    let mut symbols: Vec<CompactString> = word
        .chars()
        .map(|ch| {
            let mut buf = [0u8; 4];
            CompactString::new(ch.encode_utf8(&mut buf))
        })
        .collect();

    match symbols.last_mut() {
        None => return Err(NodeError::EmptyToken),
        Some(last) => last.push_str(END_OF_WORD),
    }

    while symbols.len() > 1 {
        // Lowest-ranked adjacent pair; ties cannot happen since a pair has one rank
        let best = symbols
            .windows(2)
            .filter_map(|pair| ranks.rank(&pair[0], &pair[1]).map(|rank| (rank, pair)))
            .min_by_key(|&(rank, _)| rank)
            .map(|(_, pair)| (pair[0].clone(), pair[1].clone()));

        let Some((first, second)) = best else {
            break;
        };

        symbols = merge_pair(symbols, &first, &second);
    }

    Ok(symbols)
}

/// Replace every occurrence of `first second` scanning left to right.
fn merge_pair(
    symbols: Vec<CompactString>,
    first: &CompactString,
    second: &CompactString,
) -> Vec<CompactString> {
    let mut merged = Vec::with_capacity(symbols.len());
    let mut iter = symbols.into_iter().peekable();

    while let Some(symbol) = iter.next() {
        if &symbol == first && iter.peek() == Some(second) {
            iter.next();
            let mut joined = symbol;
            joined.push_str(second);
            merged.push(joined);
        } else {
            merged.push(symbol);
        }
    }

    merged
}
