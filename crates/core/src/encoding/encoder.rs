//! Applying learned merge rules to new text.
//!
//! Each whitespace-separated word is split into `[▁] + chars`, characters
//! outside the alphabet collapse into a single unknown symbol per run, and
//! merges are applied lowest rank first until no adjacent pair has a rule.

use crate::core::merges::Pair;
use crate::core::vocab::Vocabulary;
use crate::error::{Result, TokenizerError};
use dary_heap::OctonaryHeap;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Representation of encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputType {
    /// Integer symbol ids
    #[default]
    Id,
    /// Symbol strings
    Subword,
}

impl FromStr for OutputType {
    type Err = TokenizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "subword" => Ok(Self::Subword),
            other => Err(TokenizerError::InvalidConfig(format!(
                "unknown output type '{}', expected 'id' or 'subword'",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => f.write_str("id"),
            Self::Subword => f.write_str("subword"),
        }
    }
}

/// Per-sentence decoration applied after merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// Prepend the bos id
    pub bos: bool,
    /// Append the eos id
    pub eos: bool,
    /// Reverse the whole sequence, specials included
    pub reverse: bool,
}

/// One encoded sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedSequence {
    Ids(Vec<u32>),
    Subwords(Vec<String>),
}

impl EncodedSequence {
    pub fn len(&self) -> usize {
        match self {
            Self::Ids(ids) => ids.len(),
            Self::Subwords(pieces) => pieces.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The ids, if this is an id sequence.
    pub fn as_ids(&self) -> Option<&[u32]> {
        match self {
            Self::Ids(ids) => Some(ids),
            Self::Subwords(_) => None,
        }
    }

    /// The subwords, if this is a subword sequence.
    pub fn as_subwords(&self) -> Option<&[String]> {
        match self {
            Self::Ids(_) => None,
            Self::Subwords(pieces) => Some(pieces),
        }
    }
}

/// A symbol in the word being merged. Unknown runs keep their byte span.
#[derive(Debug, Clone, Copy)]
struct Slot {
    id: u32,
    prev: Option<usize>,
    next: Option<usize>,
    span: (usize, usize),
    live: bool,
}

/// Pending merge at slot `pos`. Lowest rank pops first, then leftmost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MergeOp {
    rank: u32,
    pos: usize,
    new_id: u32,
}

impl Ord for MergeOp {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .rank
            .cmp(&self.rank)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for MergeOp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A merged symbol: its id plus, for unknown runs, the original text span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub id: u32,
    pub unknown: Option<(usize, usize)>,
}

/// Encoder over a shared vocabulary.
#[derive(Debug, Clone)]
pub struct Encoder {
    vocab: Arc<Vocabulary>,
}

impl Encoder {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Encode one sentence.
    pub fn encode_sentence(
        &self,
        sentence: &str,
        output: OutputType,
        options: EncodeOptions,
    ) -> EncodedSequence {
        match output {
            OutputType::Id => EncodedSequence::Ids(self.encode_ids(sentence, options)),
            OutputType::Subword => {
                EncodedSequence::Subwords(self.encode_subwords(sentence, options))
            }
        }
    }

    /// Encode one sentence to ids.
    pub fn encode_ids(&self, sentence: &str, options: EncodeOptions) -> Vec<u32> {
        let special = self.vocab.special();
        let mut ids = Vec::new();
        if options.bos {
            ids.push(special.bos);
        }
        for word in sentence.split_whitespace() {
            ids.extend(self.encode_word(word).into_iter().map(|p| p.id));
        }
        if options.eos {
            ids.push(special.eos);
        }
        if options.reverse {
            ids.reverse();
        }
        ids
    }

    /// Encode one sentence to subword strings. Unknown runs keep their text.
    pub fn encode_subwords(&self, sentence: &str, options: EncodeOptions) -> Vec<String> {
        let special = self.vocab.special();
        let mut pieces = Vec::new();
        if options.bos {
            pieces.push(self.symbol(special.bos));
        }
        for word in sentence.split_whitespace() {
            for piece in self.encode_word(word) {
                let text = match piece.unknown {
                    Some((start, end)) => word[start..end].to_string(),
                    None => self.symbol(piece.id),
                };
                pieces.push(text);
            }
        }
        if options.eos {
            pieces.push(self.symbol(special.eos));
        }
        if options.reverse {
            pieces.reverse();
        }
        pieces
    }

    /// Encode a single word (no whitespace) into merged pieces.
    pub fn encode_word(&self, word: &str) -> Vec<Piece> {
        let mut slots = self.initial_slots(word);
        if slots.len() > 1 {
            self.apply_merges(&mut slots);
        }
        slots
            .iter()
            .filter(|s| s.live)
            .map(|s| Piece {
                id: s.id,
                unknown: (s.id == self.vocab.special().unk).then_some(s.span),
            })
            .collect()
    }

    fn symbol(&self, id: u32) -> String {
        self.vocab.get_token(id).unwrap_or_default().to_string()
    }

    fn initial_slots(&self, word: &str) -> Vec<Slot> {
        let unk = self.vocab.special().unk;
        let mut slots: Vec<Slot> = Vec::with_capacity(word.len() + 1);
        slots.push(Slot {
            id: self.vocab.boundary_id(),
            prev: None,
            next: None,
            span: (0, 0),
            live: true,
        });

        for (offset, ch) in word.char_indices() {
            let end = offset + ch.len_utf8();
            match self.vocab.base_id(ch) {
                Some(id) => slots.push(Slot {
                    id,
                    prev: None,
                    next: None,
                    span: (offset, end),
                    live: true,
                }),
                None => {
                    // Extend the current unknown run rather than start a new one
                    let last = slots.len() - 1;
                    if last > 0 && slots[last].id == unk {
                        slots[last].span.1 = end;
                    } else {
                        slots.push(Slot {
                            id: unk,
                            prev: None,
                            next: None,
                            span: (offset, end),
                            live: true,
                        });
                    }
                }
            }
        }

        let n = slots.len();
        for (i, slot) in slots.iter_mut().enumerate() {
            slot.prev = i.checked_sub(1);
            slot.next = (i + 1 < n).then_some(i + 1);
        }
        slots
    }

    fn rule(&self, pair: Pair) -> Option<(u32, u32)> {
        self.vocab.merges().get(pair)
    }

    fn push_candidate(&self, heap: &mut OctonaryHeap<MergeOp>, slots: &[Slot], pos: usize) {
        if let Some(next) = slots[pos].next {
            if let Some((rank, new_id)) = self.rule((slots[pos].id, slots[next].id)) {
                heap.push(MergeOp { rank, pos, new_id });
            }
        }
    }

    fn apply_merges(&self, slots: &mut [Slot]) {
        let mut heap = OctonaryHeap::with_capacity(slots.len());
        for pos in 0..slots.len() {
            self.push_candidate(&mut heap, slots, pos);
        }

        while let Some(op) = heap.pop() {
            let left = slots[op.pos];
            if !left.live {
                continue;
            }
            let Some(right_pos) = left.next else {
                continue;
            };
            // The pair at this slot may have changed since the op was queued
            match self.rule((left.id, slots[right_pos].id)) {
                Some((rank, _)) if rank == op.rank => {}
                _ => continue,
            }

            let after = slots[right_pos].next;
            slots[op.pos].id = op.new_id;
            slots[op.pos].next = after;
            slots[right_pos].live = false;
            if let Some(after) = after {
                slots[after].prev = Some(op.pos);
            }

            if let Some(prev) = left.prev {
                self.push_candidate(&mut heap, slots, prev);
            }
            self.push_candidate(&mut heap, slots, op.pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocab::{SpecialTokens, WORD_BOUNDARY};

    // ▁=4 a=5 b=6 c=7 d=8, aa=9 ab=10 aaab=11
    fn scenario_vocab() -> Arc<Vocabulary> {
        Arc::new(
            Vocabulary::from_parts(
                SpecialTokens::default(),
                &[WORD_BOUNDARY, 'a', 'b', 'c', 'd'],
                &[(5, 5), (5, 6), (9, 10)],
            )
            .unwrap(),
        )
    }

    fn ids(seq: EncodedSequence) -> Vec<u32> {
        match seq {
            EncodedSequence::Ids(ids) => ids,
            EncodedSequence::Subwords(_) => panic!("expected ids"),
        }
    }

    #[test]
    fn test_encode_applies_merges_by_rank() {
        let encoder = Encoder::new(scenario_vocab());

        let out = encoder.encode_sentence("aaabdaaabac", OutputType::Id, EncodeOptions::default());

        // ▁ aaab d aaab a c
        assert_eq!(ids(out), vec![4, 11, 8, 11, 5, 7]);
    }

    #[test]
    fn test_run_of_identical_symbols_merges_left_to_right() {
        let encoder = Encoder::new(scenario_vocab());

        let out = encoder.encode_sentence("aaa", OutputType::Id, EncodeOptions::default());

        assert_eq!(ids(out), vec![4, 9, 5]);
    }

    #[test]
    fn test_subword_output() {
        let encoder = Encoder::new(scenario_vocab());

        let out = encoder.encode_sentence("aaab  ca", OutputType::Subword, EncodeOptions::default());

        assert_eq!(
            out,
            EncodedSequence::Subwords(vec![
                "▁".to_string(),
                "aaab".to_string(),
                "▁".to_string(),
                "c".to_string(),
                "a".to_string(),
            ])
        );
    }

    #[test]
    fn test_unknown_run_collapses() {
        let encoder = Encoder::new(scenario_vocab());

        let out = encoder.encode_sentence("axyzb", OutputType::Id, EncodeOptions::default());
        assert_eq!(ids(out), vec![4, 5, 1, 6]);

        let out = encoder.encode_sentence("axyzb", OutputType::Subword, EncodeOptions::default());
        assert_eq!(
            out.as_subwords().unwrap(),
            &["▁", "a", "xyz", "b"].map(String::from)
        );
    }

    #[test]
    fn test_unknown_run_at_word_start() {
        let encoder = Encoder::new(scenario_vocab());

        let pieces = encoder.encode_word("éé");
        assert_eq!(
            pieces,
            vec![
                Piece { id: 4, unknown: None },
                Piece {
                    id: 1,
                    unknown: Some((0, 4))
                }
            ]
        );
    }

    #[test]
    fn test_bos_eos_reverse() {
        let encoder = Encoder::new(scenario_vocab());
        let options = EncodeOptions {
            bos: true,
            eos: true,
            reverse: true,
        };

        let out = encoder.encode_sentence("ab c", OutputType::Id, options);
        assert_eq!(ids(out), vec![3, 7, 4, 10, 4, 2]);

        let out = encoder.encode_sentence("c", OutputType::Subword, options);
        assert_eq!(
            out.as_subwords().unwrap(),
            &["<EOS>", "c", "▁", "<BOS>"].map(String::from)
        );
    }

    #[test]
    fn test_empty_sentence() {
        let encoder = Encoder::new(scenario_vocab());

        let out = encoder.encode_sentence("   ", OutputType::Id, EncodeOptions::default());
        assert!(out.is_empty());

        let options = EncodeOptions {
            bos: true,
            ..Default::default()
        };
        let out = encoder.encode_sentence("", OutputType::Id, options);
        assert_eq!(ids(out), vec![2]);
    }

    #[test]
    fn test_output_type_parsing() {
        assert_eq!("id".parse::<OutputType>().unwrap(), OutputType::Id);
        assert_eq!("SUBWORD".parse::<OutputType>().unwrap(), OutputType::Subword);
        let err = "bytes".parse::<OutputType>().unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidConfig(_)));
    }
}
