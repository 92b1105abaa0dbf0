use ahash::AHashSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use subtok_tokenizer::{
    EncodeOptions, EncodedSequence, ErrorKind, OutputType, Result, Tokenizer, TokenizerError,
    TrainingConfig,
};

const CORPUS_LINES: [&str; 12] = [
    "the quick brown fox jumps over the lazy dog",
    "a lazy dog sleeps in the warm afternoon sun",
    "brown bread and butter for breakfast",
    "the fox and the hound became the best of friends",
    "quick thinking saves the day",
    "over and over the river flows to the sea",
    "naïve café owners serve crème brûlée",
    "tabs\tand  double  spaces are whitespace too",
    "jumps jumping jumped jumper",
    "sleeps sleeping slept sleeper",
    "friends friendly friendship",
    "the end",
];

fn corpus() -> String {
    CORPUS_LINES.join("\n")
}

fn train(vocab_size: usize, threads: i32) -> Result<Tokenizer> {
    Tokenizer::builder()
        .vocab_size(vocab_size)
        .threads(threads)
        .train(&corpus())
}

fn normalize(sentence: &str) -> String {
    sentence.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sentences built from corpus characters, so none of them hits `unk`.
fn random_sentences(count: usize, seed: u64) -> Vec<String> {
    let alphabet: Vec<char> = corpus().chars().filter(|c| !c.is_whitespace()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let words = rng.gen_range(1..=6);
            (0..words)
                .map(|_| {
                    let len = rng.gen_range(1..=8);
                    (0..len)
                        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
                        .collect::<String>()
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[test]
fn decode_inverts_encode() -> Result<()> {
    let tokenizer = train(120, 2)?;

    let mut sentences: Vec<String> = CORPUS_LINES.iter().map(|s| s.to_string()).collect();
    sentences.extend(random_sentences(50, 0x5eed));

    let ids = tokenizer.encode_as_ids(&sentences, EncodeOptions::default());
    let decoded = tokenizer.decode(&ids)?;

    for (sentence, text) in sentences.iter().zip(&decoded) {
        assert_eq!(text, &normalize(sentence));
    }
    Ok(())
}

#[test]
fn thread_count_does_not_change_the_model() -> Result<()> {
    let reference = train(150, 1)?;
    let sentences = random_sentences(30, 7);
    let expected = reference.encode_as_ids(&sentences, EncodeOptions::default());

    for threads in [2, 8] {
        let tokenizer = train(150, threads)?;
        assert_eq!(tokenizer.vocab(), reference.vocab(), "threads = {}", threads);
        assert_eq!(
            tokenizer.save()?,
            reference.save()?,
            "threads = {}",
            threads
        );
        assert_eq!(
            tokenizer.encode_as_ids(&sentences, EncodeOptions::default()),
            expected
        );
    }
    Ok(())
}

#[test]
fn thread_count_does_not_change_the_model_with_rare_characters() -> Result<()> {
    let train_with_coverage = |threads: i32| {
        Tokenizer::builder()
            .vocab_size(150)
            .coverage(0.95)
            .threads(threads)
            .train(&corpus())
    };
    let reference = train_with_coverage(1)?;
    assert!(reference.subword_to_id("ï").is_err());

    let mut sentences = random_sentences(30, 11);
    sentences.push("naïve crème brûlée".to_string());
    let expected = reference.encode_as_ids(&sentences, EncodeOptions::default());
    assert!(expected
        .iter()
        .any(|ids| ids.contains(&reference.special().unk)));

    for threads in [2, 8] {
        let tokenizer = train_with_coverage(threads)?;
        assert_eq!(tokenizer.vocab(), reference.vocab(), "threads = {}", threads);
        assert_eq!(
            tokenizer.save()?,
            reference.save()?,
            "threads = {}",
            threads
        );
        assert_eq!(
            tokenizer.encode_as_ids(&sentences, EncodeOptions::default()),
            expected
        );
    }
    Ok(())
}

#[test]
fn vocabulary_reaches_requested_size() -> Result<()> {
    let config = TrainingConfig {
        vocab_size: 100,
        threads: 2,
        ..Default::default()
    };
    let (tokenizer, report) = Tokenizer::train_with_report(&corpus(), config)?;

    assert!(report.is_complete());
    assert_eq!(tokenizer.vocab_size(), 100);
    assert_eq!(report.merges, 100 - 4 - report.alphabet_size);
    Ok(())
}

#[test]
fn early_stop_is_reported() -> Result<()> {
    let config = TrainingConfig {
        vocab_size: 50_000,
        threads: 1,
        ..Default::default()
    };
    let (tokenizer, report) = Tokenizer::train_with_report(&corpus(), config)?;

    assert!(!report.is_complete());
    assert_eq!(report.requested_vocab_size, 50_000);
    assert_eq!(tokenizer.vocab_size(), report.vocab_size);
    assert!(report.vocab_size < 50_000);
    Ok(())
}

#[test]
fn re_encoding_decoded_text_is_stable() -> Result<()> {
    let tokenizer = train(120, 2)?;
    let sentences = random_sentences(40, 99);

    let first = tokenizer.encode_as_ids(&sentences, EncodeOptions::default());
    let decoded = tokenizer.decode(&first)?;
    let second = tokenizer.encode_as_ids(&decoded, EncodeOptions::default());

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn bos_eos_reverse_compose() -> Result<()> {
    let tokenizer = train(120, 2)?;
    let sentences = ["the lazy fox", "brown", ""];
    let special = tokenizer.special();

    let plain = tokenizer.encode_as_ids(&sentences, EncodeOptions::default());
    let decorated = tokenizer.encode_as_ids(
        &sentences,
        EncodeOptions {
            bos: true,
            eos: true,
            reverse: true,
        },
    );

    for (content, full) in plain.iter().zip(&decorated) {
        let mut expected = vec![special.eos];
        expected.extend(content.iter().rev());
        expected.push(special.bos);
        assert_eq!(full, &expected);
    }
    Ok(())
}

#[test]
fn subword_output_matches_ids() -> Result<()> {
    let tokenizer = train(120, 2)?;
    let sentences = ["the quick brown fox", "friendship"];

    let ids = tokenizer.encode(&sentences, OutputType::Id, EncodeOptions::default());
    let pieces = tokenizer.encode(&sentences, OutputType::Subword, EncodeOptions::default());

    for (ids, pieces) in ids.iter().zip(&pieces) {
        let ids = ids.as_ids().unwrap();
        let pieces = pieces.as_subwords().unwrap();
        assert_eq!(ids.len(), pieces.len());
        for (&id, piece) in ids.iter().zip(pieces) {
            assert_eq!(tokenizer.id_to_subword(id)?, *piece);
        }
    }
    Ok(())
}

#[test]
fn saved_model_loads_identically() -> Result<()> {
    let tokenizer = train(120, 2)?;
    let bytes = tokenizer.save()?;

    let loaded = Tokenizer::load(&bytes, 1)?;
    let mut streamed = Vec::new();
    tokenizer.save_to(&mut streamed)?;
    let from_reader = Tokenizer::load_from(streamed.as_slice(), 2)?;

    let sentences = random_sentences(20, 3);
    let expected = tokenizer.encode_as_ids(&sentences, EncodeOptions::default());
    for other in [&loaded, &from_reader] {
        assert_eq!(other.vocab(), tokenizer.vocab());
        assert_eq!(other.special(), tokenizer.special());
        assert_eq!(
            other.encode_as_ids(&sentences, EncodeOptions::default()),
            expected
        );
        assert_eq!(other.save()?, bytes);
    }
    Ok(())
}

#[test]
fn corrupt_model_is_rejected() -> Result<()> {
    let bytes = train(60, 1)?.save()?;

    let truncated = Tokenizer::load(&bytes[..bytes.len() / 2], 1).unwrap_err();
    assert_eq!(truncated.kind(), ErrorKind::Format);

    let garbage = Tokenizer::load(b"not a model", 1).unwrap_err();
    assert_eq!(garbage.kind(), ErrorKind::Format);
    Ok(())
}

#[test]
fn scenario_from_small_corpus() -> Result<()> {
    let tokenizer = Tokenizer::builder()
        .vocab_size(12)
        .threads(1)
        .train("aaabdaaabac")?;

    assert_eq!(
        tokenizer.vocab(),
        vec!["<PAD>", "<UNK>", "<BOS>", "<EOS>", "▁", "a", "b", "c", "d", "aa", "ab", "aaab"]
    );
    let pieces = tokenizer.encode_as_subwords(&["aaabdaaabac"], EncodeOptions::default());
    assert_eq!(pieces[0], vec!["▁", "aaab", "d", "aaab", "a", "c"]);
    Ok(())
}

#[test]
fn unknown_characters_map_to_unk() -> Result<()> {
    let tokenizer = Tokenizer::builder()
        .vocab_size(7)
        .coverage(0.9)
        .threads(1)
        .train("aaaa aaaa aaab")?;

    assert!(tokenizer.subword_to_id("b").is_err());

    let ids = tokenizer.encode_as_ids(&["ab"], EncodeOptions::default());
    assert_eq!(ids[0].last(), Some(&tokenizer.special().unk));

    let pieces = tokenizer.encode_as_subwords(&["ab"], EncodeOptions::default());
    assert_eq!(pieces[0].last().map(String::as_str), Some("b"));

    let decoded = tokenizer.decode(&ids)?;
    assert_eq!(decoded, vec!["a<UNK>".to_string()]);
    Ok(())
}

#[test]
fn ignored_ids_are_dropped_when_decoding() -> Result<()> {
    let tokenizer = train(80, 1)?;
    let special = tokenizer.special();
    let options = EncodeOptions {
        bos: true,
        eos: true,
        reverse: false,
    };
    let ids = tokenizer.encode_as_ids(&["the end"], options);
    let ignore: AHashSet<u32> = [special.bos, special.eos].into_iter().collect();

    assert_eq!(tokenizer.decode_ignoring(&ids, &ignore)?, vec!["the end"]);
    assert_eq!(
        tokenizer.decode(&ids)?,
        vec!["<BOS> the end<EOS>".to_string()]
    );
    Ok(())
}

#[test]
fn configuration_errors() {
    let bad_output = "pieces".parse::<OutputType>().unwrap_err();
    assert_eq!(bad_output.kind(), ErrorKind::Configuration);

    let duplicate = Tokenizer::builder()
        .vocab_size(100)
        .pad_id(1)
        .train(&corpus())
        .unwrap_err();
    assert!(matches!(duplicate, TokenizerError::InvalidConfig(_)));

    let too_small = Tokenizer::builder().vocab_size(10).train(&corpus()).unwrap_err();
    assert_eq!(too_small.kind(), ErrorKind::Configuration);

    let bad_threads = Tokenizer::load(b"{}", -3).unwrap_err();
    assert_eq!(bad_threads.kind(), ErrorKind::Configuration);
}

#[test]
fn encoded_sequence_variants_follow_output_type() -> Result<()> {
    let tokenizer = train(60, 1)?;

    let ids = tokenizer.encode(&["fox"], OutputType::Id, EncodeOptions::default());
    assert!(matches!(ids[0], EncodedSequence::Ids(_)));

    let pieces = tokenizer.encode(&["fox"], OutputType::Subword, EncodeOptions::default());
    assert!(matches!(pieces[0], EncodedSequence::Subwords(_)));
    Ok(())
}
