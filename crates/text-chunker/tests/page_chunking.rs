use docrag_text_chunker::{fragment_id, Chunker, ChunkerConfig};
use pretty_assertions::assert_eq;

fn sample_page(words: usize) -> String {
    (0..words)
        .map(|i| format!("token{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn rechunking_a_page_reproduces_the_same_ids() {
    let chunker = Chunker::new(ChunkerConfig::default()).expect("valid config");
    let page = sample_page(600);

    let first: Vec<String> = chunker
        .chunk_page("report.pdf", 4, &page)
        .iter()
        .map(|f| f.id())
        .collect();
    let second: Vec<String> = chunker
        .chunk_page("report.pdf", 4, &page)
        .iter()
        .map(|f| f.id())
        .collect();

    assert_eq!(first, second);
    assert_eq!(first[0], fragment_id("report.pdf", 4, 0));
}

#[test]
fn consecutive_fragments_share_the_overlap() {
    let config = ChunkerConfig {
        chunk_size: 120,
        overlap: 40,
        min_length: 20,
    };
    let chunker = Chunker::new(config).expect("valid config");
    let page = "abcdefghij".repeat(40);

    let chunks = chunker.split(&page);
    for pair in chunks.windows(2) {
        assert_eq!(pair[1].start, pair[0].start + 80);
        let tail: String = pair[0].text.chars().skip(80).collect();
        let head: String = pair[1].text.chars().take(40).collect();
        assert_eq!(tail, head);
    }
}
