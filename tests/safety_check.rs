use mecab_rs::{Mecab, MecabNode, MecabOptions};

#[test]
fn test_node_snapshots_outlive_the_analyzer() {
    // Node results must be owned copies. If they secretly referenced
    // lattice memory, reading them after close/drop would be a
    // use-after-free; this might segfault or print garbage.

    let Ok(mut mecab) = Mecab::new(MecabOptions::new()) else {
        println!("skipping safety check: no MeCab installation");
        return;
    };

    let nodes: Vec<MecabNode> = mecab
        .parse_to_nodes("東京タワーの高さは333メートルです")
        .expect("Failed to parse to nodes");

    // Parse again so the lattice state of the first result is stale,
    // then release the native handles entirely.
    let _ = mecab
        .parse_to_nodes("すもももももももものうち")
        .expect("Failed to reparse");
    mecab.close();
    drop(mecab);

    // Clobber the stack before touching the snapshots.
    fn clobber() {
        let _data = [0xFFu8; 1024];
    }
    clobber();

    for node in &nodes {
        if node.is_normal() {
            assert_eq!(node.length as usize, node.surface.len());
            assert!(node.surface.is_char_boundary(node.surface.len()));
        }
    }
    let text: String = nodes
        .iter()
        .filter(|node| node.is_normal() || node.is_unknown())
        .map(|node| node.surface.as_str())
        .collect();
    assert_eq!(text, "東京タワーの高さは333メートルです");
}
