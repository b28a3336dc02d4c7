use mecab_rs::*;

fn get_mecab(options: MecabOptions) -> Option<Mecab> {
    match Mecab::new(options) {
        Ok(mecab) => Some(mecab),
        Err(error) => {
            // No usable MeCab installation on this machine; nothing to verify.
            println!("skipping integration tests: {error}");
            None
        }
    }
}

#[test]
fn test_all_sequential() {
    // Run tests sequentially; each analyzer owns mutable native parse
    // state and the runs share one installed dictionary.
    let Some(mecab) = get_mecab(MecabOptions::new()) else {
        return;
    };

    run_parse(&mecab);
    run_parse_to_nodes(&mecab);
    run_boundary_constraint(&mecab);
    run_feature_constraint(&mecab);
    run_dictionaries(&mecab);
    run_metadata(&mecab);
    run_wakati();
    run_nbest();
    run_partial();
    run_bad_dicdir();
    run_close_is_idempotent();
}

fn run_parse(mecab: &Mecab) {
    println!("Starting run_parse");
    let out = mecab.parse("すもももももももものうち").expect("Failed to parse");

    assert!(!out.is_empty());
    assert!(out.ends_with("EOS\n"));
    assert!(out.contains("すもも"));
}

fn run_parse_to_nodes(mecab: &Mecab) {
    println!("Starting run_parse_to_nodes");
    let text = "世界の果てまで";
    let nodes = mecab.parse_to_nodes(text).expect("Failed to parse to nodes");

    assert!(!nodes.is_empty());
    assert!(nodes.iter().all(|node| !node.is_bos()));
    assert!(nodes.iter().any(|node| node.is_eos()));

    // Surfaces of the normal nodes reassemble the input.
    let joined: String = nodes
        .iter()
        .filter(|node| node.is_normal() || node.is_unknown())
        .map(|node| node.surface.as_str())
        .collect();
    assert_eq!(joined, text);

    let first = nodes
        .iter()
        .find(|node| node.is_normal())
        .expect("Expected at least one normal node");
    assert!(!first.feature.is_empty());
    assert_eq!(first.length as usize, first.surface.len());
}

fn run_boundary_constraint(mecab: &Mecab) {
    println!("Starting run_boundary_constraint");
    let text = "凡人にしか見えねえ風景ってのがあるんだよ。";
    let nodes = mecab
        .parse_to_nodes_with(text, &Constraint::boundary("見えねえ風景"))
        .expect("Failed to parse with boundary constraint");

    let kept_whole = nodes.iter().any(|node| node.surface == "見えねえ風景");
    assert!(kept_whole, "Constrained span should surface as one morpheme");
}

fn run_feature_constraint(mecab: &Mecab) {
    println!("Starting run_feature_constraint");
    let feature = "名詞,一般,*,*,*,*,カレーパン,カレーパン,カレーパン";
    let nodes = mecab
        .parse_to_nodes_with(
            "焼きカレーパンを食べた",
            &Constraint::features([("カレーパン", feature)]),
        )
        .expect("Failed to parse with feature constraint");

    let constrained = nodes
        .iter()
        .find(|node| node.surface == "カレーパン")
        .expect("Constrained morpheme should appear");
    assert_eq!(constrained.feature, feature);
}

fn run_dictionaries(mecab: &Mecab) {
    println!("Starting run_dictionaries");
    let dicts = mecab.dictionaries();

    assert!(!dicts.is_empty());
    assert!(dicts[0].is_system());
    assert!(dicts[0].size > 0);
    assert!(!dicts[0].filename.is_empty());
}

fn run_metadata(mecab: &Mecab) {
    println!("Starting run_metadata");
    assert!(!mecab.version().is_empty());
    assert!(!mecab.library_path().as_os_str().is_empty());
    assert_eq!(mecab.parse_mode(), ParseMode::SingleBest);
}

fn run_wakati() {
    println!("Starting run_wakati");
    let Some(mecab) = get_mecab(MecabOptions::new().with_output_format_type("wakati")) else {
        return;
    };
    let out = mecab
        .parse("すもももももももものうち")
        .expect("Failed to parse in wakati mode");

    assert!(out.contains(' '));
    assert!(!out.contains("EOS"));
}

fn run_nbest() {
    println!("Starting run_nbest");
    let Some(mecab) = get_mecab(MecabOptions::new().with_nbest(3)) else {
        return;
    };
    assert_eq!(mecab.parse_mode(), ParseMode::NBest(3));

    let out = mecab.parse("すもももももももものうち").expect("Failed to parse");
    assert!(out.matches("EOS\n").count() >= 2, "Expected multiple paths");

    let nodes = mecab
        .parse_to_nodes("すもももももももものうち")
        .expect("Failed to parse to nodes");
    assert!(nodes.iter().filter(|node| node.is_eos()).count() >= 2);
}

fn run_partial() {
    println!("Starting run_partial");
    let Some(mecab) = get_mecab(MecabOptions::new().with_partial()) else {
        return;
    };

    let error = mecab.parse("改行なし").unwrap_err();
    assert!(matches!(error, MecabError::InvalidArgument(_)));

    let out = mecab.parse("改行あり\n").expect("Failed to parse partially");
    assert!(out.ends_with("EOS\n"));
}

fn run_bad_dicdir() {
    println!("Starting run_bad_dicdir");
    let error = Mecab::new(MecabOptions::new().with_dicdir("/path/does/not/exist"))
        .expect_err("Expected init failure for a missing dicdir");
    match error {
        MecabError::TaggerInit(message) => {
            assert!(
                message.contains("--dicdir=/path/does/not/exist"),
                "Init error should reference the attempted configuration: {message}"
            );
        }
        other => panic!("Expected TaggerInit, got {other}"),
    }
}

fn run_close_is_idempotent() {
    println!("Starting run_close_is_idempotent");
    let Some(mut mecab) = get_mecab(MecabOptions::new()) else {
        return;
    };
    mecab.close();
    mecab.close();
    // Drop after close must not double-release.
}
