use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn texthash_exe() -> &'static str {
    env!("CARGO_BIN_EXE_texthash")
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(texthash_exe())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run texthash")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_no_artifacts(dir: &Path) {
    assert!(!dir.join("hash.info").exists(), "hash.info should not exist");
    assert!(!dir.join("hash").exists(), "hash should not exist");
}

/// Parse `hash.info` into (index, hash hex) pairs, checking the line layout.
fn parse_info(text: &str) -> Vec<(usize, String)> {
    let mut lines = text.lines();
    let header = lines.next().expect("missing length line");
    let len: usize = header
        .strip_prefix("length ")
        .expect("bad length line")
        .parse()
        .unwrap();

    let mut records = Vec::with_capacity(len);
    for i in 0..len {
        let index_line = lines.next().unwrap();
        let hash_line = lines.next().unwrap();
        let index = index_line
            .strip_prefix(&format!("hash[{i}] index: "))
            .expect("bad index line")
            .parse()
            .unwrap();
        let hash = hash_line
            .strip_prefix(&format!("hash[{i}] hash: "))
            .expect("bad hash line")
            .to_string();
        records.push((index, hash));
    }
    assert!(lines.next().is_none(), "trailing lines in hash.info");
    records
}

fn upper_half_hex(hash_hex: &str) -> String {
    let hash = u64::from_str_radix(hash_hex, 16).unwrap();
    format!("{:x}", (hash >> 32) as u32)
}

#[test]
fn test_empty_document_is_too_short() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("empty.txt"), b"").unwrap();

    let output = run_in(temp.path(), &["empty.txt"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Text is too short to generate a hash."));
    assert_no_artifacts(temp.path());
}

#[test]
fn test_exactly_one_window() {
    let temp = tempfile::tempdir().unwrap();
    // 50 normalized characters, the default window.
    fs::write(
        temp.path().join("doc.txt"),
        "ABCDEFGHIJ klmnopqrst, uvwxyz0123 456789abcd efghijklmn!",
    )
    .unwrap();

    let output = run_in(temp.path(), &["doc.txt"]);
    assert!(
        output.status.success(),
        "texthash failed:\nstdout: {}\nstderr: {}",
        stdout(&output),
        String::from_utf8_lossy(&output.stderr)
    );

    let info = fs::read_to_string(temp.path().join("hash.info")).unwrap();
    assert!(info.starts_with("length 1\n"));
    let records = parse_info(&info);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, 0);
    assert_eq!(records[0].1, records[0].1.to_lowercase());

    let compact = fs::read_to_string(temp.path().join("hash")).unwrap();
    let lines: Vec<&str> = compact.lines().collect();
    assert_eq!(lines, vec![upper_half_hex(&records[0].1)]);
}

#[test]
fn test_repeated_windows_listed_twice() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("doc.txt"), "abc abc abc").unwrap();

    let output = run_in(temp.path(), &["doc.txt", "--kgram", "3"]);
    assert!(output.status.success(), "stdout: {}", stdout(&output));

    let records = parse_info(&fs::read_to_string(temp.path().join("hash.info")).unwrap());
    assert_eq!(records.len(), 7);
    let indices: Vec<usize> = records.iter().map(|r| r.0).collect();
    assert_eq!(indices, (0..7).collect::<Vec<_>>());
    // "abc" starts at token 0, 3 and 6.
    assert_eq!(records[0].1, records[3].1);
    assert_eq!(records[0].1, records[6].1);
    assert_ne!(records[0].1, records[1].1);

    let compact = fs::read_to_string(temp.path().join("hash")).unwrap();
    let lines: Vec<&str> = compact.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], lines[3]);
    for (line, record) in lines.iter().zip(&records) {
        assert_eq!(*line, upper_half_hex(&record.1));
    }
}

#[test]
fn test_unique_compact_listing() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("doc.txt"), "abc abc abc").unwrap();

    let output = run_in(temp.path(), &["doc.txt", "--kgram", "3", "--unique"]);
    assert!(output.status.success());

    let records = parse_info(&fs::read_to_string(temp.path().join("hash.info")).unwrap());
    assert_eq!(records.len(), 7);
    let compact = fs::read_to_string(temp.path().join("hash")).unwrap();
    let expected: Vec<String> = records[..3].iter().map(|r| upper_half_hex(&r.1)).collect();
    assert_eq!(compact.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn test_unreadable_document() {
    let temp = tempfile::tempdir().unwrap();

    let output = run_in(temp.path(), &["does-not-exist.txt"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("unable to complete text hash function"));
    assert_no_artifacts(temp.path());
}

#[test]
fn test_missing_argument() {
    let temp = tempfile::tempdir().unwrap();
    let output = run_in(temp.path(), &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("not enough input args"));
    assert_no_artifacts(temp.path());
}

#[test]
fn test_help_exits_cleanly() {
    let temp = tempfile::tempdir().unwrap();
    let output = run_in(temp.path(), &["--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("--kgram"));
}

#[test]
fn test_report_open_failure_leaves_other_report() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("doc.txt"), "abc abc abc").unwrap();
    fs::write(temp.path().join("hash.info"), "previous run\n").unwrap();

    let output = run_in(
        temp.path(),
        &["doc.txt", "--kgram", "3", "--compact-report", "no/such/dir/hash"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Could not open file"));
    assert_eq!(
        fs::read_to_string(temp.path().join("hash.info")).unwrap(),
        "previous run\n"
    );
}

#[test]
fn test_deterministic_and_parallel_identical() {
    let temp = tempfile::tempdir().unwrap();
    let text = "Perceptual hashes of near duplicate documents mostly agree. ".repeat(30);
    fs::write(temp.path().join("doc.txt"), &text).unwrap();

    let mut outputs = Vec::new();
    for extra in [&[][..], &[][..], &["--parallel"][..]] {
        let mut args = vec!["doc.txt", "--kgram", "16"];
        args.extend_from_slice(extra);
        let output = run_in(temp.path(), &args);
        assert!(output.status.success());
        outputs.push((
            fs::read_to_string(temp.path().join("hash.info")).unwrap(),
            fs::read_to_string(temp.path().join("hash")).unwrap(),
        ));
    }
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[0], outputs[2]);
}

#[test]
fn test_small_edit_keeps_most_fingerprints() {
    let temp = tempfile::tempdir().unwrap();
    let original = "The committee reviewed the proposal and approved the budget for next year. \
                    Members noted that the timeline was ambitious but achievable.";
    let edited = original.replace("ambitious", "aggressive");

    let mut hash_sets = Vec::new();
    for (name, text) in [("a.txt", original.to_string()), ("b.txt", edited)] {
        fs::write(temp.path().join(name), text).unwrap();
        let output = run_in(temp.path(), &[name, "--kgram", "10"]);
        assert!(output.status.success());
        let records = parse_info(&fs::read_to_string(temp.path().join("hash.info")).unwrap());
        hash_sets.push(
            records
                .into_iter()
                .map(|r| r.1)
                .collect::<std::collections::HashSet<_>>(),
        );
    }
    let shared = hash_sets[0].intersection(&hash_sets[1]).count();
    assert!(shared * 2 > hash_sets[0].len(), "only {shared} shared fingerprints");
}

#[test]
fn test_options_file_in_working_directory() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("doc.txt"), "abc abc abc").unwrap();
    fs::write(
        temp.path().join("texthash_options.yaml"),
        "kgram: 3\nfull_report: report.info\n",
    )
    .unwrap();

    let output = run_in(temp.path(), &["doc.txt"]);
    assert!(output.status.success(), "stdout: {}", stdout(&output));

    let info = fs::read_to_string(temp.path().join("report.info")).unwrap();
    assert!(info.starts_with("length 7\n"));
    assert!(!temp.path().join("hash.info").exists());
    assert!(temp.path().join("hash").exists());
}

#[test]
fn test_flags_override_options_file() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("doc.txt"), "abc abc abc").unwrap();
    fs::write(
        temp.path().join("texthash_options.yaml"),
        "kgram: 3\nfull_report: from_options.info\n",
    )
    .unwrap();

    let output = run_in(
        temp.path(),
        &["doc.txt", "--kgram", "5", "--full-report", "cli.info"],
    );
    assert!(output.status.success(), "stdout: {}", stdout(&output));

    let info = fs::read_to_string(temp.path().join("cli.info")).unwrap();
    assert!(info.starts_with("length 5\n"));
    assert!(!temp.path().join("from_options.info").exists());
}

#[test]
fn test_malformed_options_file_fails() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("doc.txt"), "abc abc abc").unwrap();
    fs::write(
        temp.path().join("texthash_options.yaml"),
        "kgram: [not, a, number]\n",
    )
    .unwrap();

    let output = run_in(temp.path(), &["doc.txt"]);
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("Failed to parse options file"), "stdout: {out}");
    assert!(!out.contains("Perceptual hashing"));
    assert_no_artifacts(temp.path());
}
