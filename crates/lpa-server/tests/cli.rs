use lpa_server::cli::{command, read_answers};

#[test]
fn reads_answer_files_in_client_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("answers.json");
    std::fs::write(&path, r#"[{"questionId": 1, "answer": "a"}, {"question": 2, "option": "C"}]"#)
        .unwrap();
    let answers = read_answers(&path).unwrap();
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].option.as_str(), "A");
    assert_eq!(answers[1].question.0, 2);
}

#[test]
fn bad_answer_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("answers.json");
    std::fs::write(&path, "{}").unwrap();
    let err = read_answers(&path).unwrap_err();
    assert!(format!("{err:#}").contains("answers.json"));
}

#[test]
fn subcommand_is_required() {
    assert!(command().try_get_matches_from(["lpa"]).is_err());
}
