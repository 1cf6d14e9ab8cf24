use std::fs;

use refnorm::{
  cli::Cli,
  config::Config,
  error::RefnormError,
  utils::{BatchReport, normalize_files, resolve_files},
};
use refnorm_markdown::Normalizer;

const RAW: &str = "---\ntitle: Git\n---\n\n## Git\n\n### \
                   clone()\n\n##### Parameters\n\n| Name | Type | \
                   Description |\n| --- | --- | --- |\n| url | string | \
                   Repository URL |\n\n### Returns\n\n`Promise`\\<`void`\\>\n";

const EXPECTED: &str = "---\ntitle: Git\n---\n\n## Git\n\n### \
                        clone()\n\n#### Arguments\n\n- `url` _string_ - \
                        Repository URL\n\n#### Returns\n\n`Promise<void>`\n";

fn normalizer(config: &Config) -> Normalizer {
  Normalizer::new(config.normalizer_options())
}

#[test]
fn test_batch_rewrites_in_place() {
  let dir = tempfile::tempdir().expect("tempdir");
  let classes = dir.path().join("classes");
  fs::create_dir_all(&classes).expect("mkdir");
  fs::write(classes.join("git.mdx"), RAW).expect("write");
  fs::write(dir.path().join("notes.txt"), RAW).expect("write");

  let config = Config::default();
  let files =
    resolve_files(&[dir.path().to_path_buf()], &config.extension).expect("files");
  assert_eq!(files, vec![classes.join("git.mdx")]);

  let report = normalize_files(&normalizer(&config), &files, false);
  assert_eq!(report, BatchReport {
    processed: 1,
    changed:   1,
    failed:    0,
  });
  assert_eq!(fs::read_to_string(classes.join("git.mdx")).expect("read"), EXPECTED);
  assert_eq!(fs::read_to_string(dir.path().join("notes.txt")).expect("read"), RAW);

  // A second run finds nothing to do
  let report = normalize_files(&normalizer(&config), &files, false);
  assert_eq!(report.changed, 0);
}

#[test]
fn test_check_mode_reports_without_writing() {
  let dir = tempfile::tempdir().expect("tempdir");
  let page = dir.path().join("git.mdx");
  fs::write(&page, RAW).expect("write");

  let config = Config::default();
  let report = normalize_files(&normalizer(&config), &[page.clone()], true);
  assert_eq!(report.changed, 1);
  assert_eq!(fs::read_to_string(&page).expect("read"), RAW);
}

#[test]
fn test_failed_file_does_not_stop_batch() {
  let dir = tempfile::tempdir().expect("tempdir");
  let good = dir.path().join("good.mdx");
  let bad = dir.path().join("bad.mdx");
  fs::write(&good, RAW).expect("write");
  fs::write(&bad, [0xff, 0xfe, 0x00]).expect("write");

  let config = Config::default();
  let files =
    resolve_files(&[dir.path().to_path_buf()], &config.extension).expect("files");
  let report = normalize_files(&normalizer(&config), &files, false);

  assert_eq!(report, BatchReport {
    processed: 1,
    changed:   1,
    failed:    1,
  });
  assert_eq!(fs::read_to_string(&good).expect("read"), EXPECTED);
}

#[test]
fn test_single_file_target_and_missing_root() {
  let dir = tempfile::tempdir().expect("tempdir");
  let page = dir.path().join("page.md");
  fs::write(&page, "# Examples\n").expect("write");

  let cli = Cli {
    path: Some(page.clone()),
    ..Cli::default()
  };
  let config = Config::default();
  let files = resolve_files(&config.targets(&cli), &config.extension).expect("files");
  assert_eq!(files, vec![page]);

  let missing = dir.path().join("docs/python-sdk");
  let err = resolve_files(&[missing.clone()], "mdx").expect_err("missing");
  assert!(matches!(err, RefnormError::RootNotFound(path) if path == missing));
}
